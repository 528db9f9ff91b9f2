//! Drive the runner callback protocol from parsed Gherkin.
//!
//! [`FeatureWalker`] plays the part of a Gherkin runner: it walks a parsed
//! feature and delivers the callbacks a runner would, in the same order.
//! Step execution is delegated to an oracle deciding each step's result.

use std::sync::LazyLock;

use camino::Utf8Path;
use gherkin::GherkinEnv;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::StoryError;
use crate::examples::ExampleRow;
use crate::model::{
    ExamplesNode, FeatureNode, ResultStatus, ScenarioNode, StepMatch, StepNode, StepResult, Tag,
    derive_id,
};
use crate::visitor::{ResultVisitor, StructureVisitor};

static OUTLINE_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>\s][^<>]*)>").unwrap_or_else(|_| unreachable!()));

/// Parse a feature file from disk.
///
/// # Errors
///
/// Returns [`StoryError::Io`] when the file cannot be read and
/// [`StoryError::FeatureParse`] when it is not valid Gherkin.
pub fn parse_feature(path: &Utf8Path) -> Result<gherkin::Feature, StoryError> {
    let text = std::fs::read_to_string(path)?;
    parse_feature_text(&text)
}

/// Parse feature text.
///
/// # Errors
///
/// Returns [`StoryError::FeatureParse`] when the text is not valid Gherkin.
pub fn parse_feature_text(text: &str) -> Result<gherkin::Feature, StoryError> {
    let mut text = text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(gherkin::Feature::parse(text.as_str(), GherkinEnv::default())?)
}

/// Oracle reporting every step as undefined, for dry runs.
#[must_use]
pub fn undefined_steps(_step: &StepNode) -> StepResult {
    StepResult::undefined()
}

/// Oracle reporting every step as passed.
#[must_use]
pub fn passing_steps(_step: &StepNode) -> StepResult {
    StepResult::passed()
}

fn text_or_empty(value: impl Into<Option<String>>) -> String {
    value.into().unwrap_or_default()
}

fn tag_literal(tag: &str) -> Tag {
    if tag.starts_with('@') {
        Tag::new(tag)
    } else {
        Tag::new(format!("@{tag}"))
    }
}

fn tags_of(tags: &[String]) -> Vec<Tag> {
    tags.iter().map(|tag| tag_literal(tag)).collect()
}

fn keyword_of(keyword: &str) -> String {
    format!("{} ", keyword.trim_end())
}

/// Header node for a parsed feature.
#[must_use]
pub fn feature_node(feature: &gherkin::Feature) -> FeatureNode {
    FeatureNode {
        id: derive_id(&feature.name),
        name: feature.name.clone(),
        description: text_or_empty(feature.description.clone()).trim().to_string(),
        tags: tags_of(&feature.tags),
    }
}

fn scenario_node(scenario: &gherkin::Scenario) -> ScenarioNode {
    ScenarioNode {
        name: scenario.name.clone(),
        description: text_or_empty(scenario.description.clone()).trim().to_string(),
        tags: tags_of(&scenario.tags),
    }
}

fn examples_node(examples: &gherkin::Examples) -> ExamplesNode {
    ExamplesNode {
        name: text_or_empty(examples.name.clone()),
        description: text_or_empty(examples.description.clone()).trim().to_string(),
        rows: examples
            .table
            .as_ref()
            .map(|table| table.rows.clone())
            .unwrap_or_default(),
    }
}

fn step_nodes(steps: &[gherkin::Step]) -> Vec<StepNode> {
    steps
        .iter()
        .map(|step| StepNode::new(keyword_of(&step.keyword), step.value.clone()))
        .collect()
}

/// Replace `<column>` placeholders with the values of `row`.
///
/// Placeholders naming unknown columns are left untouched.
///
/// # Examples
/// ```
/// use rstest_bdd_story::examples::ExampleRow;
/// use rstest_bdd_story::walk::substitute_placeholders;
///
/// let row = ExampleRow::new(["item"], ["apple"]);
/// assert_eq!(substitute_placeholders("buy <item> <qty>", &row), "buy apple <qty>");
/// ```
#[must_use]
pub fn substitute_placeholders(text: &str, row: &ExampleRow) -> String {
    OUTLINE_PLACEHOLDER_RE
        .replace_all(text, |captures: &Captures<'_>| {
            let whole = captures.get(0).map_or("", |m| m.as_str());
            captures
                .get(1)
                .and_then(|name| row.get(name.as_str()))
                .unwrap_or(whole)
                .to_string()
        })
        .into_owned()
}

/// Deliver the callbacks closing a run: `done`, then `close`.
///
/// # Errors
///
/// Propagates the first error returned by the visitor.
pub fn finish_run<V>(visitor: &mut V) -> Result<(), StoryError>
where
    V: StructureVisitor + ResultVisitor + ?Sized,
{
    visitor.suite_ended()?;
    visitor.closed()
}

/// Delivers runner callbacks for parsed features.
pub struct FeatureWalker<O> {
    oracle: O,
}

impl<O> FeatureWalker<O>
where
    O: FnMut(&StepNode) -> StepResult,
{
    /// Create a walker asking `oracle` for the result of each step.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Deliver the callbacks for one feature file, ending with `eof`.
    ///
    /// Background steps run before the steps of every scenario. Outlines
    /// run once per example row, with `<column>` placeholders substituted
    /// in scenario titles and step text. Once a step does not pass, the
    /// remaining defined steps of the scenario are reported as skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the visitor.
    pub fn walk<V>(
        &mut self,
        uri: &str,
        feature: &gherkin::Feature,
        visitor: &mut V,
    ) -> Result<(), StoryError>
    where
        V: StructureVisitor + ResultVisitor + ?Sized,
    {
        debug!(uri, feature = %feature.name, "walking feature");
        visitor.uri_declared(uri)?;
        visitor.feature_entered(&feature_node(feature))?;
        let background = feature
            .background
            .as_ref()
            .map(|background| step_nodes(&background.steps))
            .unwrap_or_default();
        if let Some(node) = feature.background.as_ref() {
            visitor.background_declared(&ScenarioNode::new(node.name.clone()))?;
        }
        for scenario in &feature.scenarios {
            self.walk_scenario(scenario, &background, visitor)?;
        }
        for rule in &feature.rules {
            let mut steps = background.clone();
            if let Some(rule_background) = rule.background.as_ref() {
                steps.extend(step_nodes(&rule_background.steps));
            }
            for scenario in &rule.scenarios {
                self.walk_scenario(scenario, &steps, visitor)?;
            }
        }
        visitor.eof()
    }

    fn walk_scenario<V>(
        &mut self,
        scenario: &gherkin::Scenario,
        background: &[StepNode],
        visitor: &mut V,
    ) -> Result<(), StoryError>
    where
        V: StructureVisitor + ResultVisitor + ?Sized,
    {
        let node = scenario_node(scenario);
        let mut steps = background.to_vec();
        steps.extend(step_nodes(&scenario.steps));
        if scenario.examples.is_empty() {
            visitor.scenario_declared(&node)?;
            return self.run_iteration(&node, &steps, visitor);
        }

        visitor.outline_declared(&node)?;
        for examples in &scenario.examples {
            let block = examples_node(examples);
            visitor.examples_declared(&block)?;
            let mut rows = block.rows.iter();
            let Some(headers) = rows.next() else {
                continue;
            };
            for values in rows {
                let row = ExampleRow::new(headers.iter().cloned(), values.iter().cloned());
                let example = ScenarioNode {
                    name: substitute_placeholders(&node.name, &row),
                    ..node.clone()
                };
                let concrete: Vec<StepNode> = steps
                    .iter()
                    .map(|step| {
                        StepNode::new(step.keyword.clone(), substitute_placeholders(&step.name, &row))
                    })
                    .collect();
                self.run_iteration(&example, &concrete, visitor)?;
            }
        }
        Ok(())
    }

    fn run_iteration<V>(
        &mut self,
        scenario: &ScenarioNode,
        steps: &[StepNode],
        visitor: &mut V,
    ) -> Result<(), StoryError>
    where
        V: StructureVisitor + ResultVisitor + ?Sized,
    {
        visitor.scenario_entered(scenario)?;
        for step in steps {
            visitor.step_declared(step)?;
        }
        let mut blocked = false;
        for step in steps {
            let mut result = (self.oracle)(step);
            if blocked && result.status != ResultStatus::Undefined {
                result = StepResult::skipped();
            }
            if result.status != ResultStatus::Undefined {
                visitor.match_found(&StepMatch::step_definition())?;
            }
            blocked = blocked || result.status != ResultStatus::Passed;
            visitor.result_reported(&result)?;
        }
        visitor.scenario_exited(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{EventCollector, RunnerEvent};

    const BASKET: &str = "\
@driver:chrome
Feature: Basket

  Background:
    Given a shop

  Scenario: Adding
    When I add an apple
    Then the basket holds 1 item

  Scenario Outline: Stocking <item>
    Given <qty> <item>

    Examples: fruit
      | item  | qty |
      | apple | 1   |
      | pear  | 2   |
";

    fn walked(oracle: impl FnMut(&StepNode) -> StepResult) -> Vec<RunnerEvent> {
        let feature = match parse_feature_text(BASKET) {
            Ok(feature) => feature,
            Err(error) => panic!("fixture should parse: {error}"),
        };
        let mut collector = EventCollector::new();
        let mut walker = FeatureWalker::new(oracle);
        if let Err(error) = walker.walk("basket.feature", &feature, &mut collector) {
            panic!("collector never fails: {error}");
        }
        collector.into_events()
    }

    fn labels(events: &[RunnerEvent]) -> Vec<&'static str> {
        events.iter().map(RunnerEvent::label).collect()
    }

    #[test]
    fn feature_header_keeps_tags_with_marker() {
        let events = walked(passing_steps);
        let Some(RunnerEvent::Feature(feature)) = events.get(1) else {
            panic!("second callback should enter the feature");
        };
        assert_eq!(feature.id, "basket");
        assert_eq!(feature.tags, [Tag::new("@driver:chrome")]);
    }

    #[test]
    fn plain_scenario_declares_steps_before_results() {
        let events = walked(passing_steps);
        let labels = labels(&events);
        let Some(start) = labels.iter().position(|label| *label == "scenario") else {
            panic!("plain scenario should be declared");
        };
        assert_eq!(
            labels.get(start..start + 12),
            Some(
                &[
                    "scenario",
                    "start-of-scenario",
                    "step",
                    "step",
                    "step",
                    "match",
                    "result",
                    "match",
                    "result",
                    "match",
                    "result",
                    "end-of-scenario",
                ][..]
            )
        );
    }

    #[test]
    fn outline_runs_once_per_row_with_substituted_text() {
        let events = walked(passing_steps);
        let examples: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                RunnerEvent::StartOfScenario(node) => Some(node.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(examples, ["Adding", "Stocking apple", "Stocking pear"]);
        let steps: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                RunnerEvent::Step(step) => Some(step.title()),
                _ => None,
            })
            .collect();
        assert!(steps.contains(&"Given 2 pear".to_string()));
        assert!(steps.contains(&"Given a shop".to_string()));
    }

    #[test]
    fn steps_after_a_failure_are_skipped() {
        let events = walked(|step: &StepNode| {
            if step.name == "I add an apple" {
                StepResult::with_status(ResultStatus::Failed)
            } else {
                StepResult::passed()
            }
        });
        let statuses: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                RunnerEvent::Result(result) => Some(result.status),
                _ => None,
            })
            .take(3)
            .collect();
        assert_eq!(
            statuses,
            [
                ResultStatus::Passed,
                ResultStatus::Failed,
                ResultStatus::Skipped
            ]
        );
    }

    #[test]
    fn undefined_steps_are_not_matched() {
        let events = walked(undefined_steps);
        let labels = labels(&events);
        assert!(!labels.contains(&"match"));
        assert_eq!(labels.last(), Some(&"eof"));
    }
}

//! Serialisable runner callbacks.
//!
//! [`RunnerEvent`] names every callback a Gherkin runner delivers, so a run
//! can be stored as JSON lines and replayed later through any visitor.

use serde::{Deserialize, Serialize};

use crate::error::StoryError;
use crate::model::{ExamplesNode, FeatureNode, ScenarioNode, StepMatch, StepNode, StepResult};
use crate::visitor::{ResultVisitor, StructureVisitor};

/// One runner callback.
///
/// # Examples
/// ```
/// use rstest_bdd_story::protocol::RunnerEvent;
///
/// let event: RunnerEvent =
///     serde_json::from_str(r#"{"event":"step","keyword":"Given ","name":"a basket"}"#).unwrap();
/// assert_eq!(event.label(), "step");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RunnerEvent {
    /// A feature file was opened.
    Uri {
        /// Location of the feature file.
        uri: String,
    },
    /// A feature was entered.
    Feature(FeatureNode),
    /// A background section was declared.
    Background(ScenarioNode),
    /// A plain scenario was declared.
    Scenario(ScenarioNode),
    /// A scenario outline was declared.
    ScenarioOutline(ScenarioNode),
    /// An examples block was declared.
    Examples(ExamplesNode),
    /// A scenario, or outline example, is about to run.
    StartOfScenario(ScenarioNode),
    /// The running scenario finished.
    EndOfScenario(ScenarioNode),
    /// A step was declared.
    Step(StepNode),
    /// A step or hook was bound to its implementation.
    Match(StepMatch),
    /// A step result was reported.
    Result(StepResult),
    /// A before hook ran.
    Before(StepResult),
    /// An after hook ran.
    After(StepResult),
    /// Binary data was attached.
    Embedding {
        /// MIME type of the data.
        mime_type: String,
        /// Attached bytes.
        #[serde(default)]
        data: Vec<u8>,
    },
    /// Text was written to the report.
    Write {
        /// Written text.
        text: String,
    },
    /// A feature file could not be parsed.
    SyntaxError {
        /// Parser message.
        message: String,
    },
    /// Every feature has run.
    Done,
    /// The runner closed its output.
    Close,
    /// The end of a feature file was reached.
    Eof,
}

impl RunnerEvent {
    /// Kebab-case name of the callback, as used in transcripts.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Uri { .. } => "uri",
            Self::Feature(_) => "feature",
            Self::Background(_) => "background",
            Self::Scenario(_) => "scenario",
            Self::ScenarioOutline(_) => "scenario-outline",
            Self::Examples(_) => "examples",
            Self::StartOfScenario(_) => "start-of-scenario",
            Self::EndOfScenario(_) => "end-of-scenario",
            Self::Step(_) => "step",
            Self::Match(_) => "match",
            Self::Result(_) => "result",
            Self::Before(_) => "before",
            Self::After(_) => "after",
            Self::Embedding { .. } => "embedding",
            Self::Write { .. } => "write",
            Self::SyntaxError { .. } => "syntax-error",
            Self::Done => "done",
            Self::Close => "close",
            Self::Eof => "eof",
        }
    }

    /// Deliver this callback to `visitor`.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by the visitor.
    pub fn dispatch<V>(&self, visitor: &mut V) -> Result<(), StoryError>
    where
        V: StructureVisitor + ResultVisitor + ?Sized,
    {
        match self {
            Self::Uri { uri } => visitor.uri_declared(uri),
            Self::Feature(feature) => visitor.feature_entered(feature),
            Self::Background(background) => visitor.background_declared(background),
            Self::Scenario(scenario) => visitor.scenario_declared(scenario),
            Self::ScenarioOutline(outline) => visitor.outline_declared(outline),
            Self::Examples(block) => visitor.examples_declared(block),
            Self::StartOfScenario(scenario) => visitor.scenario_entered(scenario),
            Self::EndOfScenario(scenario) => visitor.scenario_exited(scenario),
            Self::Step(step) => visitor.step_declared(step),
            Self::Match(step_match) => visitor.match_found(step_match),
            Self::Result(result) => visitor.result_reported(result),
            Self::Before(result) => visitor.before_hook(result),
            Self::After(result) => visitor.after_hook(result),
            Self::Embedding { mime_type, data } => visitor.embedding(mime_type, data),
            Self::Write { text } => visitor.output_written(text),
            Self::SyntaxError { message } => visitor.syntax_error(message),
            Self::Done => visitor.suite_ended(),
            Self::Close => visitor.closed(),
            Self::Eof => visitor.eof(),
        }
    }
}

/// Visitor storing every callback it receives as a [`RunnerEvent`].
///
/// Useful for recording transcripts from a walked feature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventCollector {
    events: Vec<RunnerEvent>,
}

impl EventCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected callbacks, in arrival order.
    #[must_use]
    pub fn events(&self) -> &[RunnerEvent] {
        &self.events
    }

    /// Consume the collector, returning its callbacks.
    #[must_use]
    pub fn into_events(self) -> Vec<RunnerEvent> {
        self.events
    }

    fn push(&mut self, event: RunnerEvent) -> Result<(), StoryError> {
        self.events.push(event);
        Ok(())
    }
}

impl StructureVisitor for EventCollector {
    fn uri_declared(&mut self, uri: &str) -> Result<(), StoryError> {
        self.push(RunnerEvent::Uri {
            uri: uri.to_string(),
        })
    }

    fn feature_entered(&mut self, feature: &FeatureNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::Feature(feature.clone()))
    }

    fn background_declared(&mut self, background: &ScenarioNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::Background(background.clone()))
    }

    fn scenario_declared(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::Scenario(scenario.clone()))
    }

    fn outline_declared(&mut self, outline: &ScenarioNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::ScenarioOutline(outline.clone()))
    }

    fn examples_declared(&mut self, block: &ExamplesNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::Examples(block.clone()))
    }

    fn scenario_entered(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::StartOfScenario(scenario.clone()))
    }

    fn scenario_exited(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::EndOfScenario(scenario.clone()))
    }

    fn step_declared(&mut self, step: &StepNode) -> Result<(), StoryError> {
        self.push(RunnerEvent::Step(step.clone()))
    }

    fn suite_ended(&mut self) -> Result<(), StoryError> {
        self.push(RunnerEvent::Done)
    }

    fn closed(&mut self) -> Result<(), StoryError> {
        self.push(RunnerEvent::Close)
    }

    fn eof(&mut self) -> Result<(), StoryError> {
        self.push(RunnerEvent::Eof)
    }

    fn syntax_error(&mut self, message: &str) -> Result<(), StoryError> {
        self.push(RunnerEvent::SyntaxError {
            message: message.to_string(),
        })
    }
}

impl ResultVisitor for EventCollector {
    fn before_hook(&mut self, result: &StepResult) -> Result<(), StoryError> {
        self.push(RunnerEvent::Before(result.clone()))
    }

    fn match_found(&mut self, step_match: &StepMatch) -> Result<(), StoryError> {
        self.push(RunnerEvent::Match(step_match.clone()))
    }

    fn result_reported(&mut self, result: &StepResult) -> Result<(), StoryError> {
        self.push(RunnerEvent::Result(result.clone()))
    }

    fn after_hook(&mut self, result: &StepResult) -> Result<(), StoryError> {
        self.push(RunnerEvent::After(result.clone()))
    }

    fn embedding(&mut self, mime_type: &str, data: &[u8]) -> Result<(), StoryError> {
        self.push(RunnerEvent::Embedding {
            mime_type: mime_type.to_string(),
            data: data.to_vec(),
        })
    }

    fn output_written(&mut self, text: &str) -> Result<(), StoryError> {
        self.push(RunnerEvent::Write {
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureCause;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"event":"uri","uri":"basket.feature"}"#, "uri")]
    #[case(r#"{"event":"feature","id":"basket","name":"Basket"}"#, "feature")]
    #[case(r#"{"event":"scenario-outline","name":"Stock"}"#, "scenario-outline")]
    #[case(r#"{"event":"examples","rows":[["a"],["1"]]}"#, "examples")]
    #[case(r#"{"event":"start-of-scenario","name":"Stock"}"#, "start-of-scenario")]
    #[case(r#"{"event":"match"}"#, "match")]
    #[case(r#"{"event":"result","status":"passed"}"#, "result")]
    #[case(r#"{"event":"done"}"#, "done")]
    fn decodes_transcript_lines(#[case] line: &str, #[case] label: &str) {
        let event: RunnerEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(error) => panic!("{line} should decode: {error}"),
        };
        assert_eq!(event.label(), label);
    }

    #[test]
    fn failed_results_keep_their_cause() {
        let event = RunnerEvent::Result(StepResult::failed(
            FailureCause::error("wrapper").caused_by(FailureCause::assumption("skip me")),
        ));
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(error) => panic!("event should encode: {error}"),
        };
        let decoded: RunnerEvent = match serde_json::from_str(&json) {
            Ok(decoded) => decoded,
            Err(error) => panic!("event should decode: {error}"),
        };
        assert_eq!(decoded, event);
    }

    #[test]
    fn dispatch_reaches_the_matching_callback() {
        let mut collector = EventCollector::new();
        let events = [
            RunnerEvent::Step(StepNode::new("Given ", "a basket")),
            RunnerEvent::Match(StepMatch::step_definition()),
            RunnerEvent::Result(StepResult::passed()),
            RunnerEvent::Done,
        ];
        for event in &events {
            if let Err(error) = event.dispatch(&mut collector) {
                panic!("collector never fails: {error}");
            }
        }
        assert_eq!(collector.events(), events);
    }
}

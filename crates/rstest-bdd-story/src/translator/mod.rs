//! Translation of runner callbacks into story lifecycle events.
//!
//! A Gherkin runner reports a scenario outline as one outline declaration,
//! one callback per examples block and then a flat run of scenarios, one per
//! example row. Story reports instead expect a single test holding the
//! example table, with explicit example boundaries around the steps of each
//! row. [`Translator`] bridges the two models.
//!
//! Declared steps wait in a FIFO queue until the runner reports their
//! result. A match peeks at the head of the queue to announce the step; the
//! following result polls that same step.
//!
//! Outline state moves through `idle`, `open` (after the first example
//! starts the enclosing test), `running` (one example per row) and back to
//! `idle` once every declared row has finished.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::StoryError;
use crate::event::{StepFailure, StoryEvent};
use crate::examples::{ExampleRow, ExampleTable, parse_examples};
use crate::failure::FailureCause;
use crate::listener::WorkerContext;
use crate::model::{
    ExamplesNode, FeatureNode, MatchKind, ResultStatus, ScenarioNode, StepMatch, StepNode,
    StepResult,
};
use crate::queue::PendingSteps;
use crate::reporter::StoryReporter;
use crate::story::{DriverSelection, Story};
use crate::tags::{convert_tags, requested_driver};
use crate::title::normalized;
use crate::visitor::{ResultVisitor, StructureVisitor};

const MISSING_FAILURE_MESSAGE: &str = "step failed without a reported cause";

/// Per-outline bookkeeping.
#[derive(Debug)]
struct OutlineState {
    running: bool,
    first_step: bool,
    rows: Vec<ExampleRow>,
    table: Option<ExampleTable>,
    current: usize,
    remaining: usize,
}

impl Default for OutlineState {
    fn default() -> Self {
        Self {
            running: false,
            first_step: true,
            rows: Vec::new(),
            table: None,
            current: 0,
            remaining: 0,
        }
    }
}

/// Stateful adapter from runner callbacks to [`StoryEvent`]s.
///
/// Each worker delivering callbacks owns one translator. The worker's
/// listener and bus are enlisted from the shared [`StoryReporter`] on first
/// use unless a context is supplied up front.
///
/// # Examples
/// ```
/// use rstest_bdd_story::config::StoryConfig;
/// use rstest_bdd_story::model::{FeatureNode, ScenarioNode, StepMatch, StepNode, StepResult};
/// use rstest_bdd_story::reporter::StoryReporter;
/// use rstest_bdd_story::translator::Translator;
/// use rstest_bdd_story::visitor::{ResultVisitor, StructureVisitor};
///
/// # fn main() -> Result<(), rstest_bdd_story::error::StoryError> {
/// let dir = tempfile::tempdir()?;
/// let output = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
///     .unwrap_or_else(|_| "target/story-doc".into());
/// let reporter = StoryReporter::from_config(StoryConfig::default().with_output_dir(output));
/// let mut translator = Translator::new(reporter.clone());
///
/// let scenario = ScenarioNode::new("Adding items");
/// translator.feature_entered(&FeatureNode::new("Basket"))?;
/// translator.scenario_entered(&scenario)?;
/// translator.step_declared(&StepNode::new("Given ", "an empty basket"))?;
/// translator.match_found(&StepMatch::step_definition())?;
/// translator.result_reported(&StepResult::passed())?;
/// translator.scenario_exited(&scenario)?;
/// translator.suite_ended()?;
///
/// assert_eq!(reporter.all_test_outcomes().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Translator {
    reporter: Arc<StoryReporter>,
    context: Option<WorkerContext>,
    steps: PendingSteps,
    feature: Option<FeatureNode>,
    driver: DriverSelection,
    outline: OutlineState,
}

impl Translator {
    /// Create a translator that enlists its worker context lazily.
    #[must_use]
    pub fn new(reporter: Arc<StoryReporter>) -> Self {
        Self {
            reporter,
            context: None,
            steps: PendingSteps::new(),
            feature: None,
            driver: DriverSelection::Default,
            outline: OutlineState::default(),
        }
    }

    /// Create a translator emitting through an existing worker context.
    ///
    /// The caller is responsible for registering the context's listener
    /// with the reporter's registry if its outcomes should be reported.
    #[must_use]
    pub fn with_context(reporter: Arc<StoryReporter>, context: WorkerContext) -> Self {
        Self {
            context: Some(context),
            ..Self::new(reporter)
        }
    }

    /// Shared reporter.
    #[must_use]
    pub fn reporter(&self) -> &Arc<StoryReporter> {
        &self.reporter
    }

    /// Feature currently open, if any.
    #[must_use]
    pub fn current_feature(&self) -> Option<&FeatureNode> {
        self.feature.as_ref()
    }

    /// Driver requested by the current feature.
    #[must_use]
    pub fn driver(&self) -> &DriverSelection {
        &self.driver
    }

    /// Number of declared steps still waiting for their result.
    #[must_use]
    pub fn pending_steps(&self) -> usize {
        self.steps.len()
    }

    /// Whether an outline's examples are being executed.
    #[must_use]
    pub fn examples_running(&self) -> bool {
        self.outline.running
    }

    /// Example table accumulated for the current outline.
    #[must_use]
    pub fn example_table(&self) -> Option<&ExampleTable> {
        self.outline.table.as_ref()
    }

    /// Example rows not yet finished for the current examples block.
    #[must_use]
    pub fn remaining_examples(&self) -> usize {
        self.outline.remaining
    }

    fn context(&mut self) -> &WorkerContext {
        self.context.get_or_insert_with(|| self.reporter.enlist())
    }

    fn emit(&mut self, event: StoryEvent) {
        self.context().bus().emit(event);
    }

    fn bind_driver(&mut self) {
        let driver = self.driver.clone();
        self.context().listener().with_driver(&driver);
    }

    /// Report a failed step.
    ///
    /// One level of cause nesting is unwrapped. Violated assumptions are
    /// reported as such rather than as failures.
    pub fn fail_step(&mut self, title: &str, cause: &FailureCause) {
        let root = cause.root_cause();
        self.emit(StoryEvent::StepTitleUpdated {
            title: title.to_string(),
        });
        if root.is_assumption_violation() {
            debug!(step = title, "assumption violated");
            self.emit(StoryEvent::AssumptionViolated {
                message: root.message().to_string(),
            });
        } else {
            debug!(step = title, failure = %root, "step failed");
            self.emit(StoryEvent::StepFailed(StepFailure {
                title: normalized(title),
                cause: root.clone(),
            }));
        }
    }

    fn start_scenario(&mut self, scenario: &ScenarioNode) {
        debug!(scenario = %scenario.name, "test started");
        self.emit(StoryEvent::TestStarted {
            name: scenario.name.clone(),
        });
        self.emit(StoryEvent::DescriptionAdded {
            description: scenario.description.clone(),
        });
        let feature_tags = self
            .feature
            .as_ref()
            .map(|feature| convert_tags(&feature.tags))
            .unwrap_or_default();
        self.emit(StoryEvent::TagsAdded(feature_tags));
        self.emit(StoryEvent::TagsAdded(convert_tags(&scenario.tags)));
        self.bind_driver();
    }

    fn start_example(&mut self, scenario: &ScenarioNode, row: ExampleRow) {
        if self.outline.first_step {
            self.start_scenario(scenario);
            let table = self.outline.table.clone().unwrap_or_default();
            self.emit(StoryEvent::UseExamples(table));
            self.outline.first_step = false;
        }
        trace!(index = self.outline.current, "example started");
        self.emit(StoryEvent::ClearStepFailures);
        self.emit(StoryEvent::ExampleStarted(row));
        self.outline.current += 1;
    }

    fn finish_example(&mut self) -> Result<(), StoryError> {
        self.emit(StoryEvent::ExampleFinished);
        self.emit(StoryEvent::StepFinished);
        self.outline.remaining = self.outline.remaining.saturating_sub(1);
        if self.outline.remaining > 0 {
            return Ok(());
        }
        debug!(examples = self.outline.current, "examples block finished");
        self.outline.running = false;
        self.reporter.generate_reports()
    }

    fn merge_examples(&mut self, block: &ExamplesNode) -> Result<usize, StoryError> {
        let parsed = parse_examples(block)?;
        let row_count = parsed.rows.len();
        self.outline.rows.extend(parsed.rows.iter().cloned());
        let Some(table) = self.outline.table.as_mut() else {
            self.outline.table = Some(ExampleTable::new(
                parsed.headers,
                parsed.rows,
                parsed.title,
                parsed.description,
            ));
            return Ok(row_count);
        };
        table.start_new_dataset(parsed.title, parsed.description);
        for row in &parsed.rows {
            table.add_row(row.project(table.headers()));
        }
        Ok(row_count)
    }
}

impl StructureVisitor for Translator {
    fn feature_entered(&mut self, feature: &FeatureNode) -> Result<(), StoryError> {
        if self.feature.is_some() {
            self.emit(StoryEvent::SuiteFinished);
        }
        self.outline = OutlineState::default();
        self.feature = Some(feature.clone());
        self.driver = requested_driver(&feature.tags);
        debug!(feature = %feature.name, driver = %self.driver, "feature entered");

        let unique_session = self.reporter.config().unique_session;
        self.emit(StoryEvent::SessionConfigured { unique_session });
        self.emit(StoryEvent::DriverSelected(self.driver.clone()));
        self.bind_driver();

        let mut story = Story::new(feature.id.clone(), feature.name.clone());
        if !feature.description.is_empty() {
            story = story.with_narrative(feature.description.clone());
        }
        self.emit(StoryEvent::SuiteStarted(story));
        Ok(())
    }

    fn outline_declared(&mut self, outline: &ScenarioNode) -> Result<(), StoryError> {
        trace!(outline = %outline.name, "outline declared");
        self.outline = OutlineState::default();
        Ok(())
    }

    fn examples_declared(&mut self, block: &ExamplesNode) -> Result<(), StoryError> {
        let rows = self.merge_examples(block).inspect_err(|error| {
            warn!(block = %block.name, %error, "rejected examples block");
        })?;
        // A header-only block has no examples to run.
        self.outline.running = rows > 0;
        self.outline.remaining = rows;
        debug!(block = %block.name, rows, "examples declared");
        if !self.outline.first_step {
            let table = self.outline.table.clone().unwrap_or_default();
            self.emit(StoryEvent::UseExamples(table));
        }
        Ok(())
    }

    fn scenario_entered(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError> {
        if !self.outline.running {
            self.start_scenario(scenario);
            return Ok(());
        }
        let index = self.outline.current;
        let Some(row) = self.outline.rows.get(index).cloned() else {
            let available = self.outline.rows.len();
            warn!(index, available, "example started beyond the declared rows");
            return Err(StoryError::ExampleRowOutOfRange { index, available });
        };
        self.start_example(scenario, row);
        Ok(())
    }

    fn scenario_exited(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError> {
        trace!(scenario = %scenario.name, "scenario exited");
        if self.outline.running {
            self.finish_example()
        } else {
            self.reporter.generate_reports()
        }
    }

    fn step_declared(&mut self, step: &StepNode) -> Result<(), StoryError> {
        trace!(step = %step.title(), "step declared");
        self.steps.push(step.clone());
        Ok(())
    }

    fn suite_ended(&mut self) -> Result<(), StoryError> {
        if self.feature.take().is_some() {
            self.emit(StoryEvent::SuiteFinished);
            self.context().bus().close();
        }
        self.outline.running = false;
        debug!("suite ended");
        Ok(())
    }
}

impl ResultVisitor for Translator {
    fn match_found(&mut self, step_match: &StepMatch) -> Result<(), StoryError> {
        if step_match.kind != MatchKind::StepDefinition {
            trace!(kind = ?step_match.kind, "ignoring non-step match");
            return Ok(());
        }
        let Some(step) = self.steps.peek() else {
            warn!("match reported with no pending step");
            return Err(StoryError::NoPendingStep {
                callback: "match-found",
            });
        };
        let title = normalized(&step.title());
        self.emit(StoryEvent::StepStarted {
            title: title.clone(),
        });
        self.emit(StoryEvent::StepTitleUpdated { title });
        Ok(())
    }

    fn result_reported(&mut self, result: &StepResult) -> Result<(), StoryError> {
        let Some(step) = self.steps.poll() else {
            warn!(status = %result.status, "result reported with no pending step");
            return Err(StoryError::NoPendingStep {
                callback: "result-reported",
            });
        };
        let title = step.title();
        match result.status {
            ResultStatus::Passed => self.emit(StoryEvent::StepFinished),
            ResultStatus::Failed => {
                let fallback = FailureCause::error(MISSING_FAILURE_MESSAGE);
                self.fail_step(&title, result.error.as_ref().unwrap_or(&fallback));
            }
            ResultStatus::Skipped => self.emit(StoryEvent::StepIgnored),
            ResultStatus::Undefined => {
                self.emit(StoryEvent::StepStarted {
                    title: normalized(&title),
                });
                self.emit(StoryEvent::StepPending);
            }
            ResultStatus::Unknown => trace!(step = %title, "ignoring unknown result status"),
        }
        if self.steps.is_empty() {
            if self.outline.running {
                self.emit(StoryEvent::StepFinished);
            }
            self.emit(StoryEvent::TestFinished);
        }
        Ok(())
    }
}

//! Default step listener folding story events into test outcomes.
//!
//! Started steps form a stack: a step opened while another is open becomes
//! its child, which is how each outline example groups its own steps. A
//! closing event finishes the innermost open step. Events that find nothing
//! to act on are ignored.

use std::sync::Mutex;

use tracing::trace;

use crate::event::{StepFailure, StoryEvent};
use crate::listener::{StepListener, lock_recovering};
use crate::outcome::{StepOutcome, TestOutcome, TestResult};
use crate::story::{DriverSelection, Story};
use crate::title::normalized;

#[derive(Debug, Default)]
struct RecorderState {
    story: Option<Story>,
    driver: DriverSelection,
    outcomes: Vec<TestOutcome>,
    current: Option<usize>,
    open: Vec<StepOutcome>,
}

impl RecorderState {
    fn current_outcome(&mut self) -> Option<&mut TestOutcome> {
        let index = self.current?;
        self.outcomes.get_mut(index)
    }

    fn start_test(&mut self, name: &str) {
        self.outcomes.push(TestOutcome::new(
            name,
            self.story.clone(),
            self.driver.clone(),
        ));
        self.current = Some(self.outcomes.len() - 1);
        self.open.clear();
    }

    fn close_step(&mut self, result: TestResult, failure: Option<String>) {
        let Some(mut step) = self.open.pop() else {
            trace!(result = result.label(), "no open step to close");
            return;
        };
        step.finish(result, failure);
        if let Some(parent) = self.open.last_mut() {
            parent.push_child(step);
        } else if let Some(outcome) = self.current_outcome() {
            outcome.push_step(step);
        } else {
            trace!(step = step.title(), "step closed outside of a test");
        }
    }

    fn fail_step(&mut self, failure: &StepFailure) {
        if let Some(step) = self.open.last_mut() {
            step.retitle(normalized(&failure.title));
        }
        self.close_step(TestResult::Failure, Some(failure.cause.to_string()));
    }

    fn apply(&mut self, event: &StoryEvent) {
        match event {
            StoryEvent::DriverSelected(driver) => self.driver = driver.clone(),
            StoryEvent::SuiteStarted(story) => {
                self.story = Some(story.clone());
                self.current = None;
            }
            StoryEvent::SuiteFinished => {
                self.current = None;
                self.open.clear();
            }
            StoryEvent::TestStarted { name } => self.start_test(name),
            StoryEvent::DescriptionAdded { description } => {
                if let Some(outcome) = self.current_outcome() {
                    outcome.set_description(description);
                }
            }
            StoryEvent::TagsAdded(tags) => {
                if let Some(outcome) = self.current_outcome() {
                    outcome.add_tags(tags);
                }
            }
            StoryEvent::UseExamples(table) => {
                if let Some(outcome) = self.current_outcome() {
                    outcome.use_examples(table.clone());
                }
            }
            StoryEvent::ExampleStarted(row) => self.open.push(StepOutcome::started(row.to_string())),
            StoryEvent::StepStarted { title } => self.open.push(StepOutcome::started(title.clone())),
            StoryEvent::StepTitleUpdated { title } => {
                if let Some(step) = self.open.last_mut() {
                    step.retitle(normalized(title));
                }
            }
            StoryEvent::StepFinished => self.close_step(TestResult::Success, None),
            StoryEvent::StepIgnored => self.close_step(TestResult::Ignored, None),
            StoryEvent::StepPending => self.close_step(TestResult::Pending, None),
            StoryEvent::StepFailed(failure) => self.fail_step(failure),
            StoryEvent::AssumptionViolated { message } => {
                self.close_step(TestResult::Skipped, Some(message.clone()));
            }
            StoryEvent::SessionConfigured { .. }
            | StoryEvent::ExampleFinished
            | StoryEvent::ClearStepFailures
            | StoryEvent::TestFinished => {}
        }
    }
}

/// Listener keeping every test outcome of its worker in memory.
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    state: Mutex<RecorderState>,
}

impl OutcomeRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepListener for OutcomeRecorder {
    fn notify(&self, event: &StoryEvent) {
        lock_recovering(&self.state).apply(event);
    }

    fn with_driver(&self, driver: &DriverSelection) {
        lock_recovering(&self.state).driver = driver.clone();
    }

    fn test_outcomes(&self) -> Vec<TestOutcome> {
        lock_recovering(&self.state).outcomes.clone()
    }
}

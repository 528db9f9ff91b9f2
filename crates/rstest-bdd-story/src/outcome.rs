//! Test outcomes assembled by step listeners.

use serde::Serialize;

use crate::examples::ExampleTable;
use crate::story::{DriverSelection, Story, TestTag};

/// Result of a step or test, ordered from best to worst.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Ran and passed.
    #[default]
    Success,
    /// Not run because an earlier step did not pass.
    Ignored,
    /// Stopped by a violated assumption.
    Skipped,
    /// Not implemented yet.
    Pending,
    /// Ran and failed.
    Failure,
}

impl TestResult {
    /// Lowercase label for the result.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::outcome::TestResult;
    ///
    /// assert_eq!(TestResult::Failure.label(), "failure");
    /// assert!(TestResult::Failure > TestResult::Pending);
    /// ```
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Ignored => "ignored",
            Self::Skipped => "skipped",
            Self::Pending => "pending",
            Self::Failure => "failure",
        }
    }
}

/// A recorded step, possibly grouping nested steps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    title: String,
    result: TestResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<StepOutcome>,
}

impl StepOutcome {
    /// Create a step that has started but not finished.
    #[must_use]
    pub fn started(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            result: TestResult::Success,
            failure: None,
            children: Vec::new(),
        }
    }

    /// Step title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Worst result of this step and its children.
    #[must_use]
    pub fn result(&self) -> TestResult {
        self.children
            .iter()
            .map(Self::result)
            .fold(self.result, Ord::max)
    }

    /// Failure message, when the step failed or violated an assumption.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Nested steps.
    #[must_use]
    pub fn children(&self) -> &[StepOutcome] {
        &self.children
    }

    pub(crate) fn retitle(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn finish(&mut self, result: TestResult, failure: Option<String>) {
        self.result = result;
        self.failure = failure;
    }

    pub(crate) fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

/// Everything recorded about one test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    story: Option<Story>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    tags: Vec<TestTag>,
    driver: DriverSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    examples: Option<ExampleTable>,
    steps: Vec<StepOutcome>,
}

impl TestOutcome {
    /// Start recording a test.
    #[must_use]
    pub fn new(title: impl Into<String>, story: Option<Story>, driver: DriverSelection) -> Self {
        Self {
            title: title.into(),
            story,
            description: None,
            tags: Vec::new(),
            driver,
            examples: None,
            steps: Vec::new(),
        }
    }

    /// Test title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Story the test belongs to.
    #[must_use]
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Test description, when one was added.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Tags attached to the test, in the order they were added.
    #[must_use]
    pub fn tags(&self) -> &[TestTag] {
        &self.tags
    }

    /// Driver bound to the test.
    #[must_use]
    pub fn driver(&self) -> &DriverSelection {
        &self.driver
    }

    /// Example data, for scenario outlines.
    #[must_use]
    pub fn examples(&self) -> Option<&ExampleTable> {
        self.examples.as_ref()
    }

    /// Top-level steps. Outline tests hold one group per example row.
    #[must_use]
    pub fn steps(&self) -> &[StepOutcome] {
        &self.steps
    }

    /// Worst step result; a test without steps is pending.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::outcome::{TestOutcome, TestResult};
    /// use rstest_bdd_story::story::DriverSelection;
    ///
    /// let outcome = TestOutcome::new("empty", None, DriverSelection::Default);
    /// assert_eq!(outcome.result(), TestResult::Pending);
    /// ```
    #[must_use]
    pub fn result(&self) -> TestResult {
        self.steps
            .iter()
            .map(StepOutcome::result)
            .max()
            .unwrap_or(TestResult::Pending)
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
    }

    pub(crate) fn add_tags(&mut self, tags: &[TestTag]) {
        self.tags.extend_from_slice(tags);
    }

    pub(crate) fn use_examples(&mut self, table: ExampleTable) {
        self.examples = Some(table);
    }

    pub(crate) fn push_step(&mut self, step: StepOutcome) {
        self.steps.push(step);
    }
}

//! Story lifecycle events and the bus that carries them.

use crate::examples::{ExampleRow, ExampleTable};
use crate::failure::FailureCause;
use crate::story::{DriverSelection, Story, TestTag};

/// A failed step as reported to the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepFailure {
    /// Normalised step title.
    pub title: String,
    /// Root cause of the failure.
    pub cause: FailureCause,
}

/// Lifecycle event produced by the translator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoryEvent {
    /// Whether each test runs in an isolated session.
    SessionConfigured {
        /// `true` when sessions must not be shared between tests.
        unique_session: bool,
    },
    /// The driver requested for the current feature.
    DriverSelected(DriverSelection),
    /// A feature started.
    SuiteStarted(Story),
    /// The current feature finished.
    SuiteFinished,
    /// A scenario, or the enclosing test of an outline, started.
    TestStarted {
        /// Scenario title.
        name: String,
    },
    /// Description text for the current test.
    DescriptionAdded {
        /// Scenario description; may be empty.
        description: String,
    },
    /// Tags for the current test.
    TagsAdded(Vec<TestTag>),
    /// Example data attached to the current test.
    UseExamples(ExampleTable),
    /// One example row of an outline started.
    ExampleStarted(ExampleRow),
    /// The current example row finished.
    ExampleFinished,
    /// A step started.
    StepStarted {
        /// Step title as declared.
        title: String,
    },
    /// The title of the current step changed.
    StepTitleUpdated {
        /// Replacement title.
        title: String,
    },
    /// The current step passed.
    StepFinished,
    /// The current step was skipped.
    StepIgnored,
    /// The current step has no implementation.
    StepPending,
    /// The current step failed.
    StepFailed(StepFailure),
    /// The current step violated an assumption.
    AssumptionViolated {
        /// Message carried by the violated assumption.
        message: String,
    },
    /// Failures recorded for earlier steps no longer apply.
    ClearStepFailures,
    /// The current test finished.
    TestFinished,
}

impl StoryEvent {
    /// Stable kebab-case label for the event.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::event::StoryEvent;
    ///
    /// assert_eq!(StoryEvent::StepFinished.label(), "step-finished");
    /// ```
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SessionConfigured { .. } => "configure-session",
            Self::DriverSelected(_) => "set-driver",
            Self::SuiteStarted(_) => "suite-started",
            Self::SuiteFinished => "suite-finished",
            Self::TestStarted { .. } => "test-started",
            Self::DescriptionAdded { .. } => "add-description",
            Self::TagsAdded(_) => "add-tags",
            Self::UseExamples(_) => "use-examples",
            Self::ExampleStarted(_) => "example-started",
            Self::ExampleFinished => "example-finished",
            Self::StepStarted { .. } => "step-started",
            Self::StepTitleUpdated { .. } => "update-step-title",
            Self::StepFinished => "step-finished",
            Self::StepIgnored => "step-ignored",
            Self::StepPending => "step-pending",
            Self::StepFailed(_) => "step-failed",
            Self::AssumptionViolated { .. } => "assumption-violated",
            Self::ClearStepFailures => "clear-step-failures",
            Self::TestFinished => "test-finished",
        }
    }
}

/// Sink for story events.
///
/// Forwarding is fire-and-forget: the translator never reads anything back
/// from the bus.
pub trait EventBus: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: StoryEvent);

    /// Final teardown once the runner reports that the run is done.
    fn close(&self) {}
}

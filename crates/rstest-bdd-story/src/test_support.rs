//! Recording doubles for exercising the translator in tests.
//!
//! [`Harness`] wires a [`Translator`] to an [`EventLog`], which serves as the
//! worker's bus and listener at once, and to a [`CountingGenerator`] which
//! marks every report generation in the same log. The resulting timeline
//! lists event labels, `generate-reports` and `close` in the order they
//! happened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::StoryConfig;
use crate::event::{EventBus, StoryEvent};
use crate::listener::{ListenerRegistry, StepListener, WorkerContext, lock_recovering};
use crate::outcome::TestOutcome;
use crate::recorder::OutcomeRecorder;
use crate::reporter::StoryReporter;
use crate::reporting::{ReportError, ReportGenerator};
use crate::story::DriverSelection;
use crate::translator::Translator;

/// Timeline marker recorded for each report generation.
pub const GENERATE_REPORTS: &str = "generate-reports";
/// Timeline marker recorded when the bus is closed.
pub const CLOSE: &str = "close";

#[derive(Default)]
struct LogState {
    events: Vec<StoryEvent>,
    timeline: Vec<&'static str>,
}

/// Bus and listener recording every event it sees.
///
/// Outcomes are folded by an inner [`OutcomeRecorder`].
#[derive(Default)]
pub struct EventLog {
    state: Mutex<LogState>,
    recorder: OutcomeRecorder,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<StoryEvent> {
        lock_recovering(&self.state).events.clone()
    }

    /// Event labels and markers, in order.
    #[must_use]
    pub fn timeline(&self) -> Vec<&'static str> {
        lock_recovering(&self.state).timeline.clone()
    }

    /// Number of timeline entries carrying `label`.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        lock_recovering(&self.state)
            .timeline
            .iter()
            .filter(|entry| **entry == label)
            .count()
    }

    /// Append a marker to the timeline.
    pub fn mark(&self, marker: &'static str) {
        lock_recovering(&self.state).timeline.push(marker);
    }

    /// Forget everything recorded so far, outcomes excepted.
    pub fn clear(&self) {
        let mut state = lock_recovering(&self.state);
        state.events.clear();
        state.timeline.clear();
    }
}

impl StepListener for EventLog {
    fn notify(&self, event: &StoryEvent) {
        {
            let mut state = lock_recovering(&self.state);
            state.timeline.push(event.label());
            state.events.push(event.clone());
        }
        self.recorder.notify(event);
    }

    fn with_driver(&self, driver: &DriverSelection) {
        self.recorder.with_driver(driver);
    }

    fn test_outcomes(&self) -> Vec<TestOutcome> {
        self.recorder.test_outcomes()
    }
}

impl EventBus for EventLog {
    fn emit(&self, event: StoryEvent) {
        self.notify(&event);
    }

    fn close(&self) {
        self.mark(CLOSE);
    }
}

/// Report generator counting its invocations.
#[derive(Default)]
pub struct CountingGenerator {
    calls: AtomicUsize,
    last: Mutex<Vec<TestOutcome>>,
    log: Option<Arc<EventLog>>,
}

impl CountingGenerator {
    /// Create a generator that only counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that also marks each call in `log`.
    #[must_use]
    pub fn observing(log: Arc<EventLog>) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    /// Number of report generations so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Outcomes handed to the most recent generation.
    #[must_use]
    pub fn last_outcomes(&self) -> Vec<TestOutcome> {
        lock_recovering(&self.last).clone()
    }
}

impl ReportGenerator for CountingGenerator {
    fn generate(&self, outcomes: &[TestOutcome]) -> Result<(), ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock_recovering(&self.last) = outcomes.to_vec();
        if let Some(log) = &self.log {
            log.mark(GENERATE_REPORTS);
        }
        Ok(())
    }
}

/// A translator wired to recording doubles.
pub struct Harness {
    /// Translator under test.
    pub translator: Translator,
    /// Bus and listener of the translator's worker.
    pub log: Arc<EventLog>,
    /// Report generator of the shared reporter.
    pub reports: Arc<CountingGenerator>,
}

impl Harness {
    /// Build a harness with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoryConfig::default())
    }

    /// Build a harness with `config`.
    #[must_use]
    pub fn with_config(config: StoryConfig) -> Self {
        let log = Arc::new(EventLog::new());
        let reports = Arc::new(CountingGenerator::observing(Arc::clone(&log)));
        let registry = ListenerRegistry::new(|| Arc::new(EventLog::new()));
        let reporter = Arc::new(StoryReporter::new(config, registry, Arc::clone(&reports)));
        let listener: Arc<dyn StepListener> = log.clone();
        reporter.registry().register(Arc::clone(&listener));
        let bus: Arc<dyn EventBus> = log.clone();
        let translator = Translator::with_context(reporter, WorkerContext::new(bus, listener));
        Self {
            translator,
            log,
            reports,
        }
    }

    /// Event labels and markers recorded so far.
    #[must_use]
    pub fn timeline(&self) -> Vec<&'static str> {
        self.log.timeline()
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<StoryEvent> {
        self.log.events()
    }

    /// Outcomes recorded for the harness worker.
    #[must_use]
    pub fn outcomes(&self) -> Vec<TestOutcome> {
        self.log.test_outcomes()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

//! State shared by every translator of a run.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::StoryConfig;
use crate::error::StoryError;
use crate::listener::{ListenerRegistry, WorkerContext, lock_recovering};
use crate::outcome::TestOutcome;
use crate::reporting::{ReportGenerator, ReportService};

/// Configuration, listener registry and report generator shared across
/// workers.
///
/// Wrap it in an [`Arc`] and hand a clone to each worker's
/// [`Translator`](crate::translator::Translator).
pub struct StoryReporter {
    config: StoryConfig,
    registry: ListenerRegistry,
    generator: Box<dyn ReportGenerator>,
    report_lock: Mutex<()>,
}

impl StoryReporter {
    /// Assemble a reporter from its parts.
    #[must_use]
    pub fn new(
        config: StoryConfig,
        registry: ListenerRegistry,
        generator: impl ReportGenerator + 'static,
    ) -> Self {
        Self {
            config,
            registry,
            generator: Box::new(generator),
            report_lock: Mutex::new(()),
        }
    }

    /// Build a reporter that records outcomes in memory and writes report
    /// files according to `config`.
    #[must_use]
    pub fn from_config(config: StoryConfig) -> Arc<Self> {
        let service = ReportService::from_config(&config);
        Arc::new(Self::new(config, ListenerRegistry::with_recorders(), service))
    }

    /// Shared configuration.
    #[must_use]
    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    /// Registry of worker listeners.
    #[must_use]
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Create and register the context of a new worker.
    #[must_use]
    pub fn enlist(&self) -> WorkerContext {
        self.registry.enlist()
    }

    /// Outcomes of every worker, in registration order.
    #[must_use]
    pub fn all_test_outcomes(&self) -> Vec<TestOutcome> {
        self.registry.all_test_outcomes()
    }

    /// Hand the outcomes of every worker to the report generator.
    ///
    /// Calls are serialised: only one report generation runs at a time.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Report`] when the generator fails.
    pub fn generate_reports(&self) -> Result<(), StoryError> {
        let _guard = lock_recovering(&self.report_lock);
        let outcomes = self.registry.all_test_outcomes();
        debug!(outcomes = outcomes.len(), "generating story reports");
        self.generator.generate(&outcomes)?;
        Ok(())
    }
}

impl fmt::Debug for StoryReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryReporter")
            .field("config", &self.config)
            .field("listeners", &self.registry.len())
            .finish_non_exhaustive()
    }
}

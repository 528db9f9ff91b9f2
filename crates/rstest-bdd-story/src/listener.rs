//! Per-worker step listeners and the registry that aggregates them.
//!
//! Every worker delivering runner callbacks owns a [`WorkerContext`]: its own
//! listener plus the bus feeding it. Contexts are handed out by the shared
//! [`ListenerRegistry`], which remembers every listener it ever created so
//! report generation can gather outcomes across workers.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::event::{EventBus, StoryEvent};
use crate::outcome::TestOutcome;
use crate::recorder::OutcomeRecorder;
use crate::story::DriverSelection;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Receives story events for one worker and records test outcomes.
pub trait StepListener: Send + Sync {
    /// Observe an event emitted on the worker's bus.
    fn notify(&self, event: &StoryEvent);

    /// Bind the active test driver.
    fn with_driver(&self, driver: &DriverSelection) {
        let _ = driver;
    }

    /// Outcomes recorded so far.
    fn test_outcomes(&self) -> Vec<TestOutcome>;
}

/// Built-in bus delivering events to a single listener.
pub struct ListenerBus {
    listener: Arc<dyn StepListener>,
}

impl ListenerBus {
    /// Create a bus feeding `listener`.
    #[must_use]
    pub fn new(listener: Arc<dyn StepListener>) -> Self {
        Self { listener }
    }
}

impl EventBus for ListenerBus {
    fn emit(&self, event: StoryEvent) {
        trace!(event = event.label(), "story event");
        self.listener.notify(&event);
    }

    fn close(&self) {
        debug!("story event bus closed");
    }
}

/// The listener and bus owned by one worker.
#[derive(Clone)]
pub struct WorkerContext {
    bus: Arc<dyn EventBus>,
    listener: Arc<dyn StepListener>,
}

impl WorkerContext {
    /// Pair a bus with the listener it feeds.
    #[must_use]
    pub fn new(bus: Arc<dyn EventBus>, listener: Arc<dyn StepListener>) -> Self {
        Self { bus, listener }
    }

    /// The worker's event bus.
    #[must_use]
    pub fn bus(&self) -> &dyn EventBus {
        self.bus.as_ref()
    }

    /// The worker's listener.
    #[must_use]
    pub fn listener(&self) -> &dyn StepListener {
        self.listener.as_ref()
    }
}

type ListenerFactory = dyn Fn() -> Arc<dyn StepListener> + Send + Sync;

/// Creates worker listeners and keeps every one of them for aggregation.
pub struct ListenerRegistry {
    factory: Box<ListenerFactory>,
    listeners: Mutex<Vec<Arc<dyn StepListener>>>,
}

impl ListenerRegistry {
    /// Create a registry whose listeners come from `factory`.
    #[must_use]
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn StepListener> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Create a registry handing out [`OutcomeRecorder`] listeners.
    #[must_use]
    pub fn with_recorders() -> Self {
        Self::new(|| Arc::new(OutcomeRecorder::new()))
    }

    /// Create and register the context for a new worker.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::listener::ListenerRegistry;
    ///
    /// let registry = ListenerRegistry::with_recorders();
    /// let _first = registry.enlist();
    /// let _second = registry.enlist();
    /// assert_eq!(registry.len(), 2);
    /// assert!(registry.all_test_outcomes().is_empty());
    /// ```
    #[must_use]
    pub fn enlist(&self) -> WorkerContext {
        let listener = (self.factory)();
        let count = {
            let mut listeners = lock_recovering(&self.listeners);
            listeners.push(Arc::clone(&listener));
            listeners.len()
        };
        debug!(listeners = count, "registered worker listener");
        let bus: Arc<dyn EventBus> = Arc::new(ListenerBus::new(Arc::clone(&listener)));
        WorkerContext::new(bus, listener)
    }

    /// Register a listener created elsewhere, for workers using their own bus.
    pub fn register(&self, listener: Arc<dyn StepListener>) {
        lock_recovering(&self.listeners).push(listener);
    }

    /// Number of listeners registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        lock_recovering(&self.listeners).len()
    }

    /// Whether no worker has registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outcomes of every registered listener, flattened in registration
    /// order.
    #[must_use]
    pub fn all_test_outcomes(&self) -> Vec<TestOutcome> {
        let listeners = lock_recovering(&self.listeners).clone();
        listeners
            .iter()
            .flat_map(|listener| listener.test_outcomes())
            .collect()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::with_recorders()
    }
}

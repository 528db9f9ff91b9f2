//! Story-style reporting for Gherkin runners.
//!
//! This crate translates the callbacks of a Gherkin test runner into the
//! lifecycle events a story reporter expects. Runners announce features,
//! scenarios, steps and results as a flat stream; reports want tests with
//! explicit boundaries, and scenario outlines folded into a single test that
//! carries its example table and one group of steps per example row.
//!
//! # Overview
//!
//! - [`translator::Translator`] implements the runner callback traits in
//!   [`visitor`] and emits [`event::StoryEvent`]s on a per-worker bus.
//! - [`listener`] holds the per-worker listeners and the registry that
//!   aggregates their [`outcome::TestOutcome`]s across workers.
//! - [`reporting`] turns aggregated outcomes into JSON and `JUnit` reports.
//! - [`protocol`], [`transcript`] and [`walk`] let a run be recorded,
//!   replayed, or generated from parsed feature files.
//!
//! # Configuration
//!
//! [`config::StoryConfig::from_env`] reads:
//!
//! - `BDD_STORY_UNIQUE_SESSION`: isolated session per test (boolean)
//! - `BDD_STORY_OUTPUT_DIR`: report directory
//! - `BDD_STORY_REPORT_FORMAT`: `json`, `junit` or `all`
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rstest_bdd_story::config::StoryConfig;
//! use rstest_bdd_story::reporter::StoryReporter;
//! use rstest_bdd_story::translator::Translator;
//! use rstest_bdd_story::walk::{FeatureWalker, finish_run, parse_feature, passing_steps};
//!
//! # fn main() -> Result<(), rstest_bdd_story::error::StoryError> {
//! let reporter = StoryReporter::from_config(StoryConfig::from_env()?);
//! let mut translator = Translator::new(reporter);
//! let feature = parse_feature(Utf8Path::new("features/basket.feature"))?;
//! FeatureWalker::new(passing_steps).walk("features/basket.feature", &feature, &mut translator)?;
//! finish_run(&mut translator)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod examples;
pub mod failure;
pub mod listener;
pub mod model;
pub mod outcome;
pub mod protocol;
pub mod queue;
pub mod recorder;
pub mod reporter;
pub mod reporting;
pub mod story;
pub mod tags;
pub mod title;
pub mod transcript;
pub mod translator;
pub mod visitor;
pub mod walk;

/// Recording doubles for unit and integration tests.
#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use error::StoryError;
pub use event::{EventBus, StoryEvent};
pub use reporter::StoryReporter;
pub use translator::Translator;
pub use visitor::{ResultVisitor, StructureVisitor};

//! Command configuration merged from environment variables and flags.
//!
//! Story settings come from the `BDD_STORY_` variables understood by
//! [`StoryConfig`]; the log level is read from `BDD_STORY_LOG_LEVEL`.
//! Command line flags take precedence over both.

use std::env;
use std::str::FromStr;

use camino::Utf8PathBuf;
use rstest_bdd_story::config::StoryConfig;
use rstest_bdd_story::error::StoryError;
use rstest_bdd_story::reporting::ReportFormat;

/// Variable selecting the log level.
pub(crate) const LOG_LEVEL_VAR: &str = "BDD_STORY_LOG_LEVEL";

/// Log level enumeration matching tracing levels.
///
/// Defaults to `Warn` so report summaries stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(StoryError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    pub(crate) fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub(crate) struct CliConfig {
    pub log_level: LogLevel,
    pub story: StoryConfig,
}

/// Flag values overriding the environment.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub log_level: Option<LogLevel>,
    pub output_dir: Option<Utf8PathBuf>,
    pub report_format: Option<ReportFormat>,
    pub unique_session: bool,
}

impl CliConfig {
    /// Load configuration from the process environment.
    pub(crate) fn from_env() -> Result<Self, StoryError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, StoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };
        Ok(Self {
            log_level,
            story: StoryConfig::from_lookup(lookup)?,
        })
    }

    /// Apply command line flags on top of the environment.
    #[must_use]
    pub(crate) fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(dir) = overrides.output_dir {
            self.story = self.story.with_output_dir(dir);
        }
        if let Some(format) = overrides.report_format {
            self.story = self.story.with_report_format(format);
        }
        if overrides.unique_session {
            self.story = self.story.with_unique_session(true);
        }
        self
    }
}

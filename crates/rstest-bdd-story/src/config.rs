//! Reporter configuration parsed from environment variables.
//!
//! Every setting can be overridden with a variable prefixed by
//! `BDD_STORY_`:
//!
//! - `BDD_STORY_UNIQUE_SESSION`: run each test in an isolated session.
//! - `BDD_STORY_OUTPUT_DIR`: directory receiving report files.
//! - `BDD_STORY_REPORT_FORMAT`: `json`, `junit` or `all`.

use std::env;

use camino::Utf8PathBuf;

use crate::error::StoryError;
use crate::reporting::{ReportFormat, ReportFormatParseError};

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "BDD_STORY_";
/// Variable toggling isolated sessions.
pub const UNIQUE_SESSION_VAR: &str = "BDD_STORY_UNIQUE_SESSION";
/// Variable naming the report directory.
pub const OUTPUT_DIR_VAR: &str = "BDD_STORY_OUTPUT_DIR";
/// Variable selecting the report format.
pub const REPORT_FORMAT_VAR: &str = "BDD_STORY_REPORT_FORMAT";

const DEFAULT_OUTPUT_DIR: &str = "target/story-reports";

fn parse_env_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    let matches_any = |words: &[&str]| words.iter().any(|word| value.eq_ignore_ascii_case(word));
    if matches_any(&["1", "true", "yes", "on"]) {
        Some(true)
    } else if matches_any(&["0", "false", "no", "off"]) {
        Some(false)
    } else {
        None
    }
}

/// Settings shared by every translator of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryConfig {
    /// Whether each test runs in its own session.
    pub unique_session: bool,
    /// Directory receiving report files.
    pub output_dir: Utf8PathBuf,
    /// Which report files are written.
    pub report_format: ReportFormat,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            unique_session: false,
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_format: ReportFormat::default(),
        }
    }
}

impl StoryConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidConfig`] when a variable holds a value
    /// that cannot be interpreted.
    pub fn from_env() -> Result<Self, StoryError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::config::StoryConfig;
    /// use rstest_bdd_story::reporting::ReportFormat;
    ///
    /// let config = StoryConfig::from_lookup(|name| match name {
    ///     "BDD_STORY_UNIQUE_SESSION" => Some("yes".to_string()),
    ///     "BDD_STORY_REPORT_FORMAT" => Some("junit".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert!(config.unique_session);
    /// assert_eq!(config.report_format, ReportFormat::Junit);
    /// assert_eq!(config.output_dir, "target/story-reports");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidConfig`] for values that cannot be
    /// interpreted.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(UNIQUE_SESSION_VAR) {
            config.unique_session = parse_env_bool(&raw).ok_or_else(|| {
                StoryError::InvalidConfig(format!(
                    "invalid {UNIQUE_SESSION_VAR} value '{raw}', expected a boolean"
                ))
            })?;
        }
        if let Some(raw) = lookup(OUTPUT_DIR_VAR) {
            if raw.trim().is_empty() {
                return Err(StoryError::InvalidConfig(format!(
                    "{OUTPUT_DIR_VAR} must not be empty"
                )));
            }
            config.output_dir = Utf8PathBuf::from(raw);
        }
        if let Some(raw) = lookup(REPORT_FORMAT_VAR) {
            config.report_format = raw.parse().map_err(|error: ReportFormatParseError| {
                StoryError::InvalidConfig(error.to_string())
            })?;
        }
        Ok(config)
    }

    /// Replace the session isolation flag.
    #[must_use]
    pub fn with_unique_session(mut self, unique_session: bool) -> Self {
        self.unique_session = unique_session;
        self
    }

    /// Replace the report directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<Utf8PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Replace the report format.
    #[must_use]
    pub fn with_report_format(mut self, report_format: ReportFormat) -> Self {
        self.report_format = report_format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = match StoryConfig::from_lookup(|_| None) {
            Ok(config) => config,
            Err(error) => panic!("defaults should load: {error}"),
        };
        assert_eq!(config, StoryConfig::default());
        assert!(!config.unique_session);
        assert_eq!(config.report_format, ReportFormat::All);
    }

    #[test]
    fn parse_env_bool_understands_common_values() {
        for truthy in ["1", "true", "TRUE", "True", "yes", "Yes", "on", "ON"] {
            assert_eq!(
                parse_env_bool(truthy),
                Some(true),
                "expected {truthy} to be truthy"
            );
        }
        for falsy in ["0", "false", "FALSE", "no", "No", "off", "OFF"] {
            assert_eq!(
                parse_env_bool(falsy),
                Some(false),
                "expected {falsy} to be falsy"
            );
        }
        assert_eq!(parse_env_bool("maybe"), None);
    }

    #[rstest]
    #[case(UNIQUE_SESSION_VAR, "sometimes")]
    #[case(REPORT_FORMAT_VAR, "html")]
    #[case(OUTPUT_DIR_VAR, "  ")]
    fn rejects_invalid_values(#[case] name: &str, #[case] value: &str) {
        let result = StoryConfig::from_lookup(lookup_from(&[(name, value)]));
        assert!(
            matches!(result, Err(StoryError::InvalidConfig(_))),
            "expected {name}={value:?} to be rejected"
        );
    }

    #[test]
    fn reads_every_variable() {
        let config = match StoryConfig::from_lookup(lookup_from(&[
            (UNIQUE_SESSION_VAR, "on"),
            (OUTPUT_DIR_VAR, "reports/stories"),
            (REPORT_FORMAT_VAR, "JSON"),
        ])) {
            Ok(config) => config,
            Err(error) => panic!("configuration should load: {error}"),
        };
        assert!(config.unique_session);
        assert_eq!(config.output_dir, "reports/stories");
        assert_eq!(config.report_format, ReportFormat::Json);
    }

    #[test]
    fn builders_override_fields() {
        let config = StoryConfig::default()
            .with_unique_session(true)
            .with_output_dir("out")
            .with_report_format(ReportFormat::Junit);
        assert!(config.unique_session);
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.report_format, ReportFormat::Junit);
    }
}

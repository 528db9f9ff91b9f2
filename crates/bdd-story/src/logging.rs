//! Structured logging on stderr.
//!
//! Stdout carries the run summary, so every log line goes to stderr.

use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

fn filter_from_config(config: &CliConfig) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Initialise the global subscriber.
///
/// Log level precedence, highest first: `--log-level`, then
/// `BDD_STORY_LOG_LEVEL`, then `warn`. A subscriber that is already set is
/// kept.
pub(crate) fn init_logging(config: &CliConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_from_config(config))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn init_logging_is_idempotent() {
        let config = CliConfig::default();
        init_logging(&config);
        init_logging(&config);
    }

    #[test]
    fn filter_uses_config_log_level() {
        let config = CliConfig {
            log_level: LogLevel::Debug,
            ..CliConfig::default()
        };
        assert_eq!(filter_from_config(&config).to_string(), "debug");
    }
}

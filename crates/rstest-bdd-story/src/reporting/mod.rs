//! Report generation from collected test outcomes.
//!
//! A [`ReportGenerator`] receives every outcome gathered across workers each
//! time the translator finishes a scenario or an outline. [`ReportService`]
//! is the file-writing generator driven by [`StoryConfig`].

use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::StoryConfig;
use crate::outcome::TestOutcome;

/// JSON report writer.
pub mod json;
/// `JUnit` XML report writer.
pub mod junit;

/// File name of the JSON report inside the output directory.
pub const JSON_REPORT_FILE: &str = "story-report.json";
/// File name of the `JUnit` report inside the output directory.
pub const JUNIT_REPORT_FILE: &str = "story-junit.xml";

/// Errors raised while writing reports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// Creating or writing a report file failed.
    #[error("report I/O failed: {0}")]
    Io(#[from] io::Error),
    /// Serialising the JSON report failed.
    #[error("JSON report serialisation failed: {0}")]
    Json(#[from] serde_json::Error),
    /// Rendering the `JUnit` report failed.
    #[error("JUnit report rendering failed")]
    Format(#[from] fmt::Error),
}

/// Consumes the aggregated outcomes of a run.
pub trait ReportGenerator: Send + Sync {
    /// Produce reports for `outcomes`.
    ///
    /// # Errors
    ///
    /// Implementations return [`ReportError`] when a report cannot be
    /// written.
    fn generate(&self, outcomes: &[TestOutcome]) -> Result<(), ReportError>;
}

impl<T: ReportGenerator + ?Sized> ReportGenerator for Arc<T> {
    fn generate(&self, outcomes: &[TestOutcome]) -> Result<(), ReportError> {
        self.as_ref().generate(outcomes)
    }
}

/// Report formats written by [`ReportService`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// `story-report.json` only.
    Json,
    /// `story-junit.xml` only.
    Junit,
    /// Both reports.
    #[default]
    All,
}

impl ReportFormat {
    /// Whether the JSON report is written.
    #[must_use]
    pub const fn writes_json(self) -> bool {
        matches!(self, Self::Json | Self::All)
    }

    /// Whether the `JUnit` report is written.
    #[must_use]
    pub const fn writes_junit(self) -> bool {
        matches!(self, Self::Junit | Self::All)
    }
}

/// Error returned when a report format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report format '{0}', expected one of: json, junit, all")]
pub struct ReportFormatParseError(pub String);

impl FromStr for ReportFormat {
    type Err = ReportFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "junit" | "xml" => Ok(Self::Junit),
            "all" => Ok(Self::All),
            _ => Err(ReportFormatParseError(value.to_string())),
        }
    }
}

/// Writes report files into an output directory.
#[derive(Clone, Debug)]
pub struct ReportService {
    output_dir: Utf8PathBuf,
    format: ReportFormat,
}

impl ReportService {
    /// Create a service writing `format` reports into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<Utf8PathBuf>, format: ReportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    /// Create a service from the output settings of `config`.
    #[must_use]
    pub fn from_config(config: &StoryConfig) -> Self {
        Self::new(config.output_dir.clone(), config.report_format)
    }

    /// Directory receiving the reports.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Formats written on each generation.
    #[must_use]
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Path of the JSON report.
    #[must_use]
    pub fn json_path(&self) -> Utf8PathBuf {
        self.output_dir.join(JSON_REPORT_FILE)
    }

    /// Path of the `JUnit` report.
    #[must_use]
    pub fn junit_path(&self) -> Utf8PathBuf {
        self.output_dir.join(JUNIT_REPORT_FILE)
    }
}

impl ReportGenerator for ReportService {
    fn generate(&self, outcomes: &[TestOutcome]) -> Result<(), ReportError> {
        fs::create_dir_all(&self.output_dir)?;
        if self.format.writes_json() {
            let path = self.json_path();
            let mut writer = BufWriter::new(fs::File::create(&path)?);
            json::write(&mut writer, outcomes)?;
            writer.flush()?;
            debug!(%path, outcomes = outcomes.len(), "wrote JSON story report");
        }
        if self.format.writes_junit() {
            let path = self.junit_path();
            let mut document = String::new();
            junit::write(&mut document, outcomes)?;
            fs::write(&path, document)?;
            debug!(%path, outcomes = outcomes.len(), "wrote JUnit story report");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;

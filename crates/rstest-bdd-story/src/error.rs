//! Error types raised by the story translator and its collaborators.
//!
//! Callback errors describe protocol violations by the runner. They are
//! returned without touching translator state, so a caller may log them and
//! keep delivering callbacks.

use thiserror::Error;

use crate::reporting::ReportError;

/// Errors raised while translating runner callbacks into story events.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoryError {
    /// A match or result arrived while no declared step was pending.
    #[error("{callback} received with no pending step")]
    NoPendingStep {
        /// Callback that found the queue empty.
        callback: &'static str,
    },

    /// An examples block carried no header row.
    #[error("examples block '{block}' has no header row")]
    MissingExampleHeader {
        /// Title of the offending block; empty when unnamed.
        block: String,
    },

    /// An examples row has a different number of cells than its header.
    #[error("examples row {row_number} has {actual} cells, expected {expected}")]
    UnevenExampleRow {
        /// 1-based row number, header row included.
        row_number: usize,
        /// Number of header cells.
        expected: usize,
        /// Number of cells found in the row.
        actual: usize,
    },

    /// The runner started more examples than the outline declared.
    #[error("example row {index} requested but only {available} rows are buffered")]
    ExampleRowOutOfRange {
        /// Index of the requested row.
        index: usize,
        /// Number of buffered rows.
        available: usize,
    },

    /// A configuration value could not be interpreted.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report generation failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A transcript line could not be decoded.
    #[error("transcript line {line} is not a runner event: {source}")]
    Transcript {
        /// 1-based line number within the transcript.
        line: usize,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// A feature file could not be parsed.
    #[error("feature parse failed: {0}")]
    FeatureParse(#[from] gherkin::ParseError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Failure causes reported alongside failed step results.
//!
//! A runner reports a failing step together with the error it raised. Errors
//! may wrap another error one level deep; the translator reports the wrapped
//! error when present. Assumption violations are deliberate skips rather than
//! defects and surface as a distinct event.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a step failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// An assertion did not hold.
    #[default]
    Assertion,
    /// A precondition was not met and the step asked to be skipped.
    AssumptionViolated,
    /// Any other error raised while running the step.
    Error,
}

impl FailureKind {
    /// Label used when rendering the failure.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assertion => "assertion failed",
            Self::AssumptionViolated => "assumption violated",
            Self::Error => "error",
        }
    }
}

/// Error raised by a failing step, optionally wrapping its cause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCause {
    #[serde(default)]
    kind: FailureKind,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<Box<FailureCause>>,
}

impl FailureCause {
    /// Create a failure of the given kind.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Create an assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Assertion, message)
    }

    /// Create an assumption violation.
    #[must_use]
    pub fn assumption(message: impl Into<String>) -> Self {
        Self::new(FailureKind::AssumptionViolated, message)
    }

    /// Create a general error.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Error, message)
    }

    /// Record the error that caused this one.
    #[must_use]
    pub fn caused_by(mut self, cause: Self) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Category of this failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Message carried by this failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        self.cause.as_deref()
    }

    /// Unwrap exactly one level of nesting.
    ///
    /// Returns the wrapped cause when present and `self` otherwise. Deeper
    /// nesting is left intact.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::failure::FailureCause;
    ///
    /// let wrapped = FailureCause::error("step panicked")
    ///     .caused_by(FailureCause::assertion("expected 3, got 2"));
    /// assert_eq!(wrapped.root_cause().message(), "expected 3, got 2");
    ///
    /// let plain = FailureCause::assertion("boom");
    /// assert_eq!(plain.root_cause().message(), "boom");
    /// ```
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        self.cause().unwrap_or(self)
    }

    /// Whether this failure is an assumption violation.
    #[must_use]
    pub fn is_assumption_violation(&self) -> bool {
        self.kind == FailureKind::AssumptionViolated
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl StdError for FailureCause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

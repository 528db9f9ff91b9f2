//! Runner-side nodes handed to the translator callbacks.
//!
//! These types mirror what a Gherkin runner knows at each callback: the
//! feature header, scenario headers, raw examples tables, declared steps,
//! step matches and step results. They derive `serde` traits so runner
//! transcripts can be stored and replayed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::failure::FailureCause;

/// A tag literal as written in a feature file, marker included (`@smoke`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Wrap a tag literal.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::model::Tag;
    ///
    /// let tag = Tag::new("@smoke");
    /// assert_eq!(tag.name(), "@smoke");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the tag literal.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a feature identifier from its name the way Gherkin runners do:
/// lowercase, with whitespace runs collapsed into single dashes.
///
/// # Examples
/// ```
/// use rstest_bdd_story::model::derive_id;
///
/// assert_eq!(derive_id("Checkout  Basket"), "checkout-basket");
/// ```
#[must_use]
pub fn derive_id(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Feature header delivered when the runner enters a feature file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureNode {
    /// Runner-assigned identifier.
    pub id: String,
    /// Feature title.
    pub name: String,
    /// Free-form description following the title; empty when absent.
    #[serde(default)]
    pub description: String,
    /// Tags applied to the feature.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl FeatureNode {
    /// Create a feature header whose identifier is derived from `name`.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::model::FeatureNode;
    ///
    /// let feature = FeatureNode::new("Shopping basket").with_tags(["@driver:firefox"]);
    /// assert_eq!(feature.id, "shopping-basket");
    /// assert_eq!(feature.tags.len(), 1);
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: derive_id(&name),
            name,
            description: String::new(),
            tags: Vec::new(),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append tags.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Scenario, outline or background header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioNode {
    /// Scenario title.
    pub name: String,
    /// Free-form description following the title; empty when absent.
    #[serde(default)]
    pub description: String,
    /// Tags applied directly to the scenario.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ScenarioNode {
    /// Create a scenario header.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append tags.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// An examples block of a scenario outline.
///
/// `rows` holds the raw table: row 0 is the header row and the remaining rows
/// carry data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplesNode {
    /// Block title; empty when the block is unnamed.
    #[serde(default)]
    pub name: String,
    /// Block description; empty when absent.
    #[serde(default)]
    pub description: String,
    /// Raw table rows, header first.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl ExamplesNode {
    /// Create an examples block with a title and no rows.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a table row. The first row appended is the header.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::model::ExamplesNode;
    ///
    /// let block = ExamplesNode::new("prices")
    ///     .with_row(["item", "price"])
    ///     .with_row(["apple", "3"]);
    /// assert_eq!(block.rows.len(), 2);
    /// ```
    #[must_use]
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }
}

/// A step declared by the runner before it is matched and executed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepNode {
    /// Keyword as the runner reports it, trailing space included (`"Given "`).
    pub keyword: String,
    /// Step text following the keyword.
    pub name: String,
}

impl StepNode {
    /// Create a step descriptor.
    #[must_use]
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
        }
    }

    /// Display title: the keyword immediately followed by the text.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::model::StepNode;
    ///
    /// assert_eq!(StepNode::new("Given ", "a basket").title(), "Given a basket");
    /// ```
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}{}", self.keyword, self.name)
    }
}

/// Origin of a match reported by the runner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    /// The step text was bound to a step definition.
    #[default]
    StepDefinition,
    /// A before or after hook.
    Hook,
    /// Any other runner-internal match.
    Other,
}

/// A match reported by the runner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMatch {
    /// Where the match came from.
    #[serde(default)]
    pub kind: MatchKind,
    /// Source location of the bound implementation, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl StepMatch {
    /// A match against a step definition.
    #[must_use]
    pub fn step_definition() -> Self {
        Self::default()
    }

    /// A hook match.
    #[must_use]
    pub fn hook() -> Self {
        Self {
            kind: MatchKind::Hook,
            location: None,
        }
    }

    /// Record the source location of the bound implementation.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Status of an executed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// The step ran to completion.
    Passed,
    /// The step raised a failure.
    Failed,
    /// The step was not run because an earlier step did not pass.
    Skipped,
    /// No step definition matched the step text.
    Undefined,
    /// Any status outside the four the translator understands.
    #[serde(other)]
    Unknown,
}

impl ResultStatus {
    /// Lowercase label used by runners for this status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Undefined => "undefined",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for ResultStatus {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            "undefined" => Self::Undefined,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result reported by the runner after executing a step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Outcome of the step.
    pub status: ResultStatus,
    /// Failure raised by the step, present for failed results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureCause>,
}

impl StepResult {
    /// A passing result.
    #[must_use]
    pub fn passed() -> Self {
        Self::with_status(ResultStatus::Passed)
    }

    /// A failing result carrying `error`.
    #[must_use]
    pub fn failed(error: FailureCause) -> Self {
        Self {
            status: ResultStatus::Failed,
            error: Some(error),
        }
    }

    /// A skipped result.
    #[must_use]
    pub fn skipped() -> Self {
        Self::with_status(ResultStatus::Skipped)
    }

    /// An undefined result.
    #[must_use]
    pub fn undefined() -> Self {
        Self::with_status(ResultStatus::Undefined)
    }

    /// A result with the given status and no error.
    #[must_use]
    pub fn with_status(status: ResultStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("passed", ResultStatus::Passed)]
    #[case("FAILED", ResultStatus::Failed)]
    #[case(" skipped ", ResultStatus::Skipped)]
    #[case("undefined", ResultStatus::Undefined)]
    #[case("pending", ResultStatus::Unknown)]
    fn parses_result_status(#[case] raw: &str, #[case] expected: ResultStatus) {
        assert_eq!(raw.parse::<ResultStatus>(), Ok(expected));
    }

    #[test]
    fn unknown_status_deserializes_to_unknown() {
        let result: StepResult = match serde_json::from_str(r#"{"status":"ambiguous"}"#) {
            Ok(result) => result,
            Err(error) => panic!("status should deserialize: {error}"),
        };
        assert_eq!(result.status, ResultStatus::Unknown);
        assert!(result.error.is_none());
    }

    #[test]
    fn derived_id_collapses_whitespace() {
        assert_eq!(derive_id("  Login   Page "), "login-page");
        assert_eq!(derive_id(""), "");
    }
}

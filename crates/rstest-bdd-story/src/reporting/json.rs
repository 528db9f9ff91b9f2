//! JSON writer for test outcomes.
//!
//! The schema keeps result labels in lowercase and renders tags as their
//! textual value, so downstream tools can rely on consistent casing.

use std::io::Write;

use serde::Serialize;

use crate::examples::ExampleTable;
use crate::outcome::{StepOutcome, TestOutcome};
use crate::story::Story;

#[derive(Serialize)]
struct JsonReport<'a> {
    tests: usize,
    outcomes: Vec<JsonOutcome<'a>>,
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
    title: &'a str,
    result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    story: Option<&'a Story>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    tags: Vec<String>,
    driver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    examples: Option<&'a ExampleTable>,
    steps: Vec<JsonStep<'a>>,
}

#[derive(Serialize)]
struct JsonStep<'a> {
    title: &'a str,
    result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonStep<'a>>,
}

impl<'a> From<&'a StepOutcome> for JsonStep<'a> {
    fn from(step: &'a StepOutcome) -> Self {
        Self {
            title: step.title(),
            result: step.result().label(),
            failure: step.failure(),
            children: step.children().iter().map(Self::from).collect(),
        }
    }
}

impl<'a> From<&'a TestOutcome> for JsonOutcome<'a> {
    fn from(outcome: &'a TestOutcome) -> Self {
        Self {
            title: outcome.title(),
            result: outcome.result().label(),
            story: outcome.story(),
            description: outcome.description(),
            tags: outcome.tags().iter().map(ToString::to_string).collect(),
            driver: outcome.driver().to_string(),
            examples: outcome.examples(),
            steps: outcome.steps().iter().map(JsonStep::from).collect(),
        }
    }
}

impl<'a> From<&'a [TestOutcome]> for JsonReport<'a> {
    fn from(outcomes: &'a [TestOutcome]) -> Self {
        Self {
            tests: outcomes.len(),
            outcomes: outcomes.iter().map(JsonOutcome::from).collect(),
        }
    }
}

/// Serialise `outcomes` into `writer`.
///
/// # Examples
/// ```
/// use rstest_bdd_story::outcome::TestOutcome;
/// use rstest_bdd_story::reporting::json;
/// use rstest_bdd_story::story::DriverSelection;
///
/// let outcomes = vec![TestOutcome::new("checkout", None, DriverSelection::Default)];
/// let mut buffer = Vec::new();
/// json::write(&mut buffer, &outcomes).unwrap();
/// let output = String::from_utf8(buffer).unwrap();
/// assert!(output.contains("\"result\":\"pending\""));
/// ```
///
/// # Errors
/// Returns an error when serialisation or the underlying writer fails.
pub fn write<W: Write>(writer: &mut W, outcomes: &[TestOutcome]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &JsonReport::from(outcomes))
}

/// Render `outcomes` as a JSON string.
///
/// # Errors
/// Returns an error when serialisation fails.
pub fn to_string(outcomes: &[TestOutcome]) -> serde_json::Result<String> {
    serde_json::to_string(&JsonReport::from(outcomes))
}

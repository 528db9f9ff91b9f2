//! `JUnit` XML writer for test outcomes.
//!
//! Each story becomes the `classname` of its tests. Failed tests carry a
//! `<failure>` child with the first failure message found in their steps;
//! ignored, skipped and pending tests carry a `<skipped>` child.

use std::fmt::{self, Write};

use crate::outcome::{StepOutcome, TestOutcome, TestResult};

const UNKNOWN_STORY: &str = "unknown";

/// Render `outcomes` as a `JUnit` XML document.
///
/// # Examples
/// ```
/// use rstest_bdd_story::outcome::TestOutcome;
/// use rstest_bdd_story::reporting::junit;
/// use rstest_bdd_story::story::DriverSelection;
///
/// let outcomes = vec![TestOutcome::new("checkout", None, DriverSelection::Default)];
/// let mut output = String::new();
/// junit::write(&mut output, &outcomes).unwrap();
/// assert!(output.contains("<testsuite name=\"rstest-bdd-story\" tests=\"1\""));
/// ```
///
/// # Errors
/// Returns an error if writing to the provided formatter fails.
pub fn write<W: Write>(writer: &mut W, outcomes: &[TestOutcome]) -> fmt::Result {
    let tests = outcomes.len();
    let failures = outcomes
        .iter()
        .filter(|outcome| outcome.result() == TestResult::Failure)
        .count();
    let skipped = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome.result(),
                TestResult::Ignored | TestResult::Skipped | TestResult::Pending
            )
        })
        .count();
    writer.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    writeln!(
        writer,
        "<testsuite name=\"rstest-bdd-story\" tests=\"{tests}\" failures=\"{failures}\" skipped=\"{skipped}\">",
    )?;
    for outcome in outcomes {
        write_testcase(writer, outcome)?;
    }
    writer.write_str("</testsuite>\n")
}

fn write_testcase<W: Write>(writer: &mut W, outcome: &TestOutcome) -> fmt::Result {
    writer.write_str("  <testcase name=\"")?;
    write_escaped(writer, outcome.title())?;
    writer.write_str("\" classname=\"")?;
    let story = outcome.story().map_or(UNKNOWN_STORY, |story| story.name());
    write_escaped(writer, story)?;
    writer.write_char('"')?;
    match outcome.result() {
        TestResult::Success => writer.write_str(" />\n"),
        TestResult::Failure => {
            writer.write_str(">\n    <failure")?;
            if let Some(message) = first_failure(outcome.steps()) {
                writer.write_str(" message=\"")?;
                write_escaped(writer, message)?;
                writer.write_char('"')?;
            }
            writer.write_str(" />\n  </testcase>\n")
        }
        result @ (TestResult::Ignored | TestResult::Skipped | TestResult::Pending) => {
            writer.write_str(">\n    <skipped message=\"")?;
            writer.write_str(result.label())?;
            writer.write_str("\" />\n  </testcase>\n")
        }
    }
}

fn first_failure(steps: &[StepOutcome]) -> Option<&str> {
    steps.iter().find_map(|step| {
        if step.result() != TestResult::Failure {
            return None;
        }
        first_failure(step.children()).or_else(|| step.failure())
    })
}

fn write_escaped<W: Write>(writer: &mut W, value: &str) -> fmt::Result {
    for character in value.chars() {
        match character {
            '&' => writer.write_str("&amp;")?,
            '<' => writer.write_str("&lt;")?,
            '>' => writer.write_str("&gt;")?,
            '"' => writer.write_str("&quot;")?,
            '\'' => writer.write_str("&apos;")?,
            other if is_xml_character(other) => writer.write_char(other)?,
            _ => writer.write_str("&#xFFFD;")?,
        }
    }
    Ok(())
}

fn is_xml_character(character: char) -> bool {
    matches!(
        u32::from(character),
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF
    )
}

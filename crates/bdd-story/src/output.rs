//! Rendering of run summaries on stdout.

use std::io::Write;

use eyre::{Context, Result};
use rstest_bdd_story::outcome::{TestOutcome, TestResult};
use rstest_bdd_story::reporting::ReportService;

fn qualified_title(outcome: &TestOutcome) -> String {
    outcome.story().map_or_else(
        || outcome.title().to_string(),
        |story| format!("{} / {}", story.name(), outcome.title()),
    )
}

/// Write one line per outcome followed by the totals.
pub(crate) fn write_outcomes(writer: &mut dyn Write, outcomes: &[TestOutcome]) -> Result<()> {
    for outcome in outcomes {
        writeln!(
            writer,
            "{:<8} {}",
            outcome.result().label(),
            qualified_title(outcome)
        )
        .wrap_err_with(|| format!("failed to write outcome '{}'", outcome.title()))?;
    }
    let failed = outcomes
        .iter()
        .filter(|outcome| outcome.result() == TestResult::Failure)
        .count();
    let passed = outcomes
        .iter()
        .filter(|outcome| outcome.result() == TestResult::Success)
        .count();
    writeln!(
        writer,
        "{} tests: {passed} passed, {failed} failed, {} other",
        outcomes.len(),
        outcomes.len() - passed - failed
    )
    .wrap_err("failed to write outcome totals")
}

/// Write the location of every report the service produces.
pub(crate) fn write_report_paths(writer: &mut dyn Write, service: &ReportService) -> Result<()> {
    if service.format().writes_json() {
        writeln!(writer, "json report: {}", service.json_path())
            .wrap_err("failed to write report path")?;
    }
    if service.format().writes_junit() {
        writeln!(writer, "junit report: {}", service.junit_path())
            .wrap_err("failed to write report path")?;
    }
    Ok(())
}

//! Unit tests for the reporting module.

use super::*;
use crate::outcome::{StepOutcome, TestResult};
use crate::story::{DriverSelection, Story, TestTag};

fn finished(title: &str, result: TestResult, failure: Option<&str>) -> StepOutcome {
    let mut step = StepOutcome::started(title);
    step.finish(result, failure.map(str::to_string));
    step
}

fn passing() -> TestOutcome {
    let mut outcome = TestOutcome::new(
        "adding items",
        Some(Story::new("basket", "Basket & Co")),
        DriverSelection::Named("firefox".into()),
    );
    outcome.add_tags(&[TestTag::with_value("smoke")]);
    outcome.push_step(finished("Given an empty basket", TestResult::Success, None));
    outcome
}

fn failing() -> TestOutcome {
    let mut outcome = TestOutcome::new("removing <items>", None, DriverSelection::Default);
    let mut group = StepOutcome::started("{n: 1}");
    group.push_child(finished(
        "Then nothing remains",
        TestResult::Failure,
        Some("assertion failed: 1 != 0"),
    ));
    group.finish(TestResult::Success, None);
    outcome.push_step(group);
    outcome
}

#[test]
fn json_report_lists_outcomes_with_lowercase_results() {
    let json = match json::to_string(&[passing(), failing()]) {
        Ok(json) => json,
        Err(error) => panic!("report should serialise: {error}"),
    };
    let value: serde_json::Value = match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(error) => panic!("report should be valid JSON: {error}"),
    };
    assert_eq!(value["tests"], 2);
    assert_eq!(value["outcomes"][0]["result"], "success");
    assert_eq!(value["outcomes"][0]["driver"], "firefox");
    assert_eq!(value["outcomes"][0]["tags"][0], "smoke");
    assert_eq!(value["outcomes"][1]["result"], "failure");
    assert_eq!(
        value["outcomes"][1]["steps"][0]["children"][0]["failure"],
        "assertion failed: 1 != 0"
    );
}

#[test]
fn junit_report_escapes_and_counts() {
    let mut document = String::new();
    if let Err(error) = junit::write(&mut document, &[passing(), failing()]) {
        panic!("report should render: {error}");
    }
    assert!(document.contains("tests=\"2\" failures=\"1\" skipped=\"0\""));
    assert!(document.contains("classname=\"Basket &amp; Co\""));
    assert!(document.contains("name=\"removing &lt;items&gt;\" classname=\"unknown\""));
    assert!(document.contains("<failure message=\"assertion failed: 1 != 0\" />"));
}

#[test]
fn junit_marks_pending_tests_as_skipped() {
    let pending = TestOutcome::new("later", None, DriverSelection::Default);
    let mut document = String::new();
    if let Err(error) = junit::write(&mut document, &[pending]) {
        panic!("report should render: {error}");
    }
    assert!(document.contains("<skipped message=\"pending\" />"));
}

#[test]
fn junit_replaces_invalid_xml_characters() {
    let outcome = TestOutcome::new("bell\u{7}", None, DriverSelection::Default);
    let mut document = String::new();
    if let Err(error) = junit::write(&mut document, &[outcome]) {
        panic!("report should render: {error}");
    }
    assert!(document.contains("name=\"bell&#xFFFD;\""));
}

#[test]
fn report_format_parses_known_names() {
    assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
    assert_eq!("JUnit".parse::<ReportFormat>(), Ok(ReportFormat::Junit));
    assert_eq!(" all ".parse::<ReportFormat>(), Ok(ReportFormat::All));
    assert!("html".parse::<ReportFormat>().is_err());
}

#[test]
fn service_writes_selected_reports() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("temporary directory should be created: {error}"),
    };
    let Some(root) = camino::Utf8Path::from_path(dir.path()) else {
        panic!("temporary directory should be UTF-8");
    };
    let service = ReportService::new(root.join("nested"), ReportFormat::Json);
    if let Err(error) = service.generate(&[passing()]) {
        panic!("reports should be written: {error}");
    }
    assert!(service.json_path().exists());
    assert!(!service.junit_path().exists());
}

#[test]
fn service_follows_configuration() {
    let config = StoryConfig::default()
        .with_output_dir("custom/out")
        .with_report_format(ReportFormat::Junit);
    let service = ReportService::from_config(&config);
    assert_eq!(service.output_dir(), "custom/out");
    assert_eq!(service.junit_path(), "custom/out/story-junit.xml");
}

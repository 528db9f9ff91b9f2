//! Replaying recorded transcripts through the translator.

use std::fs::File;
use std::io::BufReader;

use rstest::rstest;
use rstest_bdd_story::event::StoryEvent;
use rstest_bdd_story::outcome::TestResult;
use rstest_bdd_story::protocol::RunnerEvent;
use rstest_bdd_story::test_support::{CLOSE, Harness};
use rstest_bdd_story::transcript::{ReplaySummary, read_events, replay};

const CHECKOUT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/checkout.jsonl");

fn open_fixture() -> BufReader<File> {
    BufReader::new(File::open(CHECKOUT).expect("fixture exists"))
}

#[rstest]
fn recorded_run_replays_without_rejections() {
    let mut harness = Harness::new();
    let summary = replay(open_fixture(), &mut harness.translator).expect("transcript replays");
    assert_eq!(
        summary,
        ReplaySummary {
            events: 28,
            rejected: 0
        }
    );
    assert_eq!(harness.reports.calls(), 2);
    assert_eq!(harness.log.count("suite-finished"), 1);
    assert_eq!(harness.timeline().last(), Some(&CLOSE));
}

#[rstest]
fn replayed_outcomes_match_the_recorded_results() {
    let mut harness = Harness::new();
    replay(open_fixture(), &mut harness.translator).expect("transcript replays");

    let outcomes = harness.outcomes();
    let [checkout, outline] = outcomes.as_slice() else {
        panic!("two outcomes expected, got {outcomes:?}");
    };
    assert_eq!(checkout.result(), TestResult::Failure);
    assert_eq!(checkout.description(), None);
    assert_eq!(
        checkout.story().and_then(|story| story.narrative()),
        Some("As a shopper I want to pay")
    );
    let titles: Vec<_> = checkout.steps().iter().map(|step| step.title()).collect();
    assert_eq!(
        titles,
        [
            "Given a full basket",
            "When I pay {amount} euros",
            "Then the payment is accepted"
        ]
    );
    assert_eq!(
        checkout.steps().last().and_then(|step| step.failure()),
        Some("assertion failed: card declined")
    );

    assert_eq!(outline.title(), "Ordering apple");
    assert_eq!(outline.result(), TestResult::Pending);
    assert_eq!(outline.examples().map(|table| table.len()), Some(2));
}

#[test]
fn failures_report_the_wrapped_cause() {
    let mut harness = Harness::new();
    replay(open_fixture(), &mut harness.translator).expect("transcript replays");
    let failure = harness.events().into_iter().find_map(|event| match event {
        StoryEvent::StepFailed(failure) => Some(failure),
        _ => None,
    });
    let Some(failure) = failure else {
        panic!("the last checkout step should fail");
    };
    assert_eq!(failure.title, "Then the payment is accepted");
    assert_eq!(failure.cause.message(), "card declined");
}

#[test]
fn fixture_decodes_every_line() {
    let events = read_events(open_fixture()).expect("transcript decodes");
    assert_eq!(events.len(), 28);
    assert!(matches!(events.first(), Some(RunnerEvent::Uri { .. })));
    assert_eq!(events.last(), Some(&RunnerEvent::Close));
}

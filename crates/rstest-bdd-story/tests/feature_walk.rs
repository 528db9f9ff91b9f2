//! Walking parsed feature files through the translator.

use camino::Utf8Path;
use rstest::{fixture, rstest};
use rstest_bdd_story::event::StoryEvent;
use rstest_bdd_story::model::{ResultStatus, StepNode, StepResult};
use rstest_bdd_story::outcome::{TestOutcome, TestResult};
use rstest_bdd_story::story::DriverSelection;
use rstest_bdd_story::test_support::Harness;
use rstest_bdd_story::walk::{
    FeatureWalker, finish_run, parse_feature, parse_feature_text, passing_steps, undefined_steps,
};

const STOCK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/stock.feature");

#[fixture]
fn feature() -> gherkin::Feature {
    parse_feature(Utf8Path::new(STOCK)).expect("fixture parses")
}

fn walk_with(
    feature: &gherkin::Feature,
    oracle: impl FnMut(&StepNode) -> StepResult,
) -> (Harness, Vec<TestOutcome>) {
    let mut harness = Harness::new();
    FeatureWalker::new(oracle)
        .walk(STOCK, feature, &mut harness.translator)
        .expect("walk succeeds");
    finish_run(&mut harness.translator).expect("run finishes");
    let outcomes = harness.outcomes();
    (harness, outcomes)
}

#[rstest]
fn passing_walk_records_one_outcome_per_test(feature: gherkin::Feature) {
    let (harness, outcomes) = walk_with(&feature, passing_steps);
    let titles: Vec<_> = outcomes.iter().map(TestOutcome::title).collect();
    assert_eq!(
        titles,
        ["Receiving a delivery", "Selling apple", "Refusing a sale"]
    );
    assert!(
        outcomes
            .iter()
            .all(|outcome| outcome.result() == TestResult::Success)
    );
    assert!(
        outcomes
            .iter()
            .all(|outcome| outcome.driver() == &DriverSelection::Named("chrome".into()))
    );
    assert_eq!(harness.log.count("example-started"), 3);
    assert_eq!(harness.log.count("use-examples"), 2);
    assert_eq!(harness.log.count("suite-finished"), 1);
}

#[rstest]
fn background_steps_precede_scenario_steps(feature: gherkin::Feature) {
    let (_, outcomes) = walk_with(&feature, passing_steps);
    let Some(refusal) = outcomes.last() else {
        panic!("rule scenario should be recorded");
    };
    let titles: Vec<_> = refusal.steps().iter().map(|step| step.title()).collect();
    assert_eq!(
        titles,
        [
            "Given an open shop",
            "Given the shop is closed",
            "Then no sale is possible"
        ]
    );
}

#[rstest]
fn outline_table_keeps_both_blocks(feature: gherkin::Feature) {
    let (_, outcomes) = walk_with(&feature, passing_steps);
    let Some(table) = outcomes.get(1).and_then(TestOutcome::examples) else {
        panic!("the outline should carry its examples");
    };
    assert_eq!(table.len(), 3);
    let datasets: Vec<_> = table
        .datasets()
        .iter()
        .map(|set| (set.title(), set.description(), set.row_count()))
        .collect();
    assert_eq!(
        datasets,
        [
            (Some("small orders"), None, 2),
            (
                Some("bulk orders"),
                Some("Orders placed by wholesalers."),
                1
            ),
        ]
    );
}

#[rstest]
fn dry_run_marks_every_step_pending(feature: gherkin::Feature) {
    let (harness, outcomes) = walk_with(&feature, undefined_steps);
    assert!(
        outcomes
            .iter()
            .all(|outcome| outcome.result() == TestResult::Pending)
    );
    assert!(
        !harness
            .events()
            .iter()
            .any(|event| matches!(event, StoryEvent::StepTitleUpdated { .. }))
    );
}

#[rstest]
fn failing_step_skips_the_rest_of_its_scenario(feature: gherkin::Feature) {
    let (_, outcomes) = walk_with(&feature, |step: &StepNode| {
        if step.name.starts_with("a delivery") {
            StepResult::with_status(ResultStatus::Failed)
        } else {
            StepResult::passed()
        }
    });
    let Some(delivery) = outcomes.first() else {
        panic!("the delivery scenario should be recorded");
    };
    let results: Vec<_> = delivery.steps().iter().map(|step| step.result()).collect();
    assert_eq!(
        results,
        [TestResult::Success, TestResult::Failure, TestResult::Ignored]
    );
}

const HEADER_ONLY_OUTLINE: &str = "\
Feature: Restocking

  Scenario Outline: Ordering <item>
    Given an order for <item>

    Examples: none yet
      | item |

  Scenario: Plain
    Given an empty shelf
";

#[test]
fn header_only_examples_are_followed_by_a_plain_test() {
    let feature = parse_feature_text(HEADER_ONLY_OUTLINE).expect("feature parses");
    let mut harness = Harness::new();
    FeatureWalker::new(passing_steps)
        .walk("restocking.feature", &feature, &mut harness.translator)
        .expect("walk succeeds");
    finish_run(&mut harness.translator).expect("run finishes");

    assert!(!harness.translator.examples_running());
    assert_eq!(harness.log.count("example-started"), 0);
    let outcomes = harness.outcomes();
    let titles: Vec<_> = outcomes.iter().map(TestOutcome::title).collect();
    assert_eq!(titles, ["Plain"]);
    assert_eq!(outcomes.first().map(TestOutcome::result), Some(TestResult::Success));
}

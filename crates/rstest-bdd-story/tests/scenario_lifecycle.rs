//! Behavioural tests for complete scenario and outline runs.

use rstest::{fixture, rstest};
use rstest_bdd_story::event::StoryEvent;
use rstest_bdd_story::examples::ExampleRow;
use rstest_bdd_story::failure::FailureCause;
use rstest_bdd_story::model::{
    ExamplesNode, FeatureNode, ScenarioNode, StepMatch, StepNode, StepResult,
};
use rstest_bdd_story::outcome::TestResult;
use rstest_bdd_story::story::DriverSelection;
use rstest_bdd_story::test_support::{CLOSE, GENERATE_REPORTS, Harness};
use rstest_bdd_story::{ResultVisitor, StructureVisitor};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn run_scenario(harness: &mut Harness, scenario: &ScenarioNode, steps: &[(StepNode, StepResult)]) {
    let translator = &mut harness.translator;
    translator
        .scenario_entered(scenario)
        .expect("scenario starts");
    for (step, _) in steps {
        translator.step_declared(step).expect("step declared");
    }
    for (_, result) in steps {
        translator
            .match_found(&StepMatch::step_definition())
            .expect("step matched");
        translator.result_reported(result).expect("result accepted");
    }
    translator.scenario_exited(scenario).expect("scenario ends");
}

fn stock_steps(item: &str, qty: &str) -> Vec<(StepNode, StepResult)> {
    vec![
        (
            StepNode::new("Given ", format!("{qty} {item} in stock")),
            StepResult::passed(),
        ),
        (
            StepNode::new("Then ", format!("I can order {item}")),
            StepResult::passed(),
        ),
    ]
}

#[rstest]
fn failing_scenario_under_a_driver_tag(mut harness: Harness) {
    let feature = FeatureNode::new("Checkout").with_tags(["@driver:firefox"]);
    let scenario = ScenarioNode::new("Paying by card");
    harness
        .translator
        .feature_entered(&feature)
        .expect("feature starts");
    run_scenario(
        &mut harness,
        &scenario,
        &[
            (StepNode::new("Given ", "a full basket"), StepResult::passed()),
            (StepNode::new("When ", "I pay by card"), StepResult::passed()),
            (
                StepNode::new("Then ", "the payment is accepted"),
                StepResult::failed(FailureCause::assertion("card declined")),
            ),
        ],
    );
    harness.translator.suite_ended().expect("suite ends");

    assert_eq!(
        harness.timeline(),
        [
            "configure-session",
            "set-driver",
            "suite-started",
            "test-started",
            "add-description",
            "add-tags",
            "add-tags",
            "step-started",
            "update-step-title",
            "step-finished",
            "step-started",
            "update-step-title",
            "step-finished",
            "step-started",
            "update-step-title",
            "update-step-title",
            "step-failed",
            "test-finished",
            GENERATE_REPORTS,
            "suite-finished",
            CLOSE,
        ]
    );
    assert_eq!(harness.reports.calls(), 1);

    let outcomes = harness.outcomes();
    let [outcome] = outcomes.as_slice() else {
        panic!("one outcome expected, got {outcomes:?}");
    };
    assert_eq!(outcome.title(), "Paying by card");
    assert_eq!(outcome.driver(), &DriverSelection::Named("firefox".into()));
    assert_eq!(outcome.result(), TestResult::Failure);
    assert_eq!(outcome.steps().len(), 3);
    assert_eq!(
        outcome.steps().last().and_then(|step| step.failure()),
        Some("assertion failed: card declined")
    );
}

#[rstest]
fn outline_rows_fold_into_one_test(mut harness: Harness) {
    let outline = ScenarioNode::new("Ordering <item>").with_tags(["@stock"]);
    let block = ExamplesNode::new("")
        .with_row(["item", "qty"])
        .with_row(["apples", "3"])
        .with_row(["pears", "5"]);
    let translator = &mut harness.translator;
    translator
        .feature_entered(&FeatureNode::new("Stock"))
        .expect("feature starts");
    translator.outline_declared(&outline).expect("outline declared");
    translator.examples_declared(&block).expect("examples accepted");
    run_scenario(&mut harness, &ScenarioNode::new("Ordering apples"), &stock_steps("apples", "3"));
    run_scenario(&mut harness, &ScenarioNode::new("Ordering pears"), &stock_steps("pears", "5"));

    assert_eq!(harness.log.count("test-started"), 1);
    assert_eq!(harness.log.count("use-examples"), 1);
    assert_eq!(harness.log.count("example-started"), 2);
    assert_eq!(harness.log.count("example-finished"), 2);
    assert_eq!(harness.log.count("test-finished"), 2);
    assert_eq!(harness.reports.calls(), 1);
    assert!(!harness.translator.examples_running());

    let rows: Vec<ExampleRow> = harness
        .events()
        .into_iter()
        .filter_map(|event| match event {
            StoryEvent::ExampleStarted(row) => Some(row),
            _ => None,
        })
        .collect();
    assert_eq!(
        rows,
        [
            ExampleRow::new(["item", "qty"], ["apples", "3"]),
            ExampleRow::new(["item", "qty"], ["pears", "5"]),
        ]
    );

    let outcomes = harness.outcomes();
    let [outcome] = outcomes.as_slice() else {
        panic!("the outline should record one outcome, got {outcomes:?}");
    };
    assert_eq!(outcome.title(), "Ordering apples");
    assert_eq!(outcome.examples().map(|table| table.len()), Some(2));
    assert_eq!(outcome.steps().len(), 2);
    assert!(outcome.steps().iter().all(|example| example.children().len() == 2));
    assert_eq!(outcome.result(), TestResult::Success);
}

#[rstest]
fn later_examples_blocks_extend_the_same_test(mut harness: Harness) {
    let outline = ScenarioNode::new("Ordering <item>");
    let small = ExamplesNode::new("small")
        .with_row(["item", "qty"])
        .with_row(["apples", "1"]);
    let large = ExamplesNode::new("large")
        .with_row(["qty", "item"])
        .with_row(["40", "melons"]);
    harness
        .translator
        .feature_entered(&FeatureNode::new("Stock"))
        .expect("feature starts");
    harness
        .translator
        .outline_declared(&outline)
        .expect("outline declared");
    harness
        .translator
        .examples_declared(&small)
        .expect("first block accepted");
    run_scenario(&mut harness, &ScenarioNode::new("Ordering apples"), &stock_steps("apples", "1"));
    harness
        .translator
        .examples_declared(&large)
        .expect("second block accepted");
    run_scenario(&mut harness, &ScenarioNode::new("Ordering melons"), &stock_steps("melons", "40"));

    assert_eq!(harness.log.count("test-started"), 1);
    assert_eq!(harness.log.count("use-examples"), 2);
    assert_eq!(harness.reports.calls(), 2);

    let Some(table) = harness.translator.example_table() else {
        panic!("the outline should keep its table");
    };
    let titles: Vec<_> = table.datasets().iter().map(|set| set.title()).collect();
    assert_eq!(titles, [Some("small"), Some("large")]);
    let melons = table.rows().last().expect("second block row");
    assert_eq!(
        melons.iter().collect::<Vec<_>>(),
        [("item", "melons"), ("qty", "40")]
    );
}

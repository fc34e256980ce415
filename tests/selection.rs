mod common;

use eucalyptus::{parser, Feature, Runner, Selection, TagExpression};
use regex::Regex;

use self::common::{calculator, feature, results};

fn tagged() -> Vec<Feature> {
    ["withtags_one.feature", "withtags_two.feature"]
        .into_iter()
        .map(|name| parser::parse_path(feature(name), None).unwrap())
        .collect()
}

fn run(runner: &mut Runner, features: &[Feature]) -> Vec<i64> {
    let summary = runner.run(features).unwrap();
    assert!(summary.passed());
    results(runner.world())
}

fn run_tagged(expression: &str, features: &[Feature]) -> Vec<i64> {
    let mut runner = calculator();
    _ = runner.select(Selection::new().tags(expression.parse().unwrap()));
    run(&mut runner, features)
}

#[test]
fn selects_by_tag() {
    let features = tagged();
    let one = &features[..1];

    assert_eq!(run_tagged("hana", one), [1, 11, 22]);
    assert_eq!(run_tagged("@hana", one), [1, 11, 22]);
    assert_eq!(run_tagged("set", one), Vec::<i64>::new());
    assert_eq!(run_tagged("not hana", one), [2, 4]);
    assert_eq!(run_tagged("hana or dul", one), [1, 2, 11, 22]);
}

#[test]
fn merges_feature_tags() {
    let features = tagged();

    assert_eq!(run_tagged("dul", &features), [2, 13, 20, 200]);
    assert_eq!(run_tagged("not hana and not dul", &features), [4]);
    assert_eq!(
        run_tagged("(hana or dul) and not (hana and dul)", &features),
        [1, 2, 11, 22, 13, 20, 200],
    );
}

#[test]
fn selects_by_index() {
    let scenario_index =
        [parser::parse_path(feature("scenario_index.feature"), None).unwrap()];

    let cases: [(&str, Vec<i64>); 5] = [
        ("1", vec![10]),
        ("1,2", vec![10, 20]),
        ("2, 1", vec![10, 20]),
        ("3", vec![30, 40]),
        ("4", vec![]),
    ];
    for (indices, expected) in cases {
        let mut runner = calculator();
        _ = runner.select(Selection::new().indices(indices.parse().unwrap()));
        assert_eq!(run(&mut runner, &scenario_index), expected, "{indices}");
    }
}

#[test]
fn combines_criteria() {
    let features = tagged();
    let mut runner = calculator();
    _ = runner.select(
        Selection::new()
            .tags("hana".parse::<TagExpression>().unwrap())
            .indices("3".parse().unwrap()),
    );

    assert_eq!(run(&mut runner, &features), [11, 22]);
}

#[test]
fn selects_by_name() {
    let features = tagged();
    let mut runner = calculator();
    _ = runner.select(Selection::new().name(Regex::new("^T").unwrap()));

    assert_eq!(run(&mut runner, &features), [2, 13, 20, 200]);
}

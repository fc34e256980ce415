// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Outcomes of a run.

use std::{fmt, path::PathBuf, time::Duration};

use derive_more::with_trait::Display;

use crate::{
    feature::{Feature, Scenario, Step},
    step,
};

/// Number of steps shown on each side of a failed one.
const CONTEXT_RADIUS: usize = 2;

/// Final state of a concrete [`Scenario`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Status {
    /// Every step passed.
    #[display("passed")]
    Passed,

    /// A step failed.
    #[display("failed")]
    Failed,

    /// No step ran, as the run was aborted by a hook.
    #[display("skipped")]
    Skipped,
}

/// Step failure, with enough context to locate it in its `.feature` file.
#[derive(Debug)]
pub struct Failure {
    /// Path of the `.feature` file, if it was loaded from one.
    pub path: Option<PathBuf>,

    /// 1-based line of the failed step.
    pub line: usize,

    /// Keyword and text of the failed step.
    pub sentence: String,

    /// Indicator whether the failed step belongs to the [`Background`].
    ///
    /// [`Background`]: crate::feature::Background
    pub background: bool,

    /// Name of the [`Feature`].
    pub feature: String,

    /// Name of the [`Scenario`].
    pub scenario: String,

    /// 1-based line of the [`Outline`] row the [`Scenario`] was expanded
    /// from, if any.
    ///
    /// [`Outline`]: crate::feature::Outline
    pub example: Option<usize>,

    /// Lines and sentences of the steps around the failed one, the failed one
    /// included.
    pub context: Vec<(usize, String)>,

    /// Cause of the failure.
    pub error: step::Error,
}

impl Failure {
    /// Creates a [`Failure`] of the `steps[failed]` step, `background` ones
    /// being the first ones.
    pub(crate) fn new(
        feature: &Feature,
        scenario: &Scenario,
        steps: &[&Step],
        background: usize,
        failed: usize,
        error: step::Error,
    ) -> Self {
        let step = steps[failed];
        let window = failed.saturating_sub(CONTEXT_RADIUS)
            ..steps.len().min(failed + CONTEXT_RADIUS + 1);
        let context = steps[window]
            .iter()
            .map(|s| (s.line, s.sentence()))
            .collect();

        Self {
            path: feature.path.clone(),
            line: step.line,
            sentence: step.sentence(),
            background: failed < background,
            feature: feature.name.clone(),
            scenario: scenario.name.clone(),
            example: scenario.example.as_ref().map(|row| row.line),
            context,
            error,
        }
    }

    /// Returns the `path:line` of the failed step.
    #[must_use]
    pub fn location(&self) -> String {
        let path = self
            .path
            .as_deref()
            .map_or_else(|| "<text>".to_owned(), |p| p.display().to_string());
        format!("{path}:{}", self.line)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step failed: {}", self.location())?;
        if self.background {
            write!(f, " in background")?;
        }
        if let Some(line) = self.example {
            write!(f, ", example at line {line}")?;
        }
        writeln!(f)?;
        writeln!(f, "  Feature: {}", self.feature)?;
        writeln!(f, "  Scenario: {}", self.scenario)?;
        for (line, sentence) in &self.context {
            let marker = if *line == self.line { '>' } else { ' ' };
            writeln!(f, "  {marker} {line:>4} | {sentence}")?;
        }
        if let Some(location) = self.error.location() {
            writeln!(f, "  Defined at: {location}")?;
        }
        write!(f, "  {}", self.error)
    }
}

/// Outcome of a concrete [`Scenario`].
#[derive(Debug)]
pub struct ScenarioReport {
    /// Name of the [`Scenario`].
    pub name: String,

    /// Index of the [`Scenario`] block in its [`Feature`].
    pub index: usize,

    /// Sequence number of the concrete [`Scenario`] in its [`Feature`].
    pub sequence: usize,

    /// 1-based line of the [`Scenario`] header, or of its outline row.
    pub line: usize,

    /// Number of steps, [`Background`] ones included.
    ///
    /// [`Background`]: crate::feature::Background
    pub steps: usize,

    /// Number of passed steps.
    pub passed: usize,

    /// [`Failure`] of the [`Scenario`], if any.
    pub failure: Option<Failure>,

    /// Time the steps took.
    pub duration: Duration,
}

impl ScenarioReport {
    /// Returns the [`Status`] of the [`Scenario`].
    #[must_use]
    pub fn status(&self) -> Status {
        if self.failure.is_some() {
            Status::Failed
        } else if self.passed == self.steps {
            Status::Passed
        } else {
            Status::Skipped
        }
    }

    /// Returns the number of steps which didn't run.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.steps - self.passed - usize::from(self.failure.is_some())
    }
}

/// Outcome of a [`Feature`].
#[derive(Debug)]
pub struct FeatureReport {
    /// Name of the [`Feature`].
    pub name: String,

    /// Path of the `.feature` file, if it was loaded from one.
    pub path: Option<PathBuf>,

    /// Reports of the [`Scenario`]s run.
    pub scenarios: Vec<ScenarioReport>,
}

impl FeatureReport {
    pub(crate) fn new(feature: &Feature) -> Self {
        Self {
            name: feature.name.clone(),
            path: feature.path.clone(),
            scenarios: Vec::new(),
        }
    }

    /// Indicates whether no [`Scenario`] of this [`Feature`] failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.failure.is_none())
    }
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct Summary {
    /// Reports of the [`Feature`]s run.
    pub features: Vec<FeatureReport>,

    /// Time the run took.
    pub duration: Duration,
}

impl Summary {
    /// Iterates over all the [`ScenarioReport`]s.
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.features.iter().flat_map(|f| &f.scenarios)
    }

    /// Iterates over all the [`Failure`]s.
    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.scenarios().filter_map(|s| s.failure.as_ref())
    }

    /// Counts the [`Scenario`]s with the given [`Status`].
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.scenarios().filter(|s| s.status() == status).count()
    }

    /// Counts the steps passed, failed and skipped.
    #[must_use]
    pub fn steps(&self) -> (usize, usize, usize) {
        self.scenarios().fold((0, 0, 0), |(p, f, s), r| {
            (p + r.passed, f + usize::from(r.failure.is_some()), s + r.skipped())
        })
    }

    /// Indicates whether no [`Scenario`] failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.features.iter().all(FeatureReport::passed)
    }
}

#[cfg(test)]
mod tests {
    use crate::{outline, parser, step::Location};

    use super::*;

    const FEATURE: &str = "\
Feature: Calculator
  Background:
    Given a calculator

  Scenario: Add
    Given I have entered 50
    And I have entered 70
    When I press add
    Then the result should be 120
";

    fn failure(failed: usize) -> Failure {
        let mut feature = parser::parse(FEATURE, None).unwrap();
        feature.path = Some("features/calc.feature".into());
        let scenario = outline::expand_feature(&feature).remove(0).unwrap();
        let steps = feature
            .background
            .iter()
            .flat_map(|b| &b.steps)
            .chain(&scenario.steps)
            .collect::<Vec<_>>();
        let error = step::Error::Failed {
            sentence: steps[failed].sentence(),
            location: Location::new("tests/steps.rs", 7, 5),
            error: anyhow::anyhow!("expected 120, got 20"),
        };
        Failure::new(&feature, &scenario, &steps, 1, failed, error)
    }

    #[test]
    fn failure_points_at_step() {
        let failure = failure(3);

        assert_eq!(failure.location(), "features/calc.feature:8");
        assert_eq!(failure.sentence, "When I press add");
        assert!(!failure.background);
        assert_eq!(
            failure.context.iter().map(|(l, _)| *l).collect::<Vec<_>>(),
            [6, 7, 8, 9],
        );

        let rendered = failure.to_string();
        assert!(rendered.starts_with("Step failed: features/calc.feature:8\n"));
        assert!(rendered.contains(">    8 | When I press add"));
        assert!(rendered.contains("Defined at: tests/steps.rs:7:5"));
        assert!(rendered.ends_with("expected 120, got 20"));
    }

    #[test]
    fn background_failure_is_marked() {
        let failure = failure(0);

        assert!(failure.background);
        assert_eq!(failure.line, 3);
        assert!(failure
            .to_string()
            .starts_with("Step failed: features/calc.feature:3 in background\n"));
    }

    #[test]
    fn summary_counts() {
        let report = |steps, passed, failure| ScenarioReport {
            name: "Add".into(),
            index: 1,
            sequence: 1,
            line: 5,
            steps,
            passed,
            failure,
            duration: Duration::ZERO,
        };
        let summary = Summary {
            features: vec![FeatureReport {
                name: "Calculator".into(),
                path: None,
                scenarios: vec![
                    report(5, 5, None),
                    report(5, 3, Some(failure(3))),
                    report(5, 0, None),
                ],
            }],
            duration: Duration::ZERO,
        };

        assert_eq!(summary.count(Status::Passed), 1);
        assert_eq!(summary.count(Status::Failed), 1);
        assert_eq!(summary.count(Status::Skipped), 1);
        assert_eq!(summary.steps(), (8, 1, 6));
        assert_eq!(summary.failures().count(), 1);
        assert!(!summary.passed());
    }
}

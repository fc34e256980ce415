// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sequential execution of planned [`Scenario`]s.

use std::time::Instant;

use crate::{
    dialect::Dialect,
    feature::{Feature, Scenario},
    hook::{self, Event, HookError, Scope},
    outline::{Expansion, PlaceholderError},
    report::{Failure, FeatureReport, ScenarioReport, Summary},
    step, World,
};

/// [`Feature`] along with its selected concrete [`Scenario`]s.
#[derive(Debug)]
pub(super) struct Plan<'f> {
    pub(super) feature: &'f Feature,
    pub(super) scenarios: Vec<Expansion>,
}

/// Runs [`Plan`]s one [`Scenario`] at a time against a single [`World`].
#[derive(Debug)]
pub(super) struct Executor<'r> {
    pub(super) steps: &'r step::Registry,
    pub(super) hooks: &'r hook::Registry,
    pub(super) world: &'r mut World,
}

impl Executor<'_> {
    /// Runs all the [`Plan`]s wrapped into [`Event::All`] hooks.
    ///
    /// Stops at the first [`HookError`], still running the
    /// [`Phase::After`] hooks of the scopes already entered.
    ///
    /// [`Phase::After`]: hook::Phase::After
    pub(super) fn run(
        &mut self,
        plans: &[Plan<'_>],
    ) -> (Summary, Option<HookError>) {
        let started = Instant::now();
        let mut summary = Summary::default();

        let hooks = self.hooks;
        let (before, after) = hooks.before_after(Event::All);
        let mut pending = before.run(self.world, &Scope::All).err();
        if pending.is_none() {
            for plan in plans.iter().filter(|p| !p.scenarios.is_empty()) {
                let (report, error) = self.run_feature(plan);
                summary.features.push(report);
                if error.is_some() {
                    pending = error;
                    break;
                }
            }
        }
        settle(&mut pending, after.run(self.world, &Scope::All));

        summary.duration = started.elapsed();
        (summary, pending)
    }

    fn run_feature(
        &mut self,
        plan: &Plan<'_>,
    ) -> (FeatureReport, Option<HookError>) {
        let feature = plan.feature;
        let _span =
            tracing::debug_span!("feature", name = %feature.name).entered();
        let mut report = FeatureReport::new(feature);

        let hooks = self.hooks;
        let (before, after) = hooks.before_after(Event::Feature);
        let scope = Scope::Feature(feature);
        let mut pending = before.run(self.world, &scope).err();
        if pending.is_none() {
            for expansion in &plan.scenarios {
                let (scenario, missing) = match expansion {
                    Ok(scenario) => (scenario, None),
                    Err(unresolved) => {
                        (&unresolved.scenario, Some(&unresolved.error))
                    }
                };
                let (scenario, error) =
                    self.run_scenario(feature, scenario, missing);
                report.scenarios.push(scenario);
                if error.is_some() {
                    pending = error;
                    break;
                }
            }
        }
        settle(&mut pending, after.run(self.world, &scope));

        (report, pending)
    }

    /// Runs a single concrete `scenario` wrapped into [`Event::Example`]
    /// hooks.
    ///
    /// A `missing` placeholder fails the `scenario` at its step without
    /// running any.
    fn run_scenario(
        &mut self,
        feature: &Feature,
        scenario: &Scenario,
        missing: Option<&PlaceholderError>,
    ) -> (ScenarioReport, Option<HookError>) {
        let sequence = scenario.sequence.unwrap_or(scenario.index);
        let _span = tracing::debug_span!(
            "scenario",
            name = %scenario.name,
            index = scenario.index,
            sequence
        )
        .entered();
        let started = Instant::now();

        let dialect = Dialect::get(&feature.language)
            .unwrap_or_else(Dialect::default_dialect);
        let background =
            feature.background.as_ref().map_or(&[][..], |b| b.steps.as_slice());
        let steps = background.iter().chain(&scenario.steps).collect::<Vec<_>>();

        let hooks = self.hooks;
        let (before, after) = hooks.before_after(Event::Example);
        let mut pending = before
            .run(self.world, &Scope::Example { feature, scenario, finished: None })
            .err();

        let mut passed = 0;
        let mut failure = None;
        if let Some(missing) = missing.filter(|_| pending.is_none()) {
            let failed = steps
                .iter()
                .skip(background.len())
                .position(|s| s.line == missing.line)
                .map_or(background.len(), |i| background.len() + i);
            tracing::debug!(
                line = missing.line,
                error = %missing,
                "scenario unresolved"
            );
            if let Some(step) = steps.get(failed) {
                let error = step::Error::MissingPlaceholder {
                    sentence: step.sentence(),
                    placeholder: missing.placeholder.clone(),
                };
                failure = Some(Failure::new(
                    feature,
                    scenario,
                    &steps,
                    background.len(),
                    failed,
                    error,
                ));
            }
        } else if pending.is_none() {
            tracing::debug!(steps = steps.len(), "running steps");
            for (i, step) in steps.iter().enumerate() {
                if let Err(e) = self.steps.run(self.world, step, dialect) {
                    tracing::debug!(line = step.line, error = %e, "step failed");
                    failure = Some(Failure::new(
                        feature,
                        scenario,
                        &steps,
                        background.len(),
                        i,
                        e,
                    ));
                    break;
                }
                passed += 1;
            }
        }

        let mut report = ScenarioReport {
            name: scenario.name.clone(),
            index: scenario.index,
            sequence,
            line: scenario
                .example
                .as_ref()
                .map_or(scenario.line, |row| row.line),
            steps: steps.len(),
            passed,
            failure,
            duration: started.elapsed(),
        };
        tracing::debug!(status = %report.status(), "scenario finished");

        settle(
            &mut pending,
            after.run(
                self.world,
                &Scope::Example { feature, scenario, finished: Some(&report) },
            ),
        );
        report.duration = started.elapsed();

        (report, pending)
    }
}

/// Records the outcome of an after-hook chain, keeping an earlier failure
/// over a later one.
fn settle(pending: &mut Option<HookError>, after: Result<(), HookError>) {
    let Err(error) = after else { return };
    match pending {
        Some(earlier) => {
            tracing::warn!(
                %error,
                %earlier,
                "after hook failure suppressed by an earlier one"
            );
        }
        None => *pending = Some(error),
    }
}

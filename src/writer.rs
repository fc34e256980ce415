// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Human-readable rendering of a [`Summary`].

use std::{borrow::Cow, io, str::FromStr, time::Duration};

use console::Style;
use itertools::Itertools as _;
use smart_default::SmartDefault;

use crate::report::{ScenarioReport, Status, Summary};

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] decide whether output should be
    /// colored.
    #[default]
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

/// [`Style`]s for terminal output.
#[derive(Clone, Debug)]
pub struct Styles {
    /// [`Style`] for rendering successful events.
    pub ok: Style,

    /// [`Style`] for rendering skipped events.
    pub skipped: Style,

    /// [`Style`] for rendering errors and failed events.
    pub err: Style,

    /// [`Style`] for rendering header.
    pub header: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether output should be colored.
    pub is_present: bool,
}

impl Styles {
    /// Creates new [`Styles`] applying the given [`Coloring`] policy.
    #[must_use]
    pub fn new(coloring: Coloring) -> Self {
        Self {
            ok: Style::new().green(),
            skipped: Style::new().cyan(),
            err: Style::new().red(),
            header: Style::new().blue(),
            bold: Style::new().bold(),
            is_present: match coloring {
                Coloring::Auto => {
                    console::Term::stdout().is_term()
                        && console::colors_enabled()
                }
                Coloring::Always => true,
                Coloring::Never => false,
            },
        }
    }

    fn paint<'a>(
        &self,
        style: &Style,
        input: impl Into<Cow<'a, str>>,
    ) -> Cow<'a, str> {
        if self.is_present {
            style
                .apply_to(input.into())
                .force_styling(true)
                .to_string()
                .into()
        } else {
            input.into()
        }
    }

    /// Colors `input` with [`Styles::ok`], if coloring is on.
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.ok, input)
    }

    /// Colors `input` with [`Styles::skipped`], if coloring is on.
    #[must_use]
    pub fn skipped<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.skipped, input)
    }

    /// Colors `input` with [`Styles::err`], if coloring is on.
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.err, input)
    }

    /// Colors `input` with [`Styles::header`], if coloring is on.
    #[must_use]
    pub fn header<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.header, input)
    }

    /// Makes `input` __bold__, if coloring is on.
    #[must_use]
    pub fn bold<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.bold, input)
    }

    /// Generates the summary lines of the given [`Summary`].
    #[must_use]
    pub fn summary(&self, summary: &Summary) -> String {
        let scenarios = [Status::Passed, Status::Skipped, Status::Failed]
            .map(|s| summary.count(s));
        let (passed, failed, skipped) = summary.steps();

        format!(
            "{}\n{}\n{}{}\n{}{}\n{}",
            self.bold(self.header("[Summary]")),
            self.maybe_plural("feature", summary.features.len()),
            self.maybe_plural("scenario", scenarios.iter().sum()),
            self.format_stats(scenarios),
            self.maybe_plural("step", passed + skipped + failed),
            self.format_stats([passed, skipped, failed]),
            self.bold(format!("Finished in {}", elapsed(summary.duration))),
        )
    }

    /// Formats `[passed, skipped, failed]` counts, omitting zero ones.
    fn format_stats(&self, [passed, skipped, failed]: [usize; 3]) -> String {
        let formatted = [
            (passed > 0).then(|| self.ok(format!("{passed} passed"))),
            (skipped > 0).then(|| self.skipped(format!("{skipped} skipped"))),
            (failed > 0).then(|| self.err(format!("{failed} failed"))),
        ]
        .into_iter()
        .flatten()
        .join(", ");

        if formatted.is_empty() {
            formatted
        } else {
            format!(" ({formatted})")
        }
    }

    /// Adds `s` to `singular` if the given `num` is not `1`.
    fn maybe_plural(&self, singular: &str, num: usize) -> Cow<'static, str> {
        let suffix = if num == 1 { "" } else { "s" };
        self.bold(format!("{num} {singular}{suffix}"))
    }
}

/// Rounds the `duration` to milliseconds and makes it human-readable.
fn elapsed(duration: Duration) -> humantime::FormattedDuration {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_millis(millis))
}

/// Default writer rendering every [`Feature`], its [`Scenario`]s and their
/// [`Failure`]s, followed by the summary lines.
///
/// [`Failure`]: crate::report::Failure
/// [`Feature`]: crate::feature::Feature
/// [`Scenario`]: crate::feature::Scenario
#[derive(Debug)]
pub struct Basic<Out: io::Write = io::Stdout> {
    output: Out,
    styles: Styles,
}

impl Basic {
    /// Creates a [`Basic`] writer printing to [`io::Stdout`].
    #[must_use]
    pub fn stdout(coloring: Coloring) -> Self {
        Self::new(io::stdout(), coloring)
    }
}

impl<Out: io::Write> Basic<Out> {
    /// Creates a [`Basic`] writer printing to the given `output`.
    #[must_use]
    pub fn new(output: Out, coloring: Coloring) -> Self {
        Self { output, styles: Styles::new(coloring) }
    }

    /// Returns the underlying output.
    pub fn into_inner(self) -> Out {
        self.output
    }

    /// Writes out the given [`Summary`].
    ///
    /// # Errors
    ///
    /// If the output fails to be written into.
    pub fn write(&mut self, summary: &Summary) -> io::Result<()> {
        for feature in &summary.features {
            let path = feature
                .path
                .as_deref()
                .map(|p| format!(" {}", p.display()))
                .unwrap_or_default();
            writeln!(
                self.output,
                "{}{path}",
                self.styles.bold(format!("Feature: {}", feature.name)),
            )?;
            for scenario in &feature.scenarios {
                self.write_scenario(scenario)?;
            }
        }
        writeln!(self.output, "{}", self.styles.summary(summary))
    }

    fn write_scenario(&mut self, scenario: &ScenarioReport) -> io::Result<()> {
        let title = format!(
            "Scenario #{}: {} (line {})",
            scenario.sequence, scenario.name, scenario.line,
        );
        let line = match scenario.status() {
            Status::Passed => self.styles.ok(format!("  ✔  {title}")),
            Status::Skipped => self.styles.skipped(format!("  -  {title}")),
            Status::Failed => self.styles.err(format!("  ✘  {title}")),
        };
        writeln!(self.output, "{line}")?;

        if let Some(failure) = &scenario.failure {
            let indented = failure
                .to_string()
                .lines()
                .map(|l| format!("      {l}"))
                .join("\n");
            writeln!(self.output, "{}", self.styles.err(indented))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{parser, Runner};

    use super::*;

    fn render(summary: &Summary) -> String {
        let mut writer = Basic::new(Vec::new(), Coloring::Never);
        writer.write(summary).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn parses_coloring() {
        assert_eq!("Always".parse(), Ok(Coloring::Always));
        assert_eq!("never".parse(), Ok(Coloring::Never));
        assert!("sometimes".parse::<Coloring>().is_err());
        assert_eq!(Coloring::default(), Coloring::Auto);
    }

    #[test]
    fn renders_run() {
        let feature = parser::parse(
            "Feature: Rendering\n\
             \x20 Scenario: fine\n\
             \x20   Given a defined step\n\
             \x20 Scenario: broken\n\
             \x20   Given an undefined step\n\
             \x20   Then a defined step\n",
            None,
        )
        .unwrap();
        let mut runner = Runner::new();
        _ = runner.step("a defined step", |_, _| ()).unwrap();
        let summary = runner.run(&[feature]).unwrap();

        let output = render(&summary);
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Feature: Rendering");
        assert_eq!(lines[1], "  ✔  Scenario #1: fine (line 2)");
        assert_eq!(lines[2], "  ✘  Scenario #2: broken (line 4)");
        assert_eq!(lines[3], "      Step failed: <text>:5");
        assert!(output.contains(r#"The step r"Given an undefined step" is not defined"#));
        assert!(output.contains("[Summary]\n1 feature\n2 scenarios (1 passed, 1 failed)\n"));
        assert!(output.contains("3 steps (1 passed, 1 skipped, 1 failed)\n"));
        assert!(output.contains("Finished in "));
    }

    #[test]
    fn colors_when_forced() {
        let styles = Styles::new(Coloring::Always);

        assert_ne!(styles.ok("passed"), "passed");
        assert_eq!(Styles::new(Coloring::Never).ok("passed"), "passed");
    }
}

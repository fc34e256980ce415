// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Context of a running step.

use std::str::FromStr;

use anyhow::Context as _;

use crate::{dialect::Dialect, feature::Step, table::Table, World};

use super::{Error, Location, Registry};

/// Name of a capturing group inside a step pattern.
pub type CaptureName = Option<String>;

/// Context for a step [`Fn`] execution.
#[derive(Debug)]
pub struct Context<'a> {
    /// [`Registry`] the step was resolved with.
    registry: &'a Registry,

    /// [`Dialect`] of the [`Feature`] being run.
    ///
    /// [`Feature`]: crate::feature::Feature
    dialect: &'static Dialect,

    /// [`Step`] matched to the step [`Fn`].
    step: &'a Step,

    /// Every capture group of the pattern, the whole match being the first.
    matches: Vec<(CaptureName, Option<String>)>,

    /// [`Location`] of the matched definition.
    location: Location,

    /// Indices of the definitions being run along with the step texts they
    /// run for, the current one included.
    active: Vec<(usize, String)>,
}

impl<'a> Context<'a> {
    pub(super) const fn new(
        registry: &'a Registry,
        dialect: &'static Dialect,
        step: &'a Step,
        matches: Vec<(CaptureName, Option<String>)>,
        location: Location,
        active: Vec<(usize, String)>,
    ) -> Self {
        Self { registry, dialect, step, matches, location, active }
    }

    /// Returns the matched [`Step`].
    #[must_use]
    pub const fn step(&self) -> &Step {
        self.step
    }

    /// Returns the data [`Table`] of the [`Step`], if any.
    #[must_use]
    pub fn table(&self) -> Option<&Table> {
        self.step.table.as_ref()
    }

    /// Returns the doc string of the [`Step`], if any.
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        self.step.docstring.as_deref()
    }

    /// Returns the [`Location`] of the matched definition.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Returns the [`Dialect`] of the [`Feature`] being run.
    ///
    /// [`Feature`]: crate::feature::Feature
    #[must_use]
    pub const fn dialect(&self) -> &'static Dialect {
        self.dialect
    }

    /// Returns all the capture groups, the whole match included.
    #[must_use]
    pub fn matches(&self) -> &[(CaptureName, Option<String>)] {
        &self.matches
    }

    /// Returns the value of the capture group at `index`, `0` being the whole
    /// match.
    ///
    /// [`None`] if there is no such group, or it didn't participate in the
    /// match.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.matches.get(index)?.1.as_deref()
    }

    /// Returns the value of the named capture group, if it participated in
    /// the match.
    #[must_use]
    pub fn name(&self, name: &str) -> Option<&str> {
        self.matches
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))?
            .1
            .as_deref()
    }

    /// Iterates over the values of the capture groups, the whole match
    /// excluded.
    pub fn groups(&self) -> impl Iterator<Item = Option<&str>> {
        self.matches.iter().skip(1).map(|(_, v)| v.as_deref())
    }

    /// Parses the value of the capture group at `index` into a `T`.
    ///
    /// # Errors
    ///
    /// If the group didn't participate in the match, or its value isn't a
    /// valid `T`.
    pub fn parse<T>(&self, index: usize) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = self
            .get(index)
            .with_context(|| format!("capture group {index} didn't match"))?;
        raw.parse()
            .with_context(|| format!("failed to parse capture group {index} `{raw}`"))
    }

    /// Runs other steps as if they were written in place of this one.
    ///
    /// Every non-blank line of the `sentences` is a step, either a bare text
    /// (`I press add`) or one starting with a step keyword of the current
    /// [`Dialect`] (`When I press add`). Lines run in order, up to the first
    /// failure.
    ///
    /// # Errors
    ///
    /// If any of the steps fails, isn't defined, or leads back to a step
    /// already running.
    pub fn behave_as(&self, world: &mut World, sentences: &str) -> Result<(), Error> {
        for line in sentences.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (keyword, kind, text) = self.dialect.match_step(line).map_or(
                ("", self.step.kind, line),
                |m| (m.keyword, m.kind, m.text),
            );
            let step = Step {
                keyword: keyword.to_owned(),
                kind,
                text: text.to_owned(),
                table: None,
                docstring: None,
                line: self.step.line,
            };
            self.registry.invoke(world, &step, self.dialect, &self.active)?;
        }
        Ok(())
    }
}

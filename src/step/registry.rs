// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ordered table of step definitions.

use std::iter;

use derive_more::with_trait::Debug;
use regex::Regex;

use crate::{dialect::Dialect, feature::Step, panic_trap, World};

use super::{
    CaptureName, Context, Error, IntoOutcome, Location, PatternError, StepFn,
};

/// Registered step pattern with its [`Fn`].
#[derive(Debug)]
struct Definition {
    /// Pattern as given on registration.
    pattern: String,

    /// Compiled pattern, anchored at both ends.
    regex: Regex,

    /// Where the definition was registered.
    location: Location,

    /// Step [`Fn`] itself.
    #[debug(skip)]
    callback: Box<StepFn>,
}

/// Registered definition matching a step text.
#[derive(Debug)]
pub struct Match<'r> {
    /// Position of the definition in the [`Registry`].
    index: usize,

    definition: &'r Definition,

    /// Every capture group of the pattern, the whole match being the first.
    matches: Vec<(CaptureName, Option<String>)>,
}

impl Match<'_> {
    /// Returns the pattern of the matched definition, as registered.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.definition.pattern
    }

    /// Returns the [`Location`] of the matched definition.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.definition.location
    }

    /// Returns all the capture groups, the whole match included.
    #[must_use]
    pub fn matches(&self) -> &[(CaptureName, Option<String>)] {
        &self.matches
    }
}

/// Ordered table of step patterns and their [`Fn`]s.
///
/// Patterns are regular expressions that have to match the whole step text
/// (without its keyword). Resolution scans the definitions in registration
/// order and the **first** matching one wins, however specific later ones
/// are, so the order of registration is a part of the step vocabulary.
///
/// # Example
///
/// ```rust
/// use eucalyptus::{dialect::Dialect, step::Registry, World};
///
/// let mut steps = Registry::new();
/// steps
///     .register(r"I have (\d+) cucumbers", |world, ctx| {
///         world.set("cucumbers", ctx.parse::<u32>(1)?);
///         anyhow::Ok(())
///     })
///     .unwrap();
///
/// let feature = eucalyptus::parser::parse(
///     "Feature: f\n  Scenario: s\n    Given I have 12 cucumbers\n",
///     None,
/// )
/// .unwrap();
/// let mut world = World::new();
/// steps
///     .run(&mut world, &feature.scenarios[0].steps[0], Dialect::default_dialect())
///     .unwrap();
///
/// assert_eq!(world.get::<u32>("cucumbers"), Some(&12));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    definitions: Vec<Definition>,
}

impl Registry {
    /// Creates a new empty [`Registry`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step definition matching the given `pattern`.
    ///
    /// The step [`Fn`] may return either `()` or a [`Result`].
    ///
    /// # Errors
    ///
    /// If the `pattern` isn't a valid regular expression.
    #[track_caller]
    pub fn register<F, O>(
        &mut self,
        pattern: &str,
        step: F,
    ) -> Result<&mut Self, PatternError>
    where
        F: Fn(&mut World, &Context<'_>) -> O + 'static,
        O: IntoOutcome,
    {
        let location = Location::caller();
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            PatternError { pattern: pattern.to_owned(), source }
        })?;

        tracing::debug!(pattern, %location, "step registered");
        self.definitions.push(Definition {
            pattern: pattern.to_owned(),
            regex,
            location,
            callback: Box::new(move |w: &mut World, c: &Context<'_>| {
                step(w, c).into_outcome()
            }),
        });
        Ok(self)
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Indicates whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates over the registered patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.pattern.as_str())
    }

    /// Removes all the definitions.
    pub fn clear(&mut self) {
        self.definitions.clear();
    }

    /// Returns the first definition matching the given step `text`, if any.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<Match<'_>> {
        self.definitions.iter().enumerate().find_map(|(index, definition)| {
            let captures = definition.regex.captures(text)?;
            let matches = definition
                .regex
                .capture_names()
                .zip(captures.iter())
                .map(|(name, m)| {
                    (name.map(str::to_owned), m.map(|m| m.as_str().to_owned()))
                })
                .collect();
            Some(Match { index, definition, matches })
        })
    }

    /// Returns the first definition matching the given [`Step`].
    ///
    /// # Errors
    ///
    /// [`Error::NoDefinitionFound`] if nothing matches.
    pub fn resolve(&self, step: &Step) -> Result<Match<'_>, Error> {
        self.find(&step.text)
            .ok_or_else(|| Error::NoDefinitionFound { sentence: step.sentence() })
    }

    /// Resolves and runs the given [`Step`].
    ///
    /// # Errors
    ///
    /// If the [`Step`] isn't defined, or its [`Fn`] fails or panics.
    pub fn run(
        &self,
        world: &mut World,
        step: &Step,
        dialect: &'static Dialect,
    ) -> Result<(), Error> {
        self.invoke(world, step, dialect, &[])
    }

    /// Resolves and runs the given [`Step`] on top of the `active`
    /// definitions.
    ///
    /// Only re-entering a definition with the very same text is a cycle: a
    /// definition may delegate to itself with another text.
    pub(super) fn invoke(
        &self,
        world: &mut World,
        step: &Step,
        dialect: &'static Dialect,
        active: &[(usize, String)],
    ) -> Result<(), Error> {
        let Match { index, definition, matches } = self.resolve(step)?;
        let location = definition.location;
        if active.iter().any(|(i, text)| *i == index && *text == step.text) {
            return Err(Error::RecursiveStep { sentence: step.sentence(), location });
        }
        tracing::debug!(
            step = %step.sentence(),
            pattern = %definition.pattern,
            %location,
            "step matched"
        );

        let active = active
            .iter()
            .cloned()
            .chain(iter::once((index, step.text.clone())))
            .collect();
        let ctx = Context::new(self, dialect, step, matches, location, active);
        match panic_trap::trap(|| (definition.callback)(world, &ctx)) {
            Ok(Ok(())) => Ok(()),
            // Failures of delegated steps surface unchanged.
            Ok(Err(e)) => Err(e.downcast::<Error>().unwrap_or_else(|error| {
                Error::Failed { sentence: step.sentence(), location, error }
            })),
            Err(message) => {
                Err(Error::Panicked { sentence: step.sentence(), location, message })
            }
        }
    }
}

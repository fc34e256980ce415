// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Expansion of [`Scenario`] templates into concrete [`Scenario`]s.

use derive_more::with_trait::{Display, Error};
use lazy_regex::regex;
use linked_hash_map::LinkedHashMap;

use crate::feature::{Feature, Outline, Scenario, Step};

/// `<placeholder>` referencing a column absent from the `Examples` table.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display(
    "`<{placeholder}>` at line {line} of scenario `{scenario}` has no \
     matching `Examples` column"
)]
pub struct PlaceholderError {
    /// Name of the template [`Scenario`].
    pub scenario: String,

    /// Placeholder name, without angle brackets.
    pub placeholder: String,

    /// Line of the [`Step`] holding the placeholder.
    pub line: usize,
}

/// Concrete [`Scenario`] whose `Examples` row lacks a placeholder value.
#[derive(Clone, Debug, PartialEq)]
pub struct Unresolved {
    /// The [`Scenario`] with the missing placeholders left verbatim.
    pub scenario: Scenario,

    /// First missing placeholder.
    pub error: PlaceholderError,
}

/// Outcome of expanding a single `Examples` row, or a plain [`Scenario`].
pub type Expansion = Result<Scenario, Unresolved>;

/// Stateful expander assigning consecutive sequence numbers to the concrete
/// [`Scenario`]s it produces.
#[derive(Clone, Copy, Debug)]
pub struct Expander {
    next: usize,
}

impl Default for Expander {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl Expander {
    /// Creates a new [`Expander`] starting the sequence at `1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sequence number the next concrete [`Scenario`] gets.
    #[must_use]
    pub const fn next_sequence(&self) -> usize {
        self.next
    }

    /// Turns the given `scenario` into concrete ones.
    ///
    /// A template yields one [`Scenario`] per [`Outline`] row, in row order,
    /// with every `<key>` of its step texts, table cells and doc strings
    /// replaced by the row value. Any other [`Scenario`] passes through as
    /// is. Either way, only the sequence number is newly assigned, and the
    /// given `scenario` stays untouched.
    ///
    /// A row lacking a value for some placeholder still takes its sequence
    /// number, but yields an [`Unresolved`] [`Scenario`] instead, so that the
    /// rest of the rows and templates are unaffected.
    pub fn expand(&mut self, scenario: &Scenario) -> Vec<Expansion> {
        let Some(rows) = &scenario.outlines else {
            let mut concrete = scenario.clone();
            concrete.sequence = Some(self.advance());
            return vec![Ok(concrete)];
        };

        rows.iter()
            .map(|row| {
                let mut missing = None;
                let steps = scenario
                    .steps
                    .iter()
                    .map(|s| {
                        let (step, unknown) = substitute_step(s, &row.values);
                        if missing.is_none() {
                            missing = unknown.map(|p| (p, s.line));
                        }
                        step
                    })
                    .collect();
                let concrete = self.instantiate(scenario, row, steps);

                match missing {
                    None => Ok(concrete),
                    Some((placeholder, line)) => {
                        tracing::debug!(
                            scenario = %scenario.name,
                            placeholder,
                            line,
                            "unresolved placeholder"
                        );
                        Err(Unresolved {
                            error: PlaceholderError {
                                scenario: scenario.name.clone(),
                                placeholder,
                                line,
                            },
                            scenario: concrete,
                        })
                    }
                }
            })
            .collect()
    }

    fn instantiate(
        &mut self,
        template: &Scenario,
        row: &Outline,
        steps: Vec<Step>,
    ) -> Scenario {
        Scenario {
            keyword: template.keyword.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            tags: template.tags.clone(),
            steps,
            outlines: None,
            example: Some(row.clone()),
            index: template.index,
            sequence: Some(self.advance()),
            line: template.line,
        }
    }

    fn advance(&mut self) -> usize {
        let current = self.next;
        self.next += 1;
        current
    }
}

/// Expands all the [`Scenario`]s of the given [`Feature`] in document order.
#[must_use]
pub fn expand_feature(feature: &Feature) -> Vec<Expansion> {
    let mut expander = Expander::new();
    let mut concrete = Vec::with_capacity(feature.count_scenarios());
    for scenario in &feature.scenarios {
        concrete.extend(expander.expand(scenario));
    }
    concrete
}

/// Substitutes placeholders of a [`Step`], returning the first placeholder
/// missing from the `values`, if any.
fn substitute_step(
    step: &Step,
    values: &LinkedHashMap<String, String>,
) -> (Step, Option<String>) {
    let mut missing = None;
    let mut step = step.clone();
    step.text = substitute(&step.text, values, &mut missing);
    if let Some(table) = step.table.as_mut() {
        for cell in table.cells_mut() {
            *cell = substitute(cell, values, &mut missing);
        }
    }
    if let Some(doc) = step.docstring.as_mut() {
        *doc = substitute(doc, values, &mut missing);
    }
    (step, missing)
}

/// Replaces every `<name>` in the `text` with its value.
///
/// Placeholders absent from the `values` are left verbatim, the first one
/// being recorded into `missing`. Angle brackets enclosing leading
/// whitespace, like in `1 < 2 and 3 > 2`, are not placeholders.
fn substitute(
    text: &str,
    values: &LinkedHashMap<String, String>,
    missing: &mut Option<String>,
) -> String {
    regex!(r"<([^<>\s][^<>]*)>")
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            values.get(name).cloned().unwrap_or_else(|| {
                _ = missing.get_or_insert_with(|| name.to_owned());
                caps[0].to_owned()
            })
        })
        .into_owned()
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Structured model of a parsed [Gherkin] document.
//!
//! Everything here is created by the [`parser`] and never mutated afterwards:
//! [`outline`] expansion produces new [`Scenario`]s instead of rewriting its
//! template.
//!
//! [`outline`]: crate::outline
//! [`parser`]: crate::parser
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use std::path::{Path, PathBuf};

use linked_hash_map::LinkedHashMap;

use crate::{dialect::StepKind, table::Table};

/// Top-level named specification document.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// Header keyword exactly as spelled (`Feature`, `Fonctionnalité`, ...).
    pub keyword: String,

    /// Name following the header keyword.
    pub name: String,

    /// Free-text description lines, joined with `\n`.
    pub description: String,

    /// Code of the [`Dialect`] this [`Feature`] was parsed with.
    ///
    /// [`Dialect`]: crate::dialect::Dialect
    pub language: String,

    /// Tags of this [`Feature`], without the leading `@`.
    pub tags: Vec<String>,

    /// [`Background`] shared by all the [`Scenario`]s, if any.
    pub background: Option<Background>,

    /// [`Scenario`]s and [`Scenario`] templates in document order.
    pub scenarios: Vec<Scenario>,

    /// Path of the `.feature` file, if parsed from one.
    pub path: Option<PathBuf>,

    /// 1-based line of the header.
    pub line: usize,
}

impl Feature {
    /// Returns the [`Path`] of the `.feature` file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Counts concrete [`Scenario`]s this [`Feature`] runs, expanding every
    /// template into its [`Outline`] rows.
    #[must_use]
    pub fn count_scenarios(&self) -> usize {
        self.scenarios
            .iter()
            .map(|s| s.outlines.as_ref().map_or(1, Vec::len))
            .sum()
    }

    /// Counts [`Step`]s of this [`Feature`] as written, the [`Background`]
    /// ones counted once.
    #[must_use]
    pub fn count_steps(&self) -> usize {
        self.background.as_ref().map_or(0, |b| b.steps.len())
            + self.scenarios.iter().map(|s| s.steps.len()).sum::<usize>()
    }
}

/// [`Step`]s re-run before every [`Scenario`] of a [`Feature`].
#[derive(Clone, Debug, PartialEq)]
pub struct Background {
    /// Header keyword exactly as spelled.
    pub keyword: String,

    /// Optional name following the header keyword.
    pub name: String,

    /// [`Step`]s in document order.
    pub steps: Vec<Step>,

    /// 1-based line of the header.
    pub line: usize,
}

/// Named ordered sequence of [`Step`]s, describing a single test case.
///
/// A [`Scenario`] having [`Scenario::outlines`] is a template: it's never run
/// directly, only its expansions produced by the [`outline`] module are.
///
/// [`outline`]: crate::outline
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Header keyword exactly as spelled.
    pub keyword: String,

    /// Name following the header keyword.
    pub name: String,

    /// Free-text description lines, joined with `\n`.
    pub description: String,

    /// Tags of the [`Feature`] followed by the ones of this [`Scenario`],
    /// without the leading `@` and without duplicates.
    pub tags: Vec<String>,

    /// [`Step`]s in document order.
    pub steps: Vec<Step>,

    /// Rows of the `Examples` tables, if this [`Scenario`] is a template.
    pub outlines: Option<Vec<Outline>>,

    /// Row this [`Scenario`] was expanded from, if any.
    pub example: Option<Outline>,

    /// 1-based position of the `Scenario`/`Scenario Outline` block inside
    /// its [`Feature`], shared by all the expansions of a template.
    pub index: usize,

    /// 1-based position among the concrete [`Scenario`]s of the [`Feature`],
    /// assigned on expansion.
    pub sequence: Option<usize>,

    /// 1-based line of the header.
    pub line: usize,
}

impl Scenario {
    /// Indicates whether this [`Scenario`] is a template to be expanded.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        self.outlines.is_some()
    }

    /// Indicates whether this [`Scenario`] has the given `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Single `Examples` row of a [`Scenario`] template.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Outline {
    /// Placeholder name to literal value, in header order.
    pub values: LinkedHashMap<String, String>,

    /// 1-based line of the row.
    pub line: usize,
}

/// Single line of a [`Scenario`] or [`Background`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    /// Keyword exactly as spelled, including its trailing space, if any.
    pub keyword: String,

    /// Canonical kind of the [`Step::keyword`].
    pub kind: StepKind,

    /// Text following the keyword, possibly holding `<placeholder>`s.
    pub text: String,

    /// Data [`Table`] attached to this [`Step`], if any.
    pub table: Option<Table>,

    /// Doc string attached to this [`Step`], if any.
    pub docstring: Option<String>,

    /// 1-based line of this [`Step`].
    pub line: usize,
}

impl Step {
    /// Returns the whole sentence of this [`Step`]: its keyword immediately
    /// followed by its text, as written in the document.
    #[must_use]
    pub fn sentence(&self) -> String {
        format!("{}{}", self.keyword, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(keyword: &str, text: &str) -> Step {
        Step {
            keyword: keyword.into(),
            kind: StepKind::Given,
            text: text.into(),
            table: None,
            docstring: None,
            line: 1,
        }
    }

    fn scenario(outlines: Option<usize>) -> Scenario {
        Scenario {
            keyword: "Scenario".into(),
            name: "sc".into(),
            description: String::new(),
            tags: vec!["hana".into()],
            steps: vec![step("Given ", "a"), step("Then ", "b")],
            outlines: outlines.map(|n| {
                (0..n)
                    .map(|i| Outline { values: LinkedHashMap::new(), line: i })
                    .collect()
            }),
            example: None,
            index: 1,
            sequence: None,
            line: 1,
        }
    }

    #[test]
    fn sentence_keeps_keyword_spacing() {
        assert_eq!(step("Given ", "I do").sentence(), "Given I do");
        assert_eq!(step("当", "我开曲速引擎").sentence(), "当我开曲速引擎");
    }

    #[test]
    fn counts_expanded_scenarios_and_steps() {
        let feature = Feature {
            keyword: "Feature".into(),
            name: "f".into(),
            description: String::new(),
            language: "en".into(),
            tags: vec![],
            background: Some(Background {
                keyword: "Background".into(),
                name: String::new(),
                steps: vec![step("Given ", "bg")],
                line: 2,
            }),
            scenarios: vec![scenario(None), scenario(Some(3)), scenario(Some(0))],
            path: None,
            line: 1,
        };

        assert_eq!(feature.count_scenarios(), 4);
        assert_eq!(feature.count_steps(), 7);
    }

    #[test]
    fn templates_are_recognized() {
        assert!(!scenario(None).is_template());
        assert!(scenario(Some(0)).is_template());
        assert!(scenario(None).has_tag("hana"));
        assert!(!scenario(None).has_tag("dul"));
    }
}

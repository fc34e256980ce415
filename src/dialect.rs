// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Localized [Gherkin] step keywords.
//!
//! Block headers and the document grammar of every language come from
//! [`gherkin`]. The [`DIALECTS`] table only spells step keywords, so that
//! conjunctions are told apart from the kinds they continue, and so that
//! sentences delegated from inside a step are recognized in the language of
//! the running [`Feature`].
//!
//! Spellings follow the [Gherkin] convention: a spelling ending with a space
//! has to be followed by whitespace in the document (`Given `), while a
//! spelling without it is glued to the step text (`假如`).
//!
//! [`Feature`]: crate::Feature
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use derive_more::with_trait::Display;

/// Language used when neither an explicit override nor a `# language:`
/// directive is present.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Canonical step keyword.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum StepKind {
    /// `Given` step.
    #[display("Given")]
    Given,

    /// `When` step.
    #[display("When")]
    When,

    /// `Then` step.
    #[display("Then")]
    Then,

    /// `And` step, also used for the `*` bullet.
    #[display("And")]
    And,

    /// `But` step.
    #[display("But")]
    But,
}

impl From<gherkin::StepType> for StepKind {
    fn from(ty: gherkin::StepType) -> Self {
        match ty {
            gherkin::StepType::Given => Self::Given,
            gherkin::StepType::When => Self::When,
            gherkin::StepType::Then => Self::Then,
        }
    }
}

/// Keyword spellings of a single language.
#[derive(Clone, Copy, Debug)]
pub struct Dialect {
    /// Language code, as used in `# language: <code>` directives.
    pub code: &'static str,

    /// Additional codes resolving to this [`Dialect`].
    pub aliases: &'static [&'static str],

    /// English name of the language.
    pub name: &'static str,

    /// Spellings of the `Given` step keyword.
    pub given: &'static [&'static str],

    /// Spellings of the `When` step keyword.
    pub when: &'static [&'static str],

    /// Spellings of the `Then` step keyword.
    pub then: &'static [&'static str],

    /// Spellings of the `And` step keyword.
    pub and: &'static [&'static str],

    /// Spellings of the `But` step keyword.
    pub but: &'static [&'static str],
}

/// Step keyword recognized at the start of a line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StepMatch<'l> {
    /// Canonical kind of the keyword.
    pub kind: StepKind,

    /// Keyword exactly as spelled, including its trailing space, if any.
    pub keyword: &'static str,

    /// Remaining step text.
    pub text: &'l str,
}

impl Dialect {
    /// Looks up a [`Dialect`] by its language `code`.
    ///
    /// Lookup is case-insensitive and treats `_` as `-`, so `pt_BR`, `pt-br`
    /// and `pt` resolve to the same [`Dialect`].
    #[must_use]
    pub fn get(code: &str) -> Option<&'static Self> {
        let code = code.trim().replace('_', "-");
        DIALECTS.iter().find(|d| {
            d.code.eq_ignore_ascii_case(&code)
                || d.aliases.iter().any(|a| a.eq_ignore_ascii_case(&code))
        })
    }

    /// Returns the [`Dialect`] of the [`DEFAULT_LANGUAGE`].
    #[must_use]
    pub fn default_dialect() -> &'static Self {
        &DIALECTS[0]
    }

    /// Lists codes of all the supported languages.
    pub fn languages() -> impl Iterator<Item = &'static str> {
        DIALECTS.iter().map(|d| d.code)
    }

    /// Returns all the spellings of the given [`StepKind`].
    #[must_use]
    pub const fn steps(&self, kind: StepKind) -> &'static [&'static str] {
        match kind {
            StepKind::Given => self.given,
            StepKind::When => self.when,
            StepKind::Then => self.then,
            StepKind::And => self.and,
            StepKind::But => self.but,
        }
    }

    /// Recognizes a step `line` (already trimmed).
    ///
    /// The longest matching spelling wins. A spelling ending with a space
    /// also matches when the keyword is the whole `line`.
    #[must_use]
    pub fn match_step<'l>(&self, line: &'l str) -> Option<StepMatch<'l>> {
        // `And` goes last, so the `*` bullet shared by every kind resolves
        // to it: `max_by_key()` returns the last of equal elements.
        [
            StepKind::Given,
            StepKind::When,
            StepKind::Then,
            StepKind::But,
            StepKind::And,
        ]
        .into_iter()
        .flat_map(|k| self.steps(k).iter().map(move |s| (k, *s)))
        .filter_map(|(kind, keyword)| {
            let text = line.strip_prefix(keyword).or_else(|| {
                keyword
                    .strip_suffix(' ')
                    .filter(|bare| *bare == line)
                    .map(|_| "")
            })?;
            Some(StepMatch { kind, keyword, text: text.trim() })
        })
        .max_by_key(|m| m.keyword.len())
    }
}

/// Table of all the supported [`Dialect`]s, the first one being the
/// [`DEFAULT_LANGUAGE`].
pub static DIALECTS: &[Dialect] = &[
    Dialect {
        code: "en",
        aliases: &["en-us", "en-gb"],
        name: "English",
        given: &["* ", "Given "],
        when: &["* ", "When "],
        then: &["* ", "Then "],
        and: &["* ", "And "],
        but: &["* ", "But "],
    },
    Dialect {
        code: "fr",
        aliases: &["fr-fr", "fr-ca"],
        name: "French",
        given: &[
            "* ",
            "Soit ",
            "Sachant que ",
            "Sachant qu'",
            "Sachant ",
            "Etant donné que ",
            "Etant donné qu'",
            "Etant donné ",
            "Etant donnée ",
            "Etant donnés ",
            "Etant données ",
            "Étant donné que ",
            "Étant donné qu'",
            "Étant donné ",
            "Étant donnée ",
            "Étant donnés ",
            "Étant données ",
        ],
        when: &["* ", "Quand ", "Lorsque ", "Lorsqu'"],
        then: &["* ", "Alors ", "Donc "],
        and: &["* ", "Et que ", "Et qu'", "Et "],
        but: &["* ", "Mais que ", "Mais qu'", "Mais "],
    },
    Dialect {
        code: "pt",
        aliases: &["pt-br", "pt-pt"],
        name: "Portuguese",
        given: &["* ", "Dado ", "Dada ", "Dados ", "Dadas "],
        when: &["* ", "Quando "],
        then: &["* ", "Então ", "Entao "],
        and: &["* ", "E "],
        but: &["* ", "Mas "],
    },
    Dialect {
        code: "ru",
        aliases: &["ru-ru"],
        name: "Russian",
        given: &["* ", "Допустим ", "Дано ", "Пусть "],
        when: &["* ", "Когда ", "Если "],
        then: &["* ", "То ", "Затем ", "Тогда "],
        and: &["* ", "И ", "К тому же ", "Также "],
        but: &["* ", "Но ", "А ", "Иначе "],
    },
    Dialect {
        code: "zh-CN",
        aliases: &["zh", "zh-hans"],
        name: "Chinese simplified",
        given: &["* ", "假如", "假设", "假定"],
        when: &["* ", "当"],
        then: &["* ", "那么"],
        and: &["* ", "而且", "并且", "同时"],
        but: &["* ", "但是"],
    },
    Dialect {
        code: "zh-TW",
        aliases: &["zh-hant"],
        name: "Chinese traditional",
        given: &["* ", "假如", "假設", "假定"],
        when: &["* ", "當"],
        then: &["* ", "那麼"],
        and: &["* ", "而且", "並且", "同時"],
        but: &["* ", "但是"],
    },
];

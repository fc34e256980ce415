// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for parsing [Gherkin] files.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod basic;
mod document;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_more::with_trait::{Display, Error as StdError, From};

use crate::feature::Feature;

#[doc(inline)]
pub use self::basic::Basic;

/// Source of parsed [`Feature`]s.
pub trait Parser<I> {
    /// Output [`Iterator`] of parsed [`Feature`]s.
    type Output: Iterator<Item = Result<Feature>>;

    /// Parses the given `input` into an [`Iterator`] of [`Feature`]s.
    fn parse(self, input: I) -> Self::Output;
}

/// Result of parsing [Gherkin] files.
///
/// [Gherkin]: https://cucumber.io/docs/gherkin/reference
pub type Result<T> = std::result::Result<T, Error>;

/// [`Parser`] error.
#[derive(Clone, Debug, Display, StdError, From)]
pub enum Error {
    /// Failed to parse a [`Feature`].
    #[display("Failed to parse feature: {_0}")]
    Parsing(ParseError),

    /// Failed to read a `.feature` file.
    #[display("Failed to read `{}`: {source}", path.display())]
    #[from(ignore)]
    Io {
        /// Path of the file.
        path: PathBuf,

        /// Underlying I/O error.
        source: Arc<io::Error>,
    },
}

/// Document violating the keyword grammar.
#[derive(Clone, Debug, Eq, StdError, PartialEq)]
pub struct ParseError {
    /// Path of the `.feature` file, if parsed from one.
    pub path: Option<PathBuf>,

    /// 1-based line the violation was detected at.
    pub line: usize,

    /// What exactly is wrong.
    pub reason: Reason,
}

impl ParseError {
    pub(crate) fn new(path: Option<&Path>, line: usize, reason: Reason) -> Self {
        Self { path: path.map(Path::to_path_buf), line, reason }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}: ", path.display(), self.line)?,
            None => write!(f, "line {}: ", self.line)?,
        }
        write!(f, "{}", self.reason)
    }
}

/// Kind of a [`ParseError`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Reason {
    /// Language code not supported by [`gherkin`].
    #[display("unknown language `{_0}`")]
    UnknownLanguage(String),

    /// Document not matching the [Gherkin] grammar.
    ///
    /// [Gherkin]: https://cucumber.io/docs/gherkin/reference
    #[display("unexpected input, expected one of {_0}")]
    Syntax(String),

    /// Step not belonging to any `Scenario` or `Background`.
    #[display("step `{_0}` appears outside any `Scenario` or `Background`")]
    StepOutsideBlock(String),

    /// Table row of a different width than its header.
    #[display("table row has {found} cells, but its header has {expected}")]
    TableColumnMismatch {
        /// Number of cells in the header.
        expected: usize,

        /// Number of cells in the row.
        found: usize,
    },
}

/// Parses the given `text` into a [`Feature`].
///
/// An explicit `language` code overrides a `# language: <code>` directive of
/// the document, while the absence of both means English.
///
/// # Errors
///
/// If the `text` violates the keyword grammar.
///
/// # Example
///
/// ```rust
/// let feature = eucalyptus::parser::parse(
///     "Feature: Eating\n\
///      \x20 Scenario: eat 5 out of 12\n\
///      \x20   Given there are 12 cucumbers\n",
///     None,
/// )
/// .unwrap();
///
/// assert_eq!(feature.name, "Eating");
/// assert_eq!(feature.scenarios[0].steps[0].text, "there are 12 cucumbers");
/// ```
pub fn parse(
    text: &str,
    language: Option<&str>,
) -> std::result::Result<Feature, ParseError> {
    document::parse(text, language, None)
}

/// Reads and parses the `.feature` file at the given `path`.
///
/// # Errors
///
/// If the file cannot be read, or its content violates the keyword grammar.
pub fn parse_path(path: impl AsRef<Path>, language: Option<&str>) -> Result<Feature> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: Arc::new(e),
    })?;
    tracing::debug!(path = %path.display(), "parsing feature file");
    Ok(document::parse(&text, language, Some(path))?)
}

#[cfg(test)]
mod tests {
    use crate::dialect::StepKind;

    use super::*;

    const FEATURE: &str = r#"
@ichi
Feature: Adding numbers
  In order to avoid silly mistakes
  As a math idiot
  I want to be told the sum of two numbers

  Background:
    Given I have a calculator

  @ni
  Scenario: Add two numbers
    Given I have entered 50 into the calculator
    And I have entered 70 into the calculator
    When I press add
    Then the result should be 120 on the screen

  @san @ichi
  Scenario Outline: Add many numbers
    Given I have entered <a> into the calculator
    And I have entered <b> into the calculator
    When I press add
    Then the result should be <sum> on the screen

    Examples:
      | a  | b  | sum |
      | 1  | 2  | 3   |
      | 10 | 20 | 30  |
"#;

    #[test]
    fn parses_whole_feature() {
        let feature = parse(FEATURE, None).unwrap();

        assert_eq!(feature.keyword, "Feature");
        assert_eq!(feature.name, "Adding numbers");
        assert_eq!(
            feature.description,
            "In order to avoid silly mistakes\n\
             As a math idiot\n\
             I want to be told the sum of two numbers",
        );
        assert_eq!(feature.language, "en");
        assert_eq!(feature.tags, ["ichi"]);
        assert_eq!(feature.line, 3);

        let background = feature.background.as_ref().unwrap();
        assert_eq!(background.steps.len(), 1);
        assert_eq!(background.steps[0].text, "I have a calculator");

        assert_eq!(feature.scenarios.len(), 2);
        let first = &feature.scenarios[0];
        assert_eq!(first.name, "Add two numbers");
        assert_eq!(first.tags, ["ichi", "ni"]);
        assert_eq!(first.index, 1);
        assert!(!first.is_template());
        assert_eq!(first.steps[1].kind, StepKind::And);
        assert_eq!(first.steps[1].keyword, "And ");
        assert_eq!(first.steps[3].line, 16);

        let outline = &feature.scenarios[1];
        assert_eq!(outline.tags, ["ichi", "san"]);
        assert_eq!(outline.index, 2);
        assert_eq!(outline.steps[0].text, "I have entered <a> into the calculator");
        let rows = outline.outlines.as_ref().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].values.get("sum").map(String::as_str), Some("30"));
        assert_eq!(rows[1].line, 28);
    }

    #[test]
    fn parses_step_tables_and_docstrings() {
        let feature = parse(
            r#"Feature: Tables
  Scenario: Table and doc string
    Given the following users:
      | name             | age |
      | Gabriel \| Falcão | 22 |
    Then the output is:
      """
      first line
        indented line
      """
"#,
            None,
        )
        .unwrap();

        let steps = &feature.scenarios[0].steps;
        let table = steps[0].table.as_ref().unwrap();
        assert_eq!(table.header().unwrap(), ["name", "age"]);
        assert_eq!(table.hashes()[0].get("name").unwrap(), "Gabriel | Falcão");
        assert_eq!(table.line(1), Some(5));
        assert_eq!(
            steps[1].docstring.as_deref(),
            Some("first line\n  indented line"),
        );
    }

    #[test]
    fn scenario_description_is_collected() {
        let feature = parse(
            "Feature: f\n\
             \x20 Scenario: s\n\
             \x20   Some notes about it.\n\
             \x20   Given a step\n",
            None,
        )
        .unwrap();

        assert_eq!(feature.scenarios[0].description, "Some notes about it.");
        assert_eq!(feature.scenarios[0].steps.len(), 1);
    }

    #[test]
    fn language_directive_selects_dialect() {
        let feature = parse(
            "# language: fr\n\
             Fonctionnalité: Addition\n\
             \x20 Scénario: Ajouter\n\
             \x20   Soit je tape 2\n\
             \x20   Et que je presse add\n",
            None,
        )
        .unwrap();

        assert_eq!(feature.language, "fr");
        assert_eq!(feature.keyword, "Fonctionnalité");
        let steps = &feature.scenarios[0].steps;
        assert_eq!(steps[0].kind, StepKind::Given);
        assert_eq!(steps[1].keyword, "Et que ");
        assert_eq!(steps[1].text, "je presse add");
    }

    #[test]
    fn explicit_language_overrides_directive() {
        let text = "# language: fr\nFeature: Addition\n";

        let feature = parse(text, Some("en")).unwrap();
        assert_eq!(feature.language, "en");
        assert_eq!(feature.name, "Addition");

        let err = parse(text, None).unwrap_err();
        assert!(matches!(err.reason, Reason::Syntax(_)), "{err}");
    }

    #[test]
    fn unknown_language_is_rejected() {
        let err = parse("# language: tlh\nFeature: f\n", None).unwrap_err();

        assert_eq!(err.line, 1);
        assert_eq!(err.reason, Reason::UnknownLanguage("tlh".into()));
        assert_eq!(err.to_string(), "line 1: unknown language `tlh`");

        let err = parse("Feature: f\n", Some("tlh")).unwrap_err();
        assert_eq!(err.reason, Reason::UnknownLanguage("tlh".into()));
    }

    #[test]
    fn step_before_scenario_is_rejected() {
        let err = parse(
            "Feature: f\n\
             \x20 Given a step\n",
            None,
        )
        .unwrap_err();

        assert_eq!(err.line, 2);
        assert_eq!(err.reason, Reason::StepOutsideBlock("Given a step".into()));
    }

    #[test]
    fn table_width_mismatch_is_rejected() {
        let err = parse(
            "Feature: f\n\
             \x20 Scenario: s\n\
             \x20   Given users:\n\
             \x20     | name | age |\n\
             \x20     | John |\n",
            None,
        )
        .unwrap_err();

        assert_eq!(err.line, 5);
        assert_eq!(
            err.reason,
            Reason::TableColumnMismatch { expected: 2, found: 1 },
        );
    }

    #[test]
    fn examples_width_mismatch_is_rejected() {
        let err = parse(
            "Feature: f\n\
             \x20 Scenario Outline: s\n\
             \x20   Given <a>\n\
             \x20   Examples:\n\
             \x20     | a |\n\
             \x20     | 1 | 2 |\n",
            None,
        )
        .unwrap_err();

        assert_eq!(err.line, 6);
        assert_eq!(
            err.reason,
            Reason::TableColumnMismatch { expected: 1, found: 2 },
        );
    }

    #[test]
    fn grammar_violations_are_reported() {
        for text in [
            "",
            "Scenario: s\n",
            "Feature: f\n  Scenario: s\n    Given x\n    \"\"\"\n",
        ] {
            let err = parse(text, None).unwrap_err();
            assert!(matches!(err.reason, Reason::Syntax(_)), "for {text:?}");
            assert!(err.line >= 1, "for {text:?}");
        }
    }

    #[test]
    fn examples_tables_are_combined() {
        let feature = parse(
            "Feature: f\n\
             \x20 Scenario Outline: o\n\
             \x20   Given <a>\n\
             \x20   Examples: first\n\
             \x20     | a |\n\
             \x20     | 1 |\n\
             \x20   Examples: second\n\
             \x20     | a |\n\
             \x20     | 2 |\n",
            None,
        )
        .unwrap();

        let rows = feature.scenarios[0].outlines.as_ref().unwrap();
        assert_eq!(
            rows.iter()
                .map(|r| (r.values["a"].as_str(), r.line))
                .collect::<Vec<_>>(),
            [("1", 6), ("2", 9)],
        );
    }

    #[test]
    fn rules_are_flattened() {
        let feature = parse(
            "@slow\n\
             Feature: f\n\
             \x20 Scenario: plain\n\
             \x20   Given z\n\
             \n\
             \x20 @fast\n\
             \x20 Rule: r\n\
             \x20   Background:\n\
             \x20     Given a\n\
             \x20   Scenario: ruled\n\
             \x20     Given b\n",
            None,
        )
        .unwrap();

        assert_eq!(feature.scenarios.len(), 2);
        let ruled = &feature.scenarios[1];
        assert_eq!(ruled.name, "ruled");
        assert_eq!(ruled.index, 2);
        assert_eq!(ruled.tags, ["slow", "fast"]);
        assert_eq!(
            ruled.steps.iter().map(|s| s.text.as_str()).collect::<Vec<_>>(),
            ["a", "b"],
        );
        assert_eq!(ruled.steps[1].line, 11);
    }

    #[test]
    fn parse_path_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.feature");
        fs::write(&path, "Feature: f\n  Given oops\n").unwrap();

        let Err(Error::Parsing(err)) = parse_path(&path, None) else {
            panic!("expected parsing error");
        };
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.to_string().starts_with(&format!("{}:2: ", path.display())));

        assert!(matches!(
            parse_path(dir.path().join("missing.feature"), None),
            Err(Error::Io { .. }),
        ));
    }
}

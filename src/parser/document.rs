// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Conversion of [`gherkin::Feature`]s into [`Feature`]s.
//!
//! [`gherkin`] owns the keyword grammar. This module resolves the document
//! language, validates table widths, unescapes `\|` inside table cells and
//! numbers the scenario blocks.

use std::{collections::BTreeMap, path::Path};

use itertools::Itertools as _;
use lazy_regex::regex;

use crate::{
    dialect::{Dialect, StepKind, DEFAULT_LANGUAGE},
    feature::{Background, Feature, Outline, Scenario, Step},
    table::{self, Table},
};

use super::{ParseError, Reason};

/// Stands in for an escaped `\|` while [`gherkin`] splits table rows.
const HIDDEN_PIPE: char = '\u{E000}';

/// Delimiters opening and closing a doc string.
const DOCSTRING_DELIMITERS: [&str; 2] = [r#"""""#, "```"];

/// Parses the given `text` into a [`Feature`].
pub(super) fn parse(
    text: &str,
    language: Option<&str>,
    path: Option<&Path>,
) -> Result<Feature, ParseError> {
    let source = Source::new(text, path);
    let (language, directive) = source.language(language)?;
    let tables = source.tables()?;

    let env = gherkin::GherkinEnv::new(&language).map_err(|_| {
        source.error(
            directive.unwrap_or(1),
            Reason::UnknownLanguage(language.clone()),
        )
    })?;
    let parsed = gherkin::Feature::parse(source.prepare(directive), env)
        .map_err(|e| source.syntax_error(&e))?;

    Converter {
        source: &source,
        tables,
        dialect: Dialect::get(&language),
        language,
    }
    .feature(parsed)
}

/// Raw lines of a document.
#[derive(Debug)]
struct Source<'t> {
    lines: Vec<&'t str>,

    /// Whether the line at the same index is a table row.
    rows: Vec<bool>,

    path: Option<&'t Path>,
}

impl<'t> Source<'t> {
    fn new(text: &'t str, path: Option<&'t Path>) -> Self {
        let lines = text.lines().collect::<Vec<_>>();

        let mut rows = Vec::with_capacity(lines.len());
        let mut docstring = None;
        for line in &lines {
            let line = line.trim();
            if let Some(delimiter) = docstring {
                if line.starts_with(delimiter) {
                    docstring = None;
                }
                rows.push(false);
                continue;
            }
            docstring =
                DOCSTRING_DELIMITERS.into_iter().find(|d| line.starts_with(*d));
            rows.push(docstring.is_none() && line.starts_with('|'));
        }

        Self { lines, rows, path }
    }

    fn error(&self, line: usize, reason: Reason) -> ParseError {
        ParseError::new(self.path, line, reason)
    }

    /// Maps a [`gherkin::ParseError`] onto the line it points at.
    fn syntax_error(&self, err: &gherkin::ParseError) -> ParseError {
        let message = err.to_string();
        let (line, expected) = regex!(r"^Error at (\d+):\d+: (.*)$")
            .captures(&message)
            .and_then(|c| {
                let line = c.get(1)?.as_str().parse().ok()?;
                Some((line, c.get(2)?.as_str().to_owned()))
            })
            .unwrap_or_else(|| (1, message.clone()));
        self.error(line, Reason::Syntax(expected))
    }

    /// Resolves the language code of this document, along with the line of
    /// its `# language: <code>` directive, if any.
    ///
    /// An `explicit` code overrides the directive, which is only recognized
    /// among the comments preceding any other content.
    fn language(
        &self,
        explicit: Option<&str>,
    ) -> Result<(String, Option<usize>), ParseError> {
        let directive = self
            .lines
            .iter()
            .enumerate()
            .map(|(n, l)| (n + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .take_while(|(_, l)| l.starts_with('#'))
            .find_map(|(n, l)| {
                let code = regex!(r"^#\s*language\s*:\s*(\S+)\s*$")
                    .captures(l)?
                    .get(1)?
                    .as_str();
                Some((n, code))
            });

        let (line, code) = match (explicit, directive) {
            (Some(code), _) => (1, code),
            (None, Some(found)) => found,
            (None, None) => (1, DEFAULT_LANGUAGE),
        };
        let code = Dialect::get(code)
            .map_or_else(|| code.trim().to_owned(), |d| d.code.to_owned());
        if !gherkin::is_language_supported(&code) {
            return Err(self.error(line, Reason::UnknownLanguage(code)));
        }
        Ok((code, directive.map(|(n, _)| n)))
    }

    /// Collects every table of this document, keyed by the line of its first
    /// row.
    ///
    /// Blank and comment lines don't interrupt a table.
    fn tables(&self) -> Result<BTreeMap<usize, Table>, ParseError> {
        let mut tables = BTreeMap::new();
        let mut current: Option<(usize, Table)> = None;

        for (n, (line, is_row)) in self.lines.iter().zip(&self.rows).enumerate() {
            let number = n + 1;
            if !is_row {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    if let Some((first, table)) = current.take() {
                        _ = tables.insert(first, table);
                    }
                }
                continue;
            }

            let cells = table::split_row(line).unwrap_or_default();
            let (_, table) =
                current.get_or_insert_with(|| (number, Table::default()));
            if let Some(expected) = table.header().map(<[_]>::len) {
                if expected != cells.len() {
                    return Err(self.error(
                        number,
                        Reason::TableColumnMismatch {
                            expected,
                            found: cells.len(),
                        },
                    ));
                }
            }
            table.push(cells, number);
        }
        if let Some((first, table)) = current {
            _ = tables.insert(first, table);
        }

        Ok(tables)
    }

    /// Prepares the text handed to [`gherkin`]: the language `directive` is
    /// blanked out and escaped pipes of table rows are hidden.
    fn prepare(&self, directive: Option<usize>) -> String {
        self.lines
            .iter()
            .zip(&self.rows)
            .enumerate()
            .map(|(n, (line, is_row))| {
                if directive == Some(n + 1) {
                    "#".to_owned()
                } else if *is_row {
                    hide_escaped_pipes(line)
                } else {
                    (*line).to_owned()
                }
            })
            .join("\n")
    }

    /// Finds the first line satisfying the `predicate`, starting from the
    /// `hint`ed one.
    fn locate(&self, hint: usize, predicate: impl Fn(&str) -> bool) -> usize {
        self.lines
            .iter()
            .enumerate()
            .skip(hint.saturating_sub(1))
            .find(|(_, l)| predicate(l.trim()))
            .map_or(hint, |(n, _)| n + 1)
    }
}

/// Replaces every `\|` of a table row with the [`HIDDEN_PIPE`], leaving `\\`
/// intact.
fn hide_escaped_pipes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('|') => out.push(HIDDEN_PIPE),
            Some(next) => {
                out.push(c);
                out.push(next);
            }
            None => out.push(c),
        }
    }
    out
}

/// Joins the `description` lines of a [`gherkin`] block, trimmed.
fn description(description: Option<&str>) -> String {
    description
        .map(|d| d.lines().map(str::trim).filter(|l| !l.is_empty()).join("\n"))
        .unwrap_or_default()
}

/// Strips the line breaks surrounding a dedented doc string.
fn docstring(doc: &str) -> String {
    doc.strip_prefix('\n').unwrap_or(doc).trim_end().to_owned()
}

/// Merges `own` tags into the `inherited` ones, skipping duplicates.
fn merge_tags(inherited: &[String], own: &[String]) -> Vec<String> {
    inherited.iter().chain(own).unique().cloned().collect()
}

/// Builder of a [`Feature`] out of a [`gherkin::Feature`].
struct Converter<'s> {
    source: &'s Source<'s>,
    tables: BTreeMap<usize, Table>,
    dialect: Option<&'static Dialect>,
    language: String,
}

impl Converter<'_> {
    fn feature(mut self, f: gherkin::Feature) -> Result<Feature, ParseError> {
        let line = self.header_line(f.position.line, &f.keyword, &f.name);
        let description = description(f.description.as_deref());
        self.reject_steps(line, &description)?;

        let background = f.background.map(|b| Background {
            line: self.header_line(b.position.line, &b.keyword, &b.name),
            steps: self.steps(b.steps),
            keyword: b.keyword,
            name: b.name,
        });

        let mut scenarios = Vec::with_capacity(f.scenarios.len());
        for s in f.scenarios {
            let scenario = self.scenario(s, &f.tags, scenarios.len() + 1);
            scenarios.push(scenario);
        }
        // `Rule`s are flattened: their tags are inherited and their
        // `Background` steps lead every one of their scenarios.
        for rule in f.rules {
            let tags = merge_tags(&f.tags, &rule.tags);
            let prelude =
                rule.background.map(|b| self.steps(b.steps)).unwrap_or_default();
            for s in rule.scenarios {
                let mut scenario = self.scenario(s, &tags, scenarios.len() + 1);
                _ = scenario.steps.splice(0..0, prelude.iter().cloned());
                scenarios.push(scenario);
            }
        }

        Ok(Feature {
            keyword: f.keyword,
            name: f.name,
            description,
            language: self.language,
            tags: f.tags,
            background,
            scenarios,
            path: self.source.path.map(Path::to_path_buf),
            line,
        })
    }

    /// Rejects `description` lines of a [`Feature`] spelled as steps, as
    /// they've lost their `Scenario` or `Background` header.
    fn reject_steps(&self, line: usize, description: &str) -> Result<(), ParseError> {
        let Some(dialect) = self.dialect else {
            return Ok(());
        };
        for text in description.lines() {
            let is_step = dialect
                .match_step(text)
                .is_some_and(|m| m.keyword.trim() != "*");
            if is_step {
                return Err(self.source.error(
                    self.source.locate(line, |l| l == text),
                    Reason::StepOutsideBlock(text.to_owned()),
                ));
            }
        }
        Ok(())
    }

    fn scenario(
        &mut self,
        s: gherkin::Scenario,
        inherited: &[String],
        index: usize,
    ) -> Scenario {
        let line = self.header_line(s.position.line, &s.keyword, &s.name);
        let steps = self.steps(s.steps);
        let outlines = (!s.examples.is_empty()).then(|| {
            s.examples
                .iter()
                .filter_map(|e| e.table.as_ref())
                .flat_map(|t| self.outlines(t.position.line))
                .collect()
        });

        Scenario {
            keyword: s.keyword,
            name: s.name,
            description: description(s.description.as_deref()),
            tags: merge_tags(inherited, &s.tags),
            steps,
            outlines,
            example: None,
            index,
            sequence: None,
            line,
        }
    }

    /// Turns the rows of the `Examples` table found near the `hint`ed line
    /// into [`Outline`]s.
    fn outlines(&mut self, hint: usize) -> Vec<Outline> {
        let Some(table) = self.take_table(hint) else {
            return Vec::new();
        };
        let header = table.header().unwrap_or_default();
        table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| Outline {
                values: header.iter().cloned().zip(row.iter().cloned()).collect(),
                line: table.line(i + 1).unwrap_or(hint),
            })
            .collect()
    }

    fn steps(&mut self, steps: Vec<gherkin::Step>) -> Vec<Step> {
        steps.into_iter().map(|s| self.step(s)).collect()
    }

    fn step(&mut self, s: gherkin::Step) -> Step {
        let keyword = s.keyword.trim_end();
        let line = self.source.locate(s.position.line, |l| {
            l.starts_with(keyword) && l.contains(s.value.as_str())
        });
        let table = s
            .table
            .as_ref()
            .and_then(|t| self.take_table(t.position.line));

        Step {
            kind: self.kind(&s),
            docstring: s.docstring.as_deref().map(docstring),
            keyword: s.keyword,
            text: s.value,
            table,
            line,
        }
    }

    /// Resolves the [`StepKind`] of a [`gherkin::Step`], recognizing the
    /// conjunctions [`gherkin`] folds into the preceding kind.
    fn kind(&self, s: &gherkin::Step) -> StepKind {
        let line = format!("{}{}", s.keyword, s.value);
        self.dialect
            .and_then(|d| d.match_step(&line))
            .filter(|m| m.keyword == s.keyword)
            .map_or_else(|| s.ty.into(), |m| m.kind)
    }

    fn header_line(&self, hint: usize, keyword: &str, name: &str) -> usize {
        self.source
            .locate(hint, |l| l.starts_with(keyword) && l.contains(name))
    }

    /// Takes the first unclaimed table starting at or after the `hint`ed
    /// line.
    fn take_table(&mut self, hint: usize) -> Option<Table> {
        let first = *self.tables.range(hint..).next()?.0;
        self.tables.remove(&first).map(|mut table| {
            for cell in table.cells_mut() {
                if cell.contains(HIDDEN_PIPE) {
                    *cell = cell.replace(HIDDEN_PIPE, "|");
                }
            }
            table
        })
    }
}

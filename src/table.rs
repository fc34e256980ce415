// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Data tables attached to [`Step`]s.
//!
//! [`Step`]: crate::feature::Step

use std::{iter, mem};

use itertools::Itertools as _;
use linked_hash_map::LinkedHashMap;

/// Ordered mapping of a table header cell to a row cell.
pub type Row = LinkedHashMap<String, String>;

/// A data table of a [`Step`].
///
/// The first row is treated as the header by [`Table::hashes()`]. Column
/// widths of the source document are cosmetic and not preserved.
///
/// # Example
///
/// ```rust
/// use eucalyptus::table::Table;
///
/// let table = Table::new(vec![
///     vec!["name".into(), "age".into()],
///     vec!["Alice".into(), "30".into()],
/// ]);
///
/// let hashes = table.hashes();
/// assert_eq!(hashes[0].get("name").map(String::as_str), Some("Alice"));
/// ```
///
/// [`Step`]: crate::feature::Step
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    /// Rows of cells, the header included.
    rows: Vec<Vec<String>>,

    /// 1-based source line of every row, if known.
    lines: Vec<usize>,
}

impl Table {
    /// Creates a new [`Table`] out of the given `rows`, the header included.
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { lines: vec![0; rows.len()], rows }
    }

    /// Appends a `row` read from the given source `line`.
    pub(crate) fn push(&mut self, row: Vec<String>, line: usize) {
        self.rows.push(row);
        self.lines.push(line);
    }

    /// Returns all the rows, the header included.
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the header row, if any.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Returns the rows following the header.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Returns the number of columns, as defined by the header.
    #[must_use]
    pub fn width(&self) -> usize {
        self.header().map_or(0, <[_]>::len)
    }

    /// Returns the 1-based source line of the row at `index` (header being
    /// `0`), if known.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied().filter(|l| *l > 0)
    }

    /// Indicates whether this [`Table`] has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts the rows following the header into ordered
    /// header-to-cell mappings.
    #[must_use]
    pub fn hashes(&self) -> Vec<Row> {
        let Some(header) = self.header() else {
            return Vec::new();
        };
        self.rows()
            .iter()
            .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Iterates mutably over every cell, the header included.
    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.rows.iter_mut().flatten()
    }

    /// Renders this [`Table`] back into aligned `|`-delimited lines.
    ///
    /// Literal pipes are escaped as `\|`, and columns are padded up to the
    /// terminal display width of their widest cell, so wide characters take
    /// two columns.
    #[must_use]
    pub fn represent(&self) -> String {
        represent(&self.rows)
    }
}

impl From<Vec<Vec<&str>>> for Table {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_owned).collect())
                .collect(),
        )
    }
}

/// Renders the given `rows` into aligned `|`-delimited lines.
///
/// See [`Table::represent()`] for details.
#[must_use]
pub fn represent<R, C>(rows: &[R]) -> String
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let escaped = rows
        .iter()
        .map(|r| r.as_ref().iter().map(|c| escape(c.as_ref())).collect_vec())
        .collect_vec();

    let columns = escaped.iter().map(Vec::len).max().unwrap_or_default();
    let widths = (0..columns)
        .map(|col| {
            escaped
                .iter()
                .filter_map(|r| r.get(col))
                .map(|c| console::measure_text_width(c))
                .max()
                .unwrap_or_default()
        })
        .collect_vec();

    escaped
        .iter()
        .map(|row| {
            let cells = widths.iter().enumerate().map(|(col, width)| {
                let cell = row.get(col).map_or("", String::as_str);
                let pad = width.saturating_sub(console::measure_text_width(cell));
                format!("{cell}{}", " ".repeat(pad))
            });
            iter::once("|".to_owned())
                .chain(cells.map(|c| format!(" {c} |")))
                .collect::<String>()
        })
        .join("\n")
}

/// Escapes a cell value for rendering inside a table row.
fn escape(cell: &str) -> String {
    cell.replace('\\', "\\\\").replace('|', "\\|").replace('\n', "\\n")
}

/// Splits a trimmed table `line` into unescaped, trimmed cells.
///
/// Returns [`None`] if the `line` doesn't start with a `|`. A missing
/// trailing `|` is tolerated.
#[must_use]
pub fn split_row(line: &str) -> Option<Vec<String>> {
    let line = line.trim().strip_prefix('|')?;

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some('n') => cell.push('\n'),
                Some('\\') => cell.push('\\'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => cells.push(mem::take(&mut cell).trim().to_owned()),
            c => cell.push(c),
        }
    }
    if !cell.trim().is_empty() {
        cells.push(cell.trim().to_owned());
    }

    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_cells() {
        assert_eq!(
            split_row("| name | age |"),
            Some(vec!["name".to_owned(), "age".to_owned()]),
        );
        assert_eq!(
            split_row("|a|  |c|"),
            Some(vec!["a".to_owned(), String::new(), "c".to_owned()]),
        );
        assert_eq!(split_row("name | age"), None);
    }

    #[test]
    fn splits_escaped_pipes() {
        assert_eq!(
            split_row(r"| Gabriel \| Falcão | 22 |"),
            Some(vec!["Gabriel | Falcão".to_owned(), "22".to_owned()]),
        );
        assert_eq!(
            split_row(r"| back\\slash | x |"),
            Some(vec![r"back\slash".to_owned(), "x".to_owned()]),
        );
    }

    #[test]
    fn tolerates_missing_trailing_pipe() {
        assert_eq!(
            split_row("| a | b"),
            Some(vec!["a".to_owned(), "b".to_owned()]),
        );
    }

    #[test]
    fn hashes_keep_column_order() {
        let table = Table::from(vec![
            vec!["Nom", "Durée"],
            vec!["Science de l'Informatique", "5 ans"],
            vec!["Nutrition", "4 ans"],
        ]);

        let hashes = table.hashes();
        assert_eq!(hashes.len(), 2);
        assert_eq!(
            hashes[1].iter().collect_vec(),
            vec![
                (&"Nom".to_owned(), &"Nutrition".to_owned()),
                (&"Durée".to_owned(), &"4 ans".to_owned()),
            ],
        );
        assert_eq!(table.width(), 2);
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn empty_table_has_no_hashes() {
        let table = Table::default();
        assert!(table.hashes().is_empty());
        assert!(table.rows().is_empty());
        assert_eq!(table.header(), None);
    }

    #[test]
    fn represents_aligned_table() {
        let table = Table::from(vec![
            vec!["name", "age"],
            vec!["Gabriel Falcão", "22"],
            vec!["Miguel", "19"],
        ]);

        assert_eq!(
            table.represent(),
            "| name           | age |\n\
             | Gabriel Falcão | 22  |\n\
             | Miguel         | 19  |",
        );
    }

    #[test]
    fn represent_escapes_pipes_and_allows_empty() {
        let table = Table::from(vec![
            vec!["name", "age"],
            vec!["Gabriel | Falcão", "22"],
            vec!["Miguel | Arcanjo", ""],
        ]);

        assert_eq!(
            table.represent(),
            [
                r"| name              | age |",
                r"| Gabriel \| Falcão | 22  |",
                r"| Miguel \| Arcanjo |     |",
            ]
            .join("\n"),
        );
    }

    #[test]
    fn represent_counts_wide_characters_twice() {
        let table = Table::from(vec![vec!["あいうえお"], vec!["x"]]);

        assert_eq!(table.represent(), "| あいうえお |\n| x          |");
    }
}

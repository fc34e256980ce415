// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Filtering of the [`Scenario`]s to run.

use std::{collections::BTreeSet, fmt, str::FromStr};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;
use regex::Regex;

use crate::{feature::Scenario, tag::TagExpression};

/// Malformed [`IndexSelection`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum IndexSelectionError {
    /// No index given at all.
    #[display("no scenario index given")]
    Empty,

    /// Item that isn't a positive integer.
    #[display("invalid scenario index `{_0}`, expected a positive integer")]
    Invalid(#[error(not(source))] String),
}

/// Set of 1-based [`Scenario`] indices, written as `1,2,5`.
///
/// Every concrete [`Scenario`] expanded from an outline shares the index of
/// its template, so selecting that index runs all its rows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexSelection(BTreeSet<usize>);

impl IndexSelection {
    /// Indicates whether the given `index` is selected.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// Iterates over the selected indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for IndexSelection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for IndexSelection {
    type Err = IndexSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let indices = s
            .split(',')
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(|i| match i.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(IndexSelectionError::Invalid(i.to_owned())),
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        if indices.is_empty() {
            return Err(IndexSelectionError::Empty);
        }
        Ok(Self(indices))
    }
}

impl fmt::Display for IndexSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}

/// Filters deciding which [`Scenario`]s run.
///
/// A [`Scenario`] runs only when it passes every filter given. Without any
/// filter, everything runs.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    /// [`TagExpression`] over the [`Scenario`]'s tags.
    pub tags: Option<TagExpression>,

    /// [`Scenario`] indices inside their [`Feature`].
    ///
    /// [`Feature`]: crate::feature::Feature
    pub indices: Option<IndexSelection>,

    /// [`Regex`] the [`Scenario`]'s name has to match.
    pub name: Option<Regex>,
}

impl Selection {
    /// Creates a [`Selection`] letting everything run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters [`Scenario`]s by the given [`TagExpression`].
    #[must_use]
    pub fn tags(mut self, tags: TagExpression) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Filters [`Scenario`]s by their index.
    #[must_use]
    pub fn indices(mut self, indices: IndexSelection) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Filters [`Scenario`]s by their name.
    #[must_use]
    pub fn name(mut self, name: Regex) -> Self {
        self.name = Some(name);
        self
    }

    /// Indicates whether the given [`Scenario`] is selected.
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        self.tags.as_ref().map_or(true, |t| t.eval(&scenario.tags))
            && self
                .indices
                .as_ref()
                .map_or(true, |i| i.contains(scenario.index))
            && self.name.as_ref().map_or(true, |n| n.is_match(&scenario.name))
    }
}

#[cfg(test)]
mod tests {
    use crate::{outline, parser};

    use super::*;

    const FEATURE: &str = "\
@hana
Feature: Selection

  Scenario: First
    Given a step

  @dul
  Scenario: Second
    Given a step

  Scenario Outline: Third
    Given a <n> step

    Examples:
      | n |
      | 1 |
      | 2 |
";

    fn selected(selection: &Selection) -> Vec<(usize, Option<usize>)> {
        let feature = parser::parse(FEATURE, None).unwrap();
        outline::expand_feature(&feature)
            .into_iter()
            .map(Result::unwrap)
            .filter(|s| selection.matches(s))
            .map(|s| (s.index, s.sequence))
            .collect()
    }

    #[test]
    fn parses_indices() {
        let indices = "1, 3,,2".parse::<IndexSelection>().unwrap();

        assert_eq!(indices.iter().collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(indices.to_string(), "1,2,3");
        assert_eq!("".parse::<IndexSelection>(), Err(IndexSelectionError::Empty));
        assert_eq!(
            "1,x".parse::<IndexSelection>(),
            Err(IndexSelectionError::Invalid("x".into())),
        );
        assert_eq!(
            "0".parse::<IndexSelection>(),
            Err(IndexSelectionError::Invalid("0".into())),
        );
    }

    #[test]
    fn selects_everything_by_default() {
        assert_eq!(selected(&Selection::new()).len(), 4);
    }

    #[test]
    fn outline_index_selects_all_rows() {
        let selection = Selection::new().indices("3".parse().unwrap());

        assert_eq!(selected(&selection), [(3, Some(3)), (3, Some(4))]);
    }

    #[test]
    fn filters_combine() {
        let selection = Selection::new()
            .tags("hana and not dul".parse().unwrap())
            .indices("1,2".parse().unwrap());
        assert_eq!(selected(&selection), [(1, Some(1))]);

        let selection = Selection::new().name(Regex::new("^Th").unwrap());
        assert_eq!(selected(&selection).len(), 2);
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Command line options selecting and rendering a run.
//!
//! [`Opts`] may be used standalone via [`Opts::parsed()`], or flattened into
//! a bigger CLI as [`clap::Args`].

use regex::Regex;

use crate::{
    runner::{Config, IndexSelection, Selection},
    tag::TagExpression,
    writer::Coloring,
};

pub use clap::{Args, Parser};

/// Root CLI of a run.
///
/// # Example
///
/// ```rust
/// use eucalyptus::cli::{Opts, Parser as _};
///
/// let opts = Opts::try_parse_from([
///     "eucalyptus",
///     "--tags", "hana and not dul",
///     "--scenario-indices", "1,2",
/// ])
/// .unwrap();
///
/// let selection = opts.selection();
/// assert!(selection.tags.is_some());
/// assert_eq!(selection.indices.unwrap().to_string(), "1,2");
/// ```
#[derive(Clone, Debug, Default, clap::Parser)]
#[command(
    name = "eucalyptus",
    about = "Run Gherkin features against registered steps"
)]
pub struct Opts {
    /// Regex to filter scenarios by their name.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        visible_alias = "scenario-name",
        global = true
    )]
    pub re_filter: Option<Regex>,

    /// Tag expression to filter scenarios by.
    ///
    /// Feature and scenario tags are merged together on filtering.
    #[arg(
        id = "tags",
        long = "tags",
        short = 't',
        value_name = "tagexpr",
        global = true
    )]
    pub tags_filter: Option<TagExpression>,

    /// Comma-separated 1-based indices of the scenarios to run.
    ///
    /// An outline's index runs all its examples.
    #[arg(long = "scenario-indices", value_name = "list", global = true)]
    pub scenario_indices: Option<IndexSelection>,

    /// Language of the feature files, overriding their `# language:`
    /// directives.
    #[arg(long, value_name = "code", global = true)]
    pub language: Option<String>,

    /// Coloring policy for a console output.
    #[arg(
        long,
        value_name = "auto|always|never",
        default_value = "auto",
        global = true
    )]
    pub color: Coloring,
}

impl Opts {
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Returns the [`Selection`] made by these [`Opts`].
    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection {
            tags: self.tags_filter.clone(),
            indices: self.scenario_indices.clone(),
            name: self.re_filter.clone(),
        }
    }

    /// Returns the runner [`Config`] made by these [`Opts`].
    #[must_use]
    pub fn config(&self) -> Config {
        Config { language: self.language.clone(), ..Config::default() }
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Parser`] implementation.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    vec,
};

use smart_default::SmartDefault;

use crate::feature::Feature;

use super::{parse_path, Error, Parser, Result};

/// Default [`Parser`].
///
/// Accepts either a single file, or a directory walked recursively (following
/// symlinks) for files matching its glob pattern, in sorted path order.
#[derive(Clone, Debug, SmartDefault)]
pub struct Basic {
    /// Language overriding `# language:` directives of the documents.
    language: Option<String>,

    /// Glob pattern of the files to pick from a directory.
    #[default("*.feature")]
    glob: String,
}

impl Basic {
    /// Creates a new [`Basic`] [`Parser`] picking `*.feature` files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces every document to be parsed with the given `language`.
    #[must_use]
    pub fn language(mut self, language: Option<impl Into<String>>) -> Self {
        self.language = language.map(Into::into);
        self
    }

    /// Replaces the glob pattern of the files picked from a directory.
    #[must_use]
    pub fn glob(mut self, glob: impl Into<String>) -> Self {
        self.glob = glob.into();
        self
    }

    /// Lists the files to be parsed for the given `path`.
    ///
    /// Entries the directory walk fails on come last, as [`Error::Io`]s.
    fn files(&self, path: &Path) -> Result<Vec<Result<PathBuf>>> {
        let io_err = |path: &Path, e: io::Error| Error::Io {
            path: path.to_path_buf(),
            source: Arc::new(e),
        };

        let path = path.canonicalize().map_err(|e| io_err(path, e))?;
        if path.is_file() {
            return Ok(vec![Ok(path)]);
        }

        let walker = globwalk::GlobWalkerBuilder::new(&path, &self.glob)
            .case_insensitive(true)
            .follow_links(true)
            .build()
            .map_err(|e| {
                io_err(&path, io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
            })?;

        let (mut files, mut failed) = (Vec::new(), Vec::new());
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => {
                    let at = e.path().unwrap_or(path.as_path()).to_path_buf();
                    tracing::debug!(path = %at.display(), "failed to walk");
                    failed.push(io_err(&at, e.into()));
                }
            }
        }
        files.sort();
        Ok(files.into_iter().map(Ok).chain(failed.into_iter().map(Err)).collect())
    }
}

impl<I: AsRef<Path>> Parser<I> for Basic {
    type Output = vec::IntoIter<Result<Feature>>;

    fn parse(self, input: I) -> Self::Output {
        let features = match self.files(input.as_ref()) {
            Ok(files) => files
                .into_iter()
                .map(|f| parse_path(f?, self.language.as_deref()))
                .collect(),
            Err(e) => vec![Err(e)],
        };
        features.into_iter()
    }
}

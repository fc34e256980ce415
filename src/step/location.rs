// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source location of step and hook definitions.

use std::panic;

use derive_more::with_trait::Display;

/// Location of a registered step or hook [`Fn`], captured at registration.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file where the [`Fn`] is registered.
    pub path: &'static str,

    /// Line of the file where the [`Fn`] is registered.
    pub line: u32,

    /// Column of the file where the [`Fn`] is registered.
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`] with the given path, line, and column.
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Returns the [`Location`] of the caller of a `#[track_caller]` chain.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let loc = panic::Location::caller();
        Self::new(loc.file(), loc.line(), loc.column())
    }

    /// Returns the file name of the [`Location::path`].
    #[must_use]
    pub fn filename(&self) -> &'static str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_points_here() {
        let loc = Location::caller();
        assert_eq!(loc.path, file!());
        assert_eq!(loc.line, line!() - 2);
    }

    #[test]
    fn filename_strips_directories() {
        assert_eq!(Location::new("src/step/test.rs", 1, 1).filename(), "test.rs");
        assert_eq!(Location::new(r"src\step\test.rs", 1, 1).filename(), "test.rs");
        assert_eq!(Location::new("test.rs", 1, 1).filename(), "test.rs");
    }

    #[test]
    fn displays_path_line_column() {
        assert_eq!(
            Location::new("src/test.rs", 42, 10).to_string(),
            "src/test.rs:42:10",
        );
    }
}

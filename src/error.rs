// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Consolidated error handling types.

use derive_more::with_trait::{Display, Error as StdError, From};

use crate::{
    parser,
    runner::{IndexSelectionError, RunError},
    step::PatternError,
    tag::TagExpressionError,
};

/// Top-level error of the outer API.
///
/// Failures of single steps never surface here: they fail their own
/// [`Scenario`] only, and are reported in its [`ScenarioReport`].
///
/// [`Scenario`]: crate::feature::Scenario
/// [`ScenarioReport`]: crate::report::ScenarioReport
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// `.feature` file that can't be read or parsed.
    #[display("{_0}")]
    Parse(parser::Error),

    /// Malformed tag expression.
    #[display("Invalid tag expression: {_0}")]
    Tag(TagExpressionError),

    /// Malformed scenario index list.
    #[display("Invalid scenario indices: {_0}")]
    Index(IndexSelectionError),

    /// Invalid step pattern.
    #[display("{_0}")]
    Pattern(PatternError),

    /// Aborted run.
    #[display("Run aborted: {_0}")]
    Run(RunError),
}

impl From<parser::ParseError> for Error {
    fn from(err: parser::ParseError) -> Self {
        Self::Parse(err.into())
    }
}

/// Alias for a [`Result`] with the error type [`Error`].
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use crate::tag::TagExpression;

    use super::*;

    #[test]
    fn wraps_component_errors() {
        let err = "hana and".parse::<TagExpression>().unwrap_err();
        assert!(Error::from(err)
            .to_string()
            .starts_with("Invalid tag expression: "));

        let err = Error::from(
            parser::parse("Feature: f\n  Given a step\n", None).unwrap_err(),
        );
        assert!(matches!(err, Error::Parse(parser::Error::Parsing(_))));
        assert!(err
            .to_string()
            .starts_with("Failed to parse feature: line 2: step `Given a step`"));
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of matching and running steps.

use derive_more::with_trait::{Display, Error as StdError};

use super::Location;

/// Failure of a single step.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// No registered pattern matches the step text.
    #[display("The step r\"{sentence}\" is not defined")]
    NoDefinitionFound {
        /// Step keyword followed by its text, exactly as written.
        sentence: String,
    },

    /// Outline step referencing a placeholder its `Examples` row lacks.
    #[display(
        "The step r\"{sentence}\" has no `Examples` value for `<{placeholder}>`"
    )]
    MissingPlaceholder {
        /// Step keyword followed by its text, placeholders left verbatim.
        sentence: String,

        /// Placeholder name, without angle brackets.
        placeholder: String,
    },

    /// Step delegating, directly or not, to itself.
    #[display("The step r\"{sentence}\" recursively invokes itself ({location})")]
    RecursiveStep {
        /// Step keyword followed by its text, exactly as written.
        sentence: String,

        /// [`Location`] of the re-entered definition.
        location: Location,
    },

    /// Step callback returned an error.
    #[display("{error:#}")]
    Failed {
        /// Step keyword followed by its text, exactly as written.
        sentence: String,

        /// [`Location`] of the matched definition.
        location: Location,

        /// Returned error.
        error: anyhow::Error,
    },

    /// Step callback panicked.
    #[display("{message}")]
    Panicked {
        /// Step keyword followed by its text, exactly as written.
        sentence: String,

        /// [`Location`] of the matched definition.
        location: Location,

        /// Panic message.
        message: String,
    },
}

impl Error {
    /// Returns the sentence of the failed step.
    #[must_use]
    pub fn sentence(&self) -> &str {
        match self {
            Self::NoDefinitionFound { sentence }
            | Self::MissingPlaceholder { sentence, .. }
            | Self::RecursiveStep { sentence, .. }
            | Self::Failed { sentence, .. }
            | Self::Panicked { sentence, .. } => sentence,
        }
    }

    /// Returns the [`Location`] of the matched definition, if any.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        match self {
            Self::NoDefinitionFound { .. }
            | Self::MissingPlaceholder { .. } => None,
            Self::RecursiveStep { location, .. }
            | Self::Failed { location, .. }
            | Self::Panicked { location, .. } => Some(*location),
        }
    }
}

/// Step pattern that isn't a valid regular expression.
#[derive(Clone, Debug, Display, StdError)]
#[display("Invalid step pattern r\"{pattern}\": {source}")]
pub struct PatternError {
    /// Pattern as given.
    pub pattern: String,

    /// Compilation error.
    pub source: regex::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_step_quotes_sentence() {
        let err = Error::NoDefinitionFound { sentence: "当我开曲速引擎".into() };

        assert_eq!(err.to_string(), r#"The step r"当我开曲速引擎" is not defined"#);
        assert_eq!(err.sentence(), "当我开曲速引擎");
        assert_eq!(err.location(), None);
    }

    #[test]
    fn failed_step_shows_error_chain() {
        let err = Error::Failed {
            sentence: "Then it works".into(),
            location: Location::new("steps.rs", 1, 1),
            error: anyhow::anyhow!("inner").context("outer"),
        };

        assert_eq!(err.to_string(), "outer: inner");
        assert_eq!(err.location(), Some(Location::new("steps.rs", 1, 1)));
    }
}

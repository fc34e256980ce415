// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Boolean tag expressions selecting [`Scenario`]s.
//!
//! Grammar, from the loosest binding to the tightest:
//! ```text
//! or   := and ("or" and)*
//! and  := not ("and" not)*
//! not  := "not" not | atom
//! atom := "(" or ")" | tag
//! ```
//! A tag may be written with or without its leading `@`.
//!
//! [`Scenario`]: crate::feature::Scenario

use std::{fmt, iter::Peekable, str::FromStr, vec};

use derive_more::with_trait::{Display, Error};
use lazy_regex::regex;

/// Parsed tag expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TagExpression {
    /// Single tag, being `true` if present in the tag set.
    Tag(String),

    /// Negation.
    Not(Box<TagExpression>),

    /// Conjunction.
    And(Box<TagExpression>, Box<TagExpression>),

    /// Disjunction.
    Or(Box<TagExpression>, Box<TagExpression>),
}

/// Malformed [`TagExpression`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum TagExpressionError {
    /// Token not allowed at its position.
    #[display("unexpected `{token}` in tag expression `{expression}`")]
    UnexpectedToken {
        /// Offending token.
        token: String,

        /// Whole expression.
        expression: String,
    },

    /// Expression missing an operand or a closing parenthesis.
    #[display("tag expression `{expression}` ends unexpectedly")]
    UnexpectedEnd {
        /// Whole expression.
        expression: String,
    },
}

impl TagExpression {
    /// Parses the given `expression`.
    ///
    /// # Errors
    ///
    /// If the `expression` is malformed or empty.
    pub fn parse(expression: &str) -> Result<Self, TagExpressionError> {
        let tokens = regex!(r"[()]|[^\s()]+")
            .find_iter(expression)
            .map(|m| m.as_str())
            .collect::<Vec<_>>();

        let mut parser = Parser { expression, tokens: tokens.into_iter().peekable() };
        let parsed = parser.or()?;
        match parser.tokens.next() {
            None => Ok(parsed),
            Some(token) => Err(parser.unexpected(token)),
        }
    }

    /// Evaluates this [`TagExpression`] for the given `tags`.
    #[must_use]
    pub fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        match self {
            Self::And(l, r) => l.eval(tags.clone()) && r.eval(tags),
            Self::Or(l, r) => l.eval(tags.clone()) || r.eval(tags),
            Self::Not(t) => !t.eval(tags),
            Self::Tag(t) => tags.into_iter().any(|tag| tag.as_ref() == t),
        }
    }
}

/// Evaluates the optional `expression` for the given `tags`.
///
/// The absence of an `expression` selects everything.
///
/// # Errors
///
/// If the `expression` is malformed.
pub fn evaluate<I, S>(expression: Option<&str>, tags: I) -> Result<bool, TagExpressionError>
where
    S: AsRef<str>,
    I: IntoIterator<Item = S> + Clone,
{
    expression.map_or(Ok(true), |e| Ok(TagExpression::parse(e)?.eval(tags)))
}

impl FromStr for TagExpression {
    type Err = TagExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(t) => write!(f, "{t}"),
            Self::Not(e) => match **e {
                Self::And(..) | Self::Or(..) => write!(f, "not ({e})"),
                Self::Tag(_) | Self::Not(_) => write!(f, "not {e}"),
            },
            Self::And(l, r) => {
                for (i, e) in [l, r].into_iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    if matches!(**e, Self::Or(..)) {
                        write!(f, "({e})")?;
                    } else {
                        write!(f, "{e}")?;
                    }
                }
                Ok(())
            }
            Self::Or(l, r) => write!(f, "{l} or {r}"),
        }
    }
}

/// Recursive descent over the tokens of an expression.
struct Parser<'e> {
    expression: &'e str,
    tokens: Peekable<vec::IntoIter<&'e str>>,
}

impl<'e> Parser<'e> {
    fn unexpected(&self, token: &str) -> TagExpressionError {
        TagExpressionError::UnexpectedToken {
            token: token.to_owned(),
            expression: self.expression.to_owned(),
        }
    }

    fn end(&self) -> TagExpressionError {
        TagExpressionError::UnexpectedEnd { expression: self.expression.to_owned() }
    }

    fn or(&mut self) -> Result<TagExpression, TagExpressionError> {
        let mut lhs = self.and()?;
        while self.tokens.next_if_eq(&"or").is_some() {
            lhs = TagExpression::Or(Box::new(lhs), Box::new(self.and()?));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<TagExpression, TagExpressionError> {
        let mut lhs = self.not()?;
        while self.tokens.next_if_eq(&"and").is_some() {
            lhs = TagExpression::And(Box::new(lhs), Box::new(self.not()?));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<TagExpression, TagExpressionError> {
        if self.tokens.next_if_eq(&"not").is_some() {
            return Ok(TagExpression::Not(Box::new(self.not()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<TagExpression, TagExpressionError> {
        let token = self.tokens.next().ok_or_else(|| self.end())?;
        match token {
            "(" => {
                let inner = self.or()?;
                match self.tokens.next() {
                    Some(")") => Ok(inner),
                    Some(other) => Err(self.unexpected(other)),
                    None => Err(self.end()),
                }
            }
            ")" | "and" | "or" | "not" => Err(self.unexpected(token)),
            tag => {
                let name = tag.strip_prefix('@').unwrap_or(tag);
                if name.is_empty() {
                    return Err(self.unexpected(tag));
                }
                Ok(TagExpression::Tag(name.to_owned()))
            }
        }
    }
}

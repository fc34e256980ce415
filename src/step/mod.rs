// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Definitions for a [`Registry`] which is used to store step [`Fn`]s and
//! corresponding [`Regex`] patterns.
//!
//! [`Regex`]: regex::Regex

pub mod context;
pub mod error;
pub mod location;
pub mod registry;

use sealed::sealed;

use crate::World;

#[doc(inline)]
pub use self::{
    context::{CaptureName, Context},
    error::{Error, PatternError},
    location::Location,
    registry::{Match, Registry},
};

/// Alias for a type-erased step [`Fn`].
pub type StepFn = dyn Fn(&mut World, &Context<'_>) -> anyhow::Result<()>;

/// Return value of a step or hook [`Fn`], convertible into its outcome.
#[sealed]
pub trait IntoOutcome {
    /// Converts this value into the outcome of the [`Fn`].
    ///
    /// # Errors
    ///
    /// If this value represents a failure.
    fn into_outcome(self) -> anyhow::Result<()>;
}

#[sealed]
impl IntoOutcome for () {
    fn into_outcome(self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[sealed]
impl<E: Into<anyhow::Error>> IntoOutcome for Result<(), E> {
    fn into_outcome(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

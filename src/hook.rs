// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle hooks run around a whole run, each [`Feature`] and each concrete
//! [`Scenario`].
//!
//! Hooks are layered by [`Priority`]: for any [`Event`] and [`Phase`], all
//! the [`Priority::Library`] hooks run before all the [`Priority::User`]
//! ones, and hooks of the same [`Priority`] run in registration order.

use derive_more::with_trait::{Debug, Display, Error};

use crate::{
    feature::{Feature, Scenario},
    panic_trap,
    report::ScenarioReport,
    step::{IntoOutcome, Location},
    World,
};

/// Scope a hook wraps.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Event {
    /// Whole run, entered once.
    #[display("all")]
    All,

    /// Single [`Feature`], entered once per [`Feature`].
    #[display("feature")]
    Feature,

    /// Single concrete [`Scenario`], entered once per [`Scenario`] and per
    /// expanded [`Outline`] row.
    ///
    /// [`Outline`]: crate::feature::Outline
    #[display("example")]
    Example,
}

/// Side of an [`Event`] scope a hook runs on.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Phase {
    /// Hook runs when the scope is entered.
    #[display("before")]
    Before,

    /// Hook runs when the scope is left, whatever its outcome.
    #[display("after")]
    After,
}

/// Layer a hook belongs to.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Priority {
    /// Hooks of tooling built on top of this crate, surviving
    /// [`Registry::clear()`] of the [`Priority::User`] layer.
    #[display("library")]
    Library,

    /// Hooks of the tested code base.
    #[display("user")]
    User,
}

/// Arguments of a hook [`Fn`].
#[derive(Clone, Copy, Debug)]
pub enum Scope<'a> {
    /// [`Event::All`] scope.
    All,

    /// [`Event::Feature`] scope.
    Feature(&'a Feature),

    /// [`Event::Example`] scope.
    Example {
        /// [`Feature`] of the [`Scenario`].
        feature: &'a Feature,

        /// Concrete [`Scenario`] being run.
        scenario: &'a Scenario,

        /// Outcome of the [`Scenario`], given to [`Phase::After`] hooks only.
        finished: Option<&'a ScenarioReport>,
    },
}

impl Scope<'_> {
    /// Returns the [`Event`] of this [`Scope`].
    #[must_use]
    pub const fn event(&self) -> Event {
        match self {
            Self::All => Event::All,
            Self::Feature(_) => Event::Feature,
            Self::Example { .. } => Event::Example,
        }
    }
}

/// Alias for a type-erased hook [`Fn`].
pub type HookFn = dyn Fn(&mut World, &Scope<'_>) -> anyhow::Result<()>;

/// Failed or panicked hook.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("`{phase} {event}` hook registered at {location} failed: {message}")]
pub struct HookError {
    /// [`Event`] of the hook.
    pub event: Event,

    /// [`Phase`] of the hook.
    pub phase: Phase,

    /// Where the hook was registered.
    pub location: Location,

    /// Error or panic message.
    pub message: String,
}

/// Registered hook.
#[derive(Debug)]
struct Hook {
    event: Event,
    phase: Phase,
    location: Location,
    #[debug(skip)]
    callback: Box<HookFn>,
}

/// Table of lifecycle hooks.
///
/// # Example
///
/// ```rust
/// use eucalyptus::{hook::{self, Event, Scope}, World};
///
/// let mut hooks = hook::Registry::new();
/// hooks.before(Event::All, |world, _| world.set("ready", true));
///
/// let (before, _after) = hooks.before_after(Event::All);
/// let mut world = World::new();
/// before.run(&mut world, &Scope::All).unwrap();
///
/// assert_eq!(world.get::<bool>("ready"), Some(&true));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    /// [`Priority::Library`] layer.
    library: Vec<Hook>,

    /// [`Priority::User`] layer.
    user: Vec<Hook>,
}

impl Registry {
    /// Creates a new empty [`Registry`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook to the given layer.
    #[track_caller]
    pub fn register<F, O>(
        &mut self,
        event: Event,
        phase: Phase,
        priority: Priority,
        hook: F,
    ) -> &mut Self
    where
        F: Fn(&mut World, &Scope<'_>) -> O + 'static,
        O: IntoOutcome,
    {
        let location = Location::caller();
        tracing::debug!(%event, %phase, %priority, %location, "hook registered");

        let hook = Hook {
            event,
            phase,
            location,
            callback: Box::new(move |w: &mut World, s: &Scope<'_>| {
                hook(w, s).into_outcome()
            }),
        };
        match priority {
            Priority::Library => self.library.push(hook),
            Priority::User => self.user.push(hook),
        }
        self
    }

    /// Appends a [`Priority::User`] hook run when entering the `event` scope.
    #[track_caller]
    pub fn before<F, O>(&mut self, event: Event, hook: F) -> &mut Self
    where
        F: Fn(&mut World, &Scope<'_>) -> O + 'static,
        O: IntoOutcome,
    {
        self.register(event, Phase::Before, Priority::User, hook)
    }

    /// Appends a [`Priority::User`] hook run when leaving the `event` scope.
    #[track_caller]
    pub fn after<F, O>(&mut self, event: Event, hook: F) -> &mut Self
    where
        F: Fn(&mut World, &Scope<'_>) -> O + 'static,
        O: IntoOutcome,
    {
        self.register(event, Phase::After, Priority::User, hook)
    }

    /// Removes the hooks of the given layer, or of both if [`None`].
    pub fn clear(&mut self, priority: Option<Priority>) {
        match priority {
            Some(Priority::Library) => self.library.clear(),
            Some(Priority::User) => self.user.clear(),
            None => {
                self.library.clear();
                self.user.clear();
            }
        }
    }

    /// Returns the number of hooks in both layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.library.len() + self.user.len()
    }

    /// Indicates whether both layers are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the hooks of the given `event` and `phase`, in running order.
    #[must_use]
    pub fn chain(&self, event: Event, phase: Phase) -> Chain<'_> {
        Chain {
            event,
            phase,
            hooks: self
                .library
                .iter()
                .chain(&self.user)
                .filter(|h| h.event == event && h.phase == phase)
                .collect(),
        }
    }

    /// Returns the [`Phase::Before`] and [`Phase::After`] [`Chain`]s of the
    /// given `event`.
    #[must_use]
    pub fn before_after(&self, event: Event) -> (Chain<'_>, Chain<'_>) {
        (self.chain(event, Phase::Before), self.chain(event, Phase::After))
    }
}

/// Ordered hooks of a single [`Event`] and [`Phase`].
#[derive(Debug)]
pub struct Chain<'r> {
    event: Event,
    phase: Phase,
    hooks: Vec<&'r Hook>,
}

impl Chain<'_> {
    /// Returns the number of hooks in this [`Chain`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Indicates whether this [`Chain`] has no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs all the hooks in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// If any hook fails or panics.
    pub fn run(&self, world: &mut World, scope: &Scope<'_>) -> Result<(), HookError> {
        if self.hooks.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            event = %self.event,
            phase = %self.phase,
            hooks = self.hooks.len(),
            "running hooks"
        );

        for hook in &self.hooks {
            let message = match panic_trap::trap(|| (hook.callback)(world, scope)) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => format!("{e:#}"),
                Err(panic) => panic,
            };
            return Err(HookError {
                event: self.event,
                phase: self.phase,
                location: hook.location,
                message,
            });
        }
        Ok(())
    }
}

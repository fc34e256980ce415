// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for executing [`Feature`]s.
//!
//! [`Runner`] owns everything a run needs: the step [`Registry`], the hook
//! [`Registry`], the [`World`] and the [`Selection`] of [`Scenario`]s to run.
//! Execution is sequential, one [`Scenario`] at a time, in document order.
//!
//! [`Registry`]: step::Registry
//! [`Scenario`]: crate::feature::Scenario

mod executor;
pub mod selection;

use std::path::Path;

use derive_more::with_trait::{Display, Error};
use smart_default::SmartDefault;

use crate::{
    feature::Feature,
    hook::{self, Event, HookError, Priority, Scope},
    outline,
    parser::{self, Parser as _},
    report::Summary,
    step::{self, Context, IntoOutcome, PatternError},
    World,
};

use self::executor::{Executor, Plan};

#[doc(inline)]
pub use self::selection::{IndexSelection, IndexSelectionError, Selection};

/// Configuration of a [`Runner`].
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Language forced on every parsed document.
    ///
    /// If [`None`], a document's `# language:` directive applies, falling
    /// back to [`DEFAULT_LANGUAGE`].
    ///
    /// [`DEFAULT_LANGUAGE`]: crate::dialect::DEFAULT_LANGUAGE
    pub language: Option<String>,

    /// Glob pattern of the files picked when running a directory.
    #[default("*.feature")]
    pub glob: String,
}

/// Failure aborting a whole run.
#[derive(Debug, Display, Error)]
pub enum RunError {
    /// Hook failed or panicked.
    #[display("{source}")]
    Hook {
        /// Failure of the hook.
        source: HookError,

        /// Outcome of everything run before the abort.
        summary: Summary,
    },
}

impl RunError {
    /// Returns the [`Summary`] of what ran before the abort.
    #[must_use]
    pub const fn summary(&self) -> &Summary {
        match self {
            Self::Hook { summary, .. } => summary,
        }
    }
}

/// Executor of [`Feature`]s.
///
/// # Example
///
/// ```rust
/// use eucalyptus::{parser, Runner};
///
/// let feature = parser::parse(
///     "Feature: Counting\n\
///      \x20 Scenario: twice\n\
///      \x20   Given I count 2\n\
///      \x20   And I count 3\n",
///     None,
/// )
/// .unwrap();
///
/// let mut runner = Runner::new();
/// runner
///     .step(r"I count (\d+)", |world, ctx| {
///         let n = ctx.parse::<u32>(1)?;
///         *world.get_or_insert_with("total", || 0_u32) += n;
///         anyhow::Ok(())
///     })
///     .unwrap();
///
/// let summary = runner.run(&[feature]).unwrap();
/// assert!(summary.passed());
/// assert_eq!(runner.world().get::<u32>("total"), Some(&5));
/// ```
#[derive(Debug, Default)]
pub struct Runner {
    config: Config,
    selection: Selection,
    steps: step::Registry,
    hooks: hook::Registry,
    world: World,
}

impl Runner {
    /// Creates a new [`Runner`] with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the [`Config`] of this [`Runner`].
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Returns the [`Config`] of this [`Runner`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the [`Selection`] of the [`Scenario`]s to run.
    ///
    /// [`Scenario`]: crate::feature::Scenario
    pub fn select(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection;
        self
    }

    /// Returns the current [`Selection`].
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Appends a step definition. See [`step::Registry::register()`].
    ///
    /// # Errors
    ///
    /// If the `pattern` isn't a valid regular expression.
    #[track_caller]
    pub fn step<F, O>(
        &mut self,
        pattern: &str,
        step: F,
    ) -> Result<&mut Self, PatternError>
    where
        F: Fn(&mut World, &Context<'_>) -> O + 'static,
        O: IntoOutcome,
    {
        _ = self.steps.register(pattern, step)?;
        Ok(self)
    }

    /// Appends a [`Priority::User`] hook run when entering `event` scopes.
    #[track_caller]
    pub fn before<F, O>(&mut self, event: Event, hook: F) -> &mut Self
    where
        F: Fn(&mut World, &Scope<'_>) -> O + 'static,
        O: IntoOutcome,
    {
        _ = self.hooks.before(event, hook);
        self
    }

    /// Appends a [`Priority::User`] hook run when leaving `event` scopes.
    #[track_caller]
    pub fn after<F, O>(&mut self, event: Event, hook: F) -> &mut Self
    where
        F: Fn(&mut World, &Scope<'_>) -> O + 'static,
        O: IntoOutcome,
    {
        _ = self.hooks.after(event, hook);
        self
    }

    /// Returns the step [`step::Registry`].
    #[must_use]
    pub const fn steps(&self) -> &step::Registry {
        &self.steps
    }

    /// Returns the step [`step::Registry`] for registering definitions.
    pub fn steps_mut(&mut self) -> &mut step::Registry {
        &mut self.steps
    }

    /// Returns the [`hook::Registry`].
    #[must_use]
    pub const fn hooks(&self) -> &hook::Registry {
        &self.hooks
    }

    /// Returns the [`hook::Registry`] for registering hooks of any
    /// [`Priority`].
    pub fn hooks_mut(&mut self) -> &mut hook::Registry {
        &mut self.hooks
    }

    /// Returns the [`World`] as left by the last run.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Returns the [`World`] mutably.
    ///
    /// Note that [`Runner::run()`] clears it before running anything.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Forgets every step definition, every [`Priority::User`] hook and
    /// the [`World`] content.
    ///
    /// [`Priority::Library`] hooks and the [`Selection`] are kept.
    pub fn reset(&mut self) {
        tracing::debug!("resetting runner");
        self.steps.clear();
        self.hooks.clear(Some(Priority::User));
        self.world.clear();
    }

    /// Runs the selected [`Scenario`]s of the given [`Feature`]s.
    ///
    /// The [`World`] is cleared once, before anything runs. A failed step,
    /// or an outline row lacking a placeholder value, fails its [`Scenario`]
    /// only, and the run goes on with the next one.
    ///
    /// # Errors
    ///
    /// [`RunError::Hook`] if a hook fails, aborting the run once the
    /// after-hooks of the scopes already entered have run.
    ///
    /// [`Scenario`]: crate::feature::Scenario
    pub fn run(&mut self, features: &[Feature]) -> Result<Summary, RunError> {
        let plans = features
            .iter()
            .map(|feature| {
                let scenarios = outline::expand_feature(feature)
                    .into_iter()
                    .filter(|expansion| {
                        let scenario = match expansion {
                            Ok(scenario) => scenario,
                            Err(unresolved) => &unresolved.scenario,
                        };
                        self.selection.matches(scenario)
                    })
                    .collect();
                Plan { feature, scenarios }
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            features = plans.len(),
            scenarios = plans.iter().map(|p| p.scenarios.len()).sum::<usize>(),
            "run planned"
        );

        self.world.clear();
        let (summary, error) = Executor {
            steps: &self.steps,
            hooks: &self.hooks,
            world: &mut self.world,
        }
        .run(&plans);

        match error {
            Some(source) => Err(RunError::Hook { source, summary }),
            None => Ok(summary),
        }
    }

    /// Parses the given `text` as a single [`Feature`] and runs it.
    ///
    /// # Errors
    ///
    /// If the `text` can't be parsed, or the run is aborted.
    pub fn run_text(&mut self, text: &str) -> crate::Result<Summary> {
        let feature = parser::parse(text, self.config.language.as_deref())?;
        Ok(self.run(&[feature])?)
    }

    /// Parses the `.feature` file, or all the files of the directory, at the
    /// given `path` and runs them.
    ///
    /// # Errors
    ///
    /// If any file can't be read or parsed, before anything runs, or if the
    /// run is aborted.
    pub fn run_path(&mut self, path: impl AsRef<Path>) -> crate::Result<Summary> {
        let features = parser::Basic::new()
            .language(self.config.language.clone())
            .glob(self.config.glob.clone())
            .parse(path)
            .collect::<parser::Result<Vec<_>>>()?;
        Ok(self.run(&features)?)
    }
}

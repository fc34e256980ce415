// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sequential engine for [Gherkin] features.
//!
//! `.feature` documents are parsed into [`Feature`]s, outlines are expanded
//! into concrete [`Scenario`]s, and every step is resolved against the
//! patterns registered in a [`Runner`]: the first pattern fully matching
//! the step text wins. Step [`Fn`]s share a single [`World`] for the whole
//! run.
//!
//! ```rust
//! use eucalyptus::{Event, Runner};
//!
//! let mut runner = Runner::new();
//! runner
//!     .step(r"I have entered (\d+)", |world, ctx| {
//!         let n = ctx.parse::<i64>(1)?;
//!         world.get_or_insert_with("stack", Vec::<i64>::new).push(n);
//!         anyhow::Ok(())
//!     })
//!     .unwrap()
//!     .step(r"I press add", |world, _| {
//!         let sum: i64 =
//!             world.get::<Vec<i64>>("stack").map_or(0, |s| s.iter().sum());
//!         world.set("result", sum);
//!     })
//!     .unwrap()
//!     .step(r"the result should be (\d+)", |world, ctx| {
//!         let expected = ctx.parse::<i64>(1)?;
//!         anyhow::ensure!(world.get::<i64>("result") == Some(&expected));
//!         Ok(())
//!     })
//!     .unwrap()
//!     .before(Event::Example, |world, _| world.clear());
//!
//! let summary = runner
//!     .run_text(
//!         "Feature: Addition\n\
//!          \x20 Scenario: Add two numbers\n\
//!          \x20   Given I have entered 50\n\
//!          \x20   And I have entered 70\n\
//!          \x20   When I press add\n\
//!          \x20   Then the result should be 120\n",
//!     )
//!     .unwrap();
//! assert!(summary.passed());
//! ```
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod cli;
pub mod dialect;
pub mod error;
pub mod feature;
pub mod hook;
pub mod outline;
mod panic_trap;
pub mod parser;
pub mod report;
pub mod runner;
pub mod step;
pub mod table;
pub mod tag;
pub mod world;
pub mod writer;

#[doc(inline)]
pub use self::{
    dialect::Dialect,
    error::{Error, Result},
    feature::{Background, Feature, Outline, Scenario, Step},
    hook::{Event, Phase, Priority, Scope},
    panic_trap::coerce_panic,
    parser::Parser,
    report::{Failure, Status, Summary},
    runner::{Config, RunError, Runner, Selection},
    step::Context,
    table::Table,
    tag::TagExpression,
    world::World,
};

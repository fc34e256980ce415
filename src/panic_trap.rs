// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Trapping panics of user callbacks.

use std::{
    any::Any,
    borrow::Cow,
    panic::{self, AssertUnwindSafe},
};

/// Runs the given `f`, turning its panic into a readable message.
pub(crate) fn trap<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| coerce_panic(&*payload).into_owned())
}

/// Coerces a panic `payload` into a readable message.
#[must_use]
pub fn coerce_panic(payload: &(dyn Any + Send)) -> Cow<'static, str> {
    payload
        .downcast_ref::<String>()
        .map(|s| s.clone().into())
        .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned().into()))
        .unwrap_or_else(|| "(Could not resolve panic payload)".into())
}

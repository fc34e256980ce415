// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared state of a run.

use std::{any::Any, collections::HashMap, fmt};

use itertools::Itertools as _;

/// Mutable key-value bag shared by all the steps and hooks of a run.
///
/// It's cleared once at the start of every run, never between scenarios: a
/// scenario needing a fresh state has to reset its keys in a `before`
/// example hook.
///
/// Values are of arbitrary types, and are looked up by both their key and
/// their type.
///
/// # Example
///
/// ```rust
/// use eucalyptus::World;
///
/// let mut world = World::new();
/// world.set("numbers", vec![1, 2]);
/// world.get_mut::<Vec<i32>>("numbers").unwrap().push(3);
///
/// assert_eq!(world.get::<Vec<i32>>("numbers"), Some(&vec![1, 2, 3]));
/// assert_eq!(world.get::<String>("numbers"), None);
/// ```
#[derive(Default)]
pub struct World {
    values: HashMap<String, Box<dyn Any>>,
}

impl World {
    /// Creates an empty [`World`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the `value` under the `key`, replacing any previous one.
    pub fn set<T: Any>(&mut self, key: impl Into<String>, value: T) {
        _ = self.values.insert(key.into(), Box::new(value));
    }

    /// Returns the value under the `key`, if it's of type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref()
    }

    /// Returns the mutable value under the `key`, if it's of type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut()
    }

    /// Returns the value of type `T` under the `key`, inserting the result of
    /// `init` if there is none, or if it's of another type.
    pub fn get_or_insert_with<T: Any>(
        &mut self,
        key: &str,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        let slot = self
            .values
            .entry(key.to_owned())
            .or_insert_with(|| Box::new(()));
        if !slot.is::<T>() {
            *slot = Box::new(init());
        }
        slot.downcast_mut()
            .unwrap_or_else(|| unreachable!("the value has just been stored"))
    }

    /// Removes the value under the `key`, returning it if it's of type `T`.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        self.values.remove(key)?.downcast().ok().map(|b| *b)
    }

    /// Indicates whether a value is stored under the `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Indicates whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the stored keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str).sorted()
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World").field("keys", &self.keys().collect_vec()).finish()
    }
}

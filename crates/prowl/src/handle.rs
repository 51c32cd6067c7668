// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Caller-defined identity of a tracked resource

use std::fmt::Display;
use std::hash::Hash;

/// Identity of an external resource the caller wants kept fresh.
///
/// Handles key the orders and entities maps, so `Eq`/`Hash` define the
/// framework's notion of "same resource" and `Display` is the form that
/// shows up in logs. Handles reporting `valid() == false` are rejected at
/// the API boundary and never reach a handler.
pub trait Handle: Clone + Eq + Hash + Display + Send + Sync + 'static {
    fn valid(&self) -> bool;
}

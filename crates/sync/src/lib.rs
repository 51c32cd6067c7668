// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prowl-sync: concurrency primitives for the prowl framework
//!
//! A keyed concurrent map, a copy-on-write cell, a one-producer
//! many-consumer broadcaster, and a periodic session loop. Nothing in this
//! crate knows what a crawler is; the types are generic over the payloads
//! the engine threads through them.

mod broadcast;
mod bus;
mod cell;
mod error;
mod id;
mod map;
mod session;

pub use broadcast::{Broadcaster, Listener, ListenerId, SendReport};
pub use cell::SyncCell;
pub use error::{BroadcastError, SessionError};
pub use id::{unique_hex, unique_u64};
pub use map::SyncMap;
pub use session::{
    PassHandler, PassOutcome, Session, SessionSettings, MINIMUM_SESSION_INTERVAL,
};

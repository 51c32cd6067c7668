// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prowl: a polling-style tracking framework
//!
//! Callers hand the crawler opaque [`Handle`]s and two handlers — one that
//! begins tracking a handle, one that refreshes it — and the crawler drives
//! periodic passes with timeouts, retry caps, and pause/resume/immediate
//! controls, fanning each pass result out to any number of listeners. The
//! framework never touches the network or storage; those live behind the
//! handlers.

mod crawler;
mod entity;
mod error;
mod handle;
mod order;
mod result;
mod settings;
mod track;

pub use crawler::{Crawler, CrawlerHandlers};
pub use entity::{Entity, EntityHandler};
pub use error::{CrawlError, SessionError};
pub use handle::Handle;
pub use order::{Order, OrderHandler};
pub use result::PassResult;
pub use settings::CrawlerSettings;
pub use track::{Actionable, TrackingAction, TrackingCommand, TrackingResult};

pub use prowl_sync::{
    BroadcastError, Broadcaster, Listener, ListenerId, PassOutcome, SendReport, Session,
    SessionSettings, MINIMUM_SESSION_INTERVAL,
};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Tracking vocabulary and bookkeeping: commands, actions, per-handle
//! results, order enqueueing, and the commit of decided actions.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::crawler::{Crawler, CrawlerInner};
use crate::entity::Entity;
use crate::error::CrawlError;
use crate::handle::Handle;
use crate::order::Order;

/// What a queued order asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingCommand {
    #[default]
    None,
    Start,
    Stop,
}

impl fmt::Display for TrackingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::None => "none",
        })
    }
}

/// The decision produced for an order or entity in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingAction {
    /// Leave the mapping untouched.
    #[default]
    None,
    /// Persist the (possibly mutated) value.
    Update,
    /// Delete the value from its mapping.
    Remove,
}

impl fmt::Display for TrackingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Update => "update",
            Self::Remove => "remove",
            Self::None => "none",
        })
    }
}

/// A value paired with the action decided for it and the error (if any) that
/// drove the decision.
#[derive(Debug, Clone)]
pub struct Actionable<T> {
    pub action: TrackingAction,
    pub value: T,
    pub err: Option<CrawlError>,
}

impl<T> Actionable<T> {
    pub fn new(value: T) -> Self {
        Self {
            action: TrackingAction::None,
            value,
            err: None,
        }
    }
}

/// Everything one pass decided about a single handle.
///
/// Order processing populates both sides (the entity side is the entity
/// that would start tracking); entity refreshes populate only the entity
/// side.
#[derive(Debug, Clone)]
pub struct TrackingResult<H, D> {
    pub order: Option<Actionable<Order<H, D>>>,
    pub entity: Option<Actionable<Entity<H, D>>>,
}

/// Run a handler future, bounding it with `timeout` when non-zero.
///
/// On expiry the handler's token is cancelled, the future is dropped, and
/// `timeout_err` is returned so callers can tell which limit fired.
pub(crate) async fn invoke_bounded<F>(
    token: &CancellationToken,
    timeout: Duration,
    timeout_err: CrawlError,
    handler: F,
) -> Result<(), CrawlError>
where
    F: Future<Output = Result<(), CrawlError>>,
{
    if timeout.is_zero() {
        return handler.await;
    }

    match tokio::time::timeout(timeout, handler).await {
        Ok(outcome) => outcome,
        Err(_) => {
            token.cancel();
            Err(timeout_err)
        }
    }
}

impl<H, D> CrawlerInner<H, D>
where
    H: Handle,
    D: Clone + Send + Sync + 'static,
{
    /// Queue a start/stop order for a handle.
    ///
    /// Duplicate starts and stops for untracked handles are no-ops. The
    /// returned boolean reports whether the handle is currently tracked.
    pub(crate) fn enqueue(&self, handle: H, command: TrackingCommand) -> Result<bool, CrawlError> {
        if !handle.valid() {
            return Err(CrawlError::InvalidHandle);
        }

        let tracked = self.entities.contains(&handle);
        match command {
            TrackingCommand::Start if tracked => return Ok(true),
            TrackingCommand::Stop if !tracked => return Ok(false),
            TrackingCommand::Start | TrackingCommand::Stop => {}
            TrackingCommand::None => return Err(CrawlError::InvalidCommand),
        }

        self.orders.insert(handle.clone(), Order::new(command, handle));

        // Fresh work: wake a session that paused itself on idle.
        if self.session.pause_idle() && self.session.paused() {
            self.session.resume();
        }

        Ok(tracked)
    }

    /// Apply the decided actions to the live mappings.
    pub(crate) fn commit(&self, result: &TrackingResult<H, D>) {
        if let Some(order) = &result.order {
            let handle = &order.value.handle;
            if handle.valid() {
                match order.action {
                    TrackingAction::Remove => {
                        self.orders.remove(handle);
                    }
                    TrackingAction::Update => {
                        self.orders.insert(handle.clone(), order.value.clone());
                    }
                    TrackingAction::None => {}
                }
            }
        }

        if let Some(entity) = &result.entity {
            let handle = &entity.value.handle;
            if handle.valid() {
                match entity.action {
                    TrackingAction::Remove => {
                        self.entities.remove(handle);
                    }
                    TrackingAction::Update => {
                        self.entities.insert(handle.clone(), entity.value.clone());
                    }
                    TrackingAction::None => {}
                }
            }
        }
    }
}

impl<H, D> Crawler<H, D>
where
    H: Handle,
    D: Clone + Send + Sync + 'static,
{
    /// Handles currently being tracked.
    pub fn tracked(&self) -> Vec<H> {
        self.inner.entities.keys()
    }

    pub fn is_tracked(&self, handle: &H) -> bool {
        self.inner.entities.contains(handle)
    }

    /// Ask the next pass to begin tracking `handle`.
    pub fn track(&self, handle: H) -> Result<bool, CrawlError> {
        self.inner.enqueue(handle, TrackingCommand::Start)
    }

    /// Ask the next pass to stop tracking `handle`.
    pub fn untrack(&self, handle: H) -> Result<bool, CrawlError> {
        self.inner.enqueue(handle, TrackingCommand::Stop)
    }

    /// Queue a stop order for every currently-tracked handle.
    pub fn untrack_all(&self) -> usize {
        let mut untracked = 0;
        self.inner.entities.range(|handle, _| {
            let _ = self.inner.enqueue(handle.clone(), TrackingCommand::Stop);
            untracked += 1;
            true
        });

        untracked
    }
}

#[cfg(test)]
#[path = "track_tests.rs"]
mod tests;

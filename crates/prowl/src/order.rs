// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Pending start/stop commands and their per-pass processing

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::crawler::CrawlerInner;
use crate::entity::Entity;
use crate::error::CrawlError;
use crate::handle::Handle;
use crate::track::{invoke_bounded, Actionable, TrackingAction, TrackingCommand, TrackingResult};

/// A pending command for a handle, queued by `track`/`untrack` and consumed
/// by the next pass.
#[derive(Debug, Clone)]
pub struct Order<H, D> {
    pub command: TrackingCommand,
    /// Consecutive failures of the order handler.
    pub attempt: u32,
    pub last_processing: Option<Instant>,

    pub handle: H,
    /// Opaque caller state threaded through to the handler.
    pub data: Option<D>,
}

impl<H, D> Order<H, D> {
    pub fn new(command: TrackingCommand, handle: H) -> Self {
        Self {
            command,
            attempt: 0,
            last_processing: None,
            handle,
            data: None,
        }
    }
}

/// Performs the "begin tracking" side effect for a start order.
///
/// `order.value` is the order being executed; `entity.value` is the entity
/// that will start tracking on success. The handler may mutate either
/// payload and may preset the actions — a preset action is authoritative and
/// replaces the default consume-order-create-entity policy.
#[async_trait]
pub trait OrderHandler<H: Handle, D>: Send + Sync {
    async fn process(
        &self,
        token: &CancellationToken,
        order: &mut Actionable<Order<H, D>>,
        entity: &mut Actionable<Entity<H, D>>,
    ) -> Result<(), CrawlError>;
}

impl<H, D> CrawlerInner<H, D>
where
    H: Handle,
    D: Clone + Send + Sync + 'static,
{
    /// Execute one order under the configured timeout and decide its fate.
    ///
    /// Handler failures are recorded on the result and drive the
    /// update-or-remove policy; only a cancelled pass token is an error at
    /// this level.
    pub(crate) async fn process_order(
        &self,
        token: &CancellationToken,
        order: &Order<H, D>,
    ) -> Result<TrackingResult<H, D>, CrawlError> {
        if token.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        let settings = self.settings.load();
        let mut order_res = Actionable::new(order.clone());
        let mut entity_res = Actionable::new(Entity::new(order.handle.clone()));

        if let Some(last) = order_res.value.last_processing {
            if last.elapsed() < settings.minimum_tracking_order_delay {
                // Too soon; leave the order untouched for a later pass.
                return Ok(TrackingResult {
                    order: Some(order_res),
                    entity: Some(entity_res),
                });
            }
        }

        let max_attempts = settings.maximum_tracking_order_attempts;

        match order_res.value.command {
            TrackingCommand::Start => {
                let handlers = self.handlers.load();
                let child = token.child_token();

                let outcome = match handlers.order {
                    Some(handler) => {
                        invoke_bounded(
                            &child,
                            settings.tracking_order_timeout,
                            CrawlError::ExceededOrderTimeout,
                            handler.process(&child, &mut order_res, &mut entity_res),
                        )
                        .await
                    }
                    None => Err(CrawlError::MissingHandler),
                };
                order_res.err = outcome.err();

                if order_res.err.is_some() {
                    order_res.value.attempt += 1;
                } else {
                    order_res.value.attempt = 0;
                }

                if let Some(err) = order_res.err.clone() {
                    entity_res.action = TrackingAction::None;

                    let capped = max_attempts > 0 && order_res.value.attempt >= max_attempts;
                    if err.is_invalid_handle() || capped {
                        order_res.action = TrackingAction::Remove;
                        entity_res.action = TrackingAction::None;
                    } else if order_res.action == TrackingAction::None {
                        order_res.action = TrackingAction::Update;
                    }
                } else if order_res.action == TrackingAction::None {
                    // The order is consumed; the entity begins tracking.
                    order_res.action = TrackingAction::Remove;
                    entity_res.action = TrackingAction::Update;
                }
            }

            TrackingCommand::Stop => {
                order_res.action = TrackingAction::Remove;
                entity_res.action = TrackingAction::Remove;
            }

            TrackingCommand::None => {
                order_res.err = Some(CrawlError::InvalidCommand);
                order_res.action = TrackingAction::Remove;
            }
        }

        order_res.value.last_processing = Some(Instant::now());

        match &order_res.err {
            Some(err) => tracing::warn!(
                handle = %order_res.value.handle,
                command = %order_res.value.command,
                attempt = order_res.value.attempt,
                limit = max_attempts,
                action = %order_res.action,
                error = %err,
                "order processed"
            ),
            None => tracing::info!(
                handle = %order_res.value.handle,
                command = %order_res.value.command,
                order_action = %order_res.action,
                entity_action = %entity_res.action,
                "order processed"
            ),
        }

        Ok(TrackingResult {
            order: Some(order_res),
            entity: Some(entity_res),
        })
    }
}

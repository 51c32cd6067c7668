// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Tracked entities and their per-pass refresh

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::crawler::CrawlerInner;
use crate::error::CrawlError;
use crate::handle::Handle;
use crate::track::{invoke_bounded, Actionable, TrackingAction, TrackingResult};

/// The actively-tracked shadow of a handle, refreshed on every pass until it
/// is untracked, rejected, or runs out of attempts.
#[derive(Debug, Clone)]
pub struct Entity<H, D> {
    /// Consecutive failures of the entity handler.
    pub attempt: u32,
    pub last_processing: Option<Instant>,

    pub handle: H,
    /// Opaque caller state threaded through to the handler.
    pub data: Option<D>,
}

impl<H, D> Entity<H, D> {
    pub fn new(handle: H) -> Self {
        Self {
            attempt: 0,
            last_processing: None,
            handle,
            data: None,
        }
    }
}

/// Refreshes one tracked entity.
///
/// The handler may mutate `entity.value.data` and may preset
/// `entity.action`; a preset action overrides the default update policy.
#[async_trait]
pub trait EntityHandler<H: Handle, D>: Send + Sync {
    async fn refresh(
        &self,
        token: &CancellationToken,
        entity: &mut Actionable<Entity<H, D>>,
    ) -> Result<(), CrawlError>;
}

impl<H, D> CrawlerInner<H, D>
where
    H: Handle,
    D: Clone + Send + Sync + 'static,
{
    /// Refresh one entity under the configured timeout and decide its fate.
    pub(crate) async fn process_entity(
        &self,
        token: &CancellationToken,
        entity: &Entity<H, D>,
    ) -> Result<TrackingResult<H, D>, CrawlError> {
        if token.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        let settings = self.settings.load();
        let mut entity_res = Actionable::new(entity.clone());

        if let Some(last) = entity_res.value.last_processing {
            if last.elapsed() < settings.minimum_tracking_delay {
                // Refreshed recently enough; skip without touching attempts.
                return Ok(TrackingResult {
                    order: None,
                    entity: Some(entity_res),
                });
            }
        }

        let max_attempts = settings.maximum_tracking_attempts;

        let handlers = self.handlers.load();
        let child = token.child_token();

        let outcome = match handlers.entity {
            Some(handler) => {
                invoke_bounded(
                    &child,
                    settings.tracking_timeout,
                    CrawlError::ExceededTrackingTimeout,
                    handler.refresh(&child, &mut entity_res),
                )
                .await
            }
            None => Err(CrawlError::MissingHandler),
        };
        entity_res.err = outcome.err();

        if entity_res.err.is_some() {
            entity_res.value.attempt += 1;
        } else {
            entity_res.value.attempt = 0;
        }

        if let Some(err) = entity_res.err.clone() {
            let capped = max_attempts > 0 && entity_res.value.attempt >= max_attempts;
            if err.is_invalid_handle() || capped {
                entity_res.action = TrackingAction::Remove;
            } else if entity_res.action == TrackingAction::None {
                entity_res.action = TrackingAction::Update;
            }
        } else if entity_res.action == TrackingAction::None {
            entity_res.action = TrackingAction::Update;
        }

        entity_res.value.last_processing = Some(Instant::now());

        match &entity_res.err {
            Some(err) => tracing::warn!(
                handle = %entity_res.value.handle,
                attempt = entity_res.value.attempt,
                limit = max_attempts,
                action = %entity_res.action,
                error = %err,
                "entity refreshed"
            ),
            None => tracing::info!(
                handle = %entity_res.value.handle,
                action = %entity_res.action,
                "entity refreshed"
            ),
        }

        Ok(TrackingResult {
            order: None,
            entity: Some(entity_res),
        })
    }
}

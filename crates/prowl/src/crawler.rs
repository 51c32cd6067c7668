// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! The crawler facade: glues the session engine to the tracking state

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use prowl_sync::{Listener, PassHandler, Session, SessionSettings, SyncCell, SyncMap};

use crate::entity::{Entity, EntityHandler};
use crate::error::CrawlError;
use crate::handle::Handle;
use crate::order::{Order, OrderHandler};
use crate::result::PassResult;
use crate::settings::CrawlerSettings;

/// The user-supplied collaborators, replaced wholesale through a cell so a
/// running pass always sees a consistent pair.
pub struct CrawlerHandlers<H, D> {
    pub order: Option<Arc<dyn OrderHandler<H, D>>>,
    pub entity: Option<Arc<dyn EntityHandler<H, D>>>,
}

impl<H, D> Clone for CrawlerHandlers<H, D> {
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            entity: self.entity.clone(),
        }
    }
}

impl<H, D> Default for CrawlerHandlers<H, D> {
    fn default() -> Self {
        Self {
            order: None,
            entity: None,
        }
    }
}

pub(crate) struct CrawlerInner<H, D> {
    pub(crate) settings: SyncCell<CrawlerSettings>,
    pub(crate) handlers: SyncCell<CrawlerHandlers<H, D>>,
    pub(crate) session: Arc<Session<Arc<PassResult<H, D>>>>,

    pub(crate) orders: SyncMap<H, Order<H, D>>,
    pub(crate) entities: SyncMap<H, Entity<H, D>>,
}

/// A polling tracker over caller-defined handles.
///
/// Queue handles with [`Crawler::track`], start a session, and every
/// interval the crawler executes pending orders, refreshes tracked entities
/// through the injected handlers, and broadcasts a [`PassResult`] to
/// listeners. Cloning shares state.
pub struct Crawler<H, D = ()> {
    pub(crate) inner: Arc<CrawlerInner<H, D>>,
}

impl<H, D> Clone for Crawler<H, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H, D> Crawler<H, D>
where
    H: Handle,
    D: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CrawlerInner {
                settings: SyncCell::new(CrawlerSettings::default()),
                handlers: SyncCell::new(CrawlerHandlers::default()),
                session: Arc::new(Session::new()),
                orders: SyncMap::new(),
                entities: SyncMap::new(),
            }),
        }
    }

    pub fn settings(&self) -> CrawlerSettings {
        self.inner.settings.load()
    }

    pub fn set_settings(&self, settings: CrawlerSettings) {
        self.inner.settings.store(settings);
    }

    pub fn handlers(&self) -> CrawlerHandlers<H, D> {
        self.inner.handlers.load()
    }

    pub fn set_handlers(&self, handlers: CrawlerHandlers<H, D>) {
        self.inner.handlers.store(handlers);
    }

    pub fn set_order_handler(&self, handler: Arc<dyn OrderHandler<H, D>>) {
        let mut handlers = self.inner.handlers.load();
        handlers.order = Some(handler);
        self.inner.handlers.store(handlers);
    }

    pub fn set_entity_handler(&self, handler: Arc<dyn EntityHandler<H, D>>) {
        let mut handlers = self.inner.handlers.load();
        handlers.entity = Some(handler);
        self.inner.handlers.store(handlers);
    }

    pub fn active(&self) -> bool {
        self.inner.session.active()
    }

    pub fn paused(&self) -> bool {
        self.inner.session.paused()
    }

    pub fn pause(&self) {
        self.inner.session.pause();
    }

    pub fn resume(&self) {
        self.inner.session.resume();
    }

    /// Reschedule the next pass; see [`Session::immediate`].
    pub async fn immediate(&self, delay: Duration) -> bool {
        self.inner.session.immediate(delay).await
    }

    /// Launch the periodic session; `token` bounds its whole lifetime.
    pub fn start(
        &self,
        token: CancellationToken,
        settings: SessionSettings,
    ) -> Result<(), CrawlError> {
        Arc::clone(&self.inner.session)
            .start(token, Arc::clone(&self.inner), settings)
            .map_err(CrawlError::from)
    }

    /// Graceful shutdown; see [`Session::stop`].
    pub async fn stop(&self) -> bool {
        self.inner.session.stop().await
    }

    /// Listener receiving every valid pass result.
    ///
    /// After the session terminates the listener is born closed.
    pub fn listen(&self) -> Listener<Arc<PassResult<H, D>>> {
        self.inner.session.listen()
    }
}

impl<H, D> Default for Crawler<H, D>
where
    H: Handle,
    D: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<H, D> PassHandler<Arc<PassResult<H, D>>> for CrawlerInner<H, D>
where
    H: Handle,
    D: Clone + Send + Sync + 'static,
{
    async fn pass(
        &self,
        token: CancellationToken,
        session: Arc<Session<Arc<PassResult<H, D>>>>,
    ) -> Arc<PassResult<H, D>> {
        let mut result = PassResult::new(session.id(), session.pass());

        // Orders first: every decision commits before entity work begins.
        for (handle, order) in self.orders.entries() {
            result.idle = false;

            match self.process_order(&token, &order).await {
                Ok(tracking) => {
                    self.commit(&tracking);
                    result.orders.insert(handle, tracking);
                }
                Err(err) => {
                    result.err = Some(err);
                    break;
                }
            }
        }

        if result.err.is_none() {
            for (handle, entity) in self.entities.entries() {
                result.idle = false;

                match self.process_entity(&token, &entity).await {
                    Ok(tracking) => {
                        self.commit(&tracking);
                        result.entities.insert(handle, tracking);
                    }
                    Err(err) => {
                        result.err = Some(err);
                        break;
                    }
                }
            }
        }

        result.timestamp = Utc::now();
        Arc::new(result)
    }
}

#[cfg(test)]
#[path = "crawler_tests.rs"]
mod tests;

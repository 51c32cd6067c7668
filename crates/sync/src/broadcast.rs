// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! One-producer-many-consumer value fan-out
//!
//! Every listener owns a bounded channel; delivery defaults to try-send so a
//! stuck consumer can never block the producer or its peers. Consumers that
//! need slack choose a larger capacity or chain [`Listener::redirect`] into
//! a broadcaster of their own.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::BroadcastError;
use crate::map::SyncMap;

/// Identifies one listener within its broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Shared<V> {
    listeners: SyncMap<ListenerId, mpsc::Sender<V>>,
    capacity: usize,
    closed: AtomicBool,
    next_id: AtomicU64,
}

/// Fan-out of values to a dynamic set of listeners.
///
/// Cloning shares state: clones see the same listeners and the same closed
/// flag.
pub struct Broadcaster<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for Broadcaster<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V> Broadcaster<V> {
    /// A broadcaster whose listeners buffer up to `capacity` values.
    ///
    /// Channels need room for at least one value, so `capacity` is clamped
    /// to a minimum of 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                listeners: SyncMap::new(),
                capacity: capacity.max(1),
                closed: AtomicBool::new(false),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }

    /// Register a new listener.
    ///
    /// On a discarded broadcaster the listener is born closed: its channel
    /// yields `None` immediately.
    pub fn listen(&self) -> Listener<V> {
        let id = ListenerId(self.shared.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::channel(self.shared.capacity);

        if self.closed() {
            drop(tx);
            return Listener {
                id,
                rx,
                shared: Arc::clone(&self.shared),
                discarded: true,
            };
        }

        self.shared.listeners.insert(id, tx);
        if self.closed() {
            // Lost the race against discard; unregister so the channel
            // still closes.
            self.shared.listeners.remove(&id);
        }

        Listener {
            id,
            rx,
            shared: Arc::clone(&self.shared),
            discarded: false,
        }
    }

    /// Close every listener's channel exactly once. Idempotent.
    pub fn discard(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        for id in self.shared.listeners.keys() {
            self.shared.listeners.remove(&id);
        }
    }

    /// Unregister one listener, closing its channel. Idempotent.
    pub fn discard_listener(&self, id: ListenerId) {
        self.shared.listeners.remove(&id);
    }
}

impl<V: Clone> Broadcaster<V> {
    /// Deliver `value` to every live listener without blocking.
    ///
    /// A listener whose buffer is full is skipped for this delivery but
    /// stays registered. With `report` set, the returned [`SendReport`]
    /// lists who got the value and who was dropped.
    pub async fn send(&self, value: V, report: bool) -> Result<SendReport, BroadcastError> {
        self.send_with_timeout(value, Duration::ZERO, report).await
    }

    /// Like [`Broadcaster::send`], but with `timeout > 0` each listener is
    /// given up to `timeout` of blocking window before being dropped.
    pub async fn send_with_timeout(
        &self,
        value: V,
        timeout: Duration,
        report: bool,
    ) -> Result<SendReport, BroadcastError> {
        if self.closed() {
            return Err(BroadcastError::Closed);
        }

        let mut outcome = SendReport {
            recorded: report,
            ..SendReport::default()
        };

        for (id, tx) in self.shared.listeners.entries() {
            let delivered = if timeout.is_zero() {
                tx.try_send(value.clone()).is_ok()
            } else {
                match tokio::time::timeout(timeout, tx.send(value.clone())).await {
                    Ok(sent) => sent.is_ok(),
                    Err(_) => {
                        tracing::trace!(
                            listener = id.0,
                            error = %BroadcastError::ExceededSendTimeout,
                            "broadcast delivery dropped"
                        );
                        false
                    }
                }
            };

            if report {
                if delivered {
                    outcome.delivered.push(id);
                } else {
                    outcome.dropped.push(id);
                }
            }
        }

        Ok(outcome)
    }
}

/// Delivery accounting for one [`Broadcaster::send`] call.
#[derive(Debug, Clone, Default)]
pub struct SendReport {
    recorded: bool,
    delivered: Vec<ListenerId>,
    dropped: Vec<ListenerId>,
}

impl SendReport {
    /// `(delivered, dropped)` counts, or `None` when the send was made
    /// without reporting.
    pub fn status(&self) -> Option<(usize, usize)> {
        self.recorded
            .then(|| (self.delivered.len(), self.dropped.len()))
    }

    pub fn delivered(&self) -> &[ListenerId] {
        &self.delivered
    }

    pub fn dropped(&self) -> &[ListenerId] {
        &self.dropped
    }
}

/// Receiving side of one broadcaster registration.
///
/// The only close event a consumer observes is its channel: once the
/// listener is discarded (individually or via the broadcaster), `recv`
/// drains any buffered values and then yields `None`.
pub struct Listener<V> {
    id: ListenerId,
    rx: mpsc::Receiver<V>,
    shared: Arc<Shared<V>>,
    discarded: bool,
}

impl<V> Listener<V> {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether this listener discarded itself or saw its channel close.
    pub fn closed(&self) -> bool {
        self.discarded
    }

    /// Next value, or `None` once the channel is closed and drained.
    pub async fn recv(&mut self) -> Option<V> {
        match self.rx.recv().await {
            Some(value) => Some(value),
            None => {
                self.discarded = true;
                None
            }
        }
    }

    /// Non-blocking variant of [`Listener::recv`].
    pub fn try_recv(&mut self) -> Option<V> {
        self.rx.try_recv().ok()
    }

    /// Unregister from the broadcaster. Idempotent.
    pub fn discard(&mut self) {
        if self.discarded {
            return;
        }
        self.discarded = true;
        self.shared.listeners.remove(&self.id);
    }
}

impl<V: Clone> Listener<V> {
    /// Forward every received value into `destination`, then discard.
    ///
    /// Runs until the source channel closes or `token` is cancelled.
    pub async fn redirect(mut self, token: &CancellationToken, destination: &Broadcaster<V>) {
        if self.discarded {
            return;
        }

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                received = self.rx.recv() => match received {
                    Some(value) => {
                        let _ = destination.send(value, false).await;
                    }
                    None => break,
                },
            }
        }

        self.discard();
    }
}

impl<V> Drop for Listener<V> {
    fn drop(&mut self) {
        if !self.discarded {
            self.shared.listeners.remove(&self.id);
        }
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;

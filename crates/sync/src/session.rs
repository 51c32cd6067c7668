// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Periodic session loop
//!
//! One long-lived task drives interval ticks; each tick spawns a single pass
//! task so pause/stop/immediate events stay observable while the handler
//! runs. Valid pass results are fanned out through the session's broadcaster
//! before the pass counter increments.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::broadcast::{Broadcaster, Listener};
use crate::bus::{Bus, LoopChannels};
use crate::error::SessionError;
use crate::id::unique_hex;

/// Sessions refuse to tick faster than this.
pub const MINIMUM_SESSION_INTERVAL: Duration = Duration::from_secs(1);

/// Per-run configuration handed to [`Session::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub interval: Duration,
    /// Upper bound for one pass; zero disables the watchdog.
    #[serde(default)]
    pub single_pass_timeout: Duration,
    /// Start in the paused state.
    #[serde(default)]
    pub paused: bool,
    /// Pause automatically when a pass reports itself idle.
    #[serde(default)]
    pub pause_idle: bool,
}

impl SessionSettings {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            single_pass_timeout: Duration::ZERO,
            paused: false,
            pause_idle: false,
        }
    }
}

/// Capabilities a pass result declares to the loop.
///
/// Invalid results are dropped without broadcast or pass-counter increment;
/// idle results pause the session when `pause_idle` is on.
pub trait PassOutcome {
    fn is_valid(&self) -> bool {
        true
    }

    fn is_idle(&self) -> bool {
        false
    }
}

impl<T: PassOutcome> PassOutcome for Arc<T> {
    fn is_valid(&self) -> bool {
        T::is_valid(self)
    }

    fn is_idle(&self) -> bool {
        T::is_idle(self)
    }
}

/// Produces one pass result per tick.
///
/// The token is a child of the one given to [`Session::start`]; it is
/// cancelled when the session winds down or the single-pass watchdog fires.
#[async_trait]
pub trait PassHandler<T>: Send + Sync {
    async fn pass(&self, token: CancellationToken, session: Arc<Session<T>>) -> T;
}

/// A periodic scheduler around one pass handler.
///
/// At most one run is active at a time; each run gets a fresh id and a pass
/// counter starting at zero.
pub struct Session<T> {
    active: AtomicBool,
    paused: AtomicBool,
    pause_idle: AtomicBool,
    pass: AtomicU64,
    id: RwLock<String>,
    bus: Bus<T>,
}

impl<T> Session<T> {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            pause_idle: AtomicBool::new(false),
            pass: AtomicU64::new(0),
            id: RwLock::new(String::new()),
            bus: Bus::new(),
        }
    }

    pub fn active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Id of the current (or most recent) run.
    pub fn id(&self) -> String {
        self.id.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of completed passes in the current run.
    pub fn pass(&self) -> u64 {
        self.pass.load(Ordering::SeqCst)
    }

    pub fn paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn pause_idle(&self) -> bool {
        self.pause_idle.load(Ordering::SeqCst)
    }

    pub fn set_pause_idle(&self, pause_idle: bool) {
        self.pause_idle.store(pause_idle, Ordering::SeqCst);
    }

    /// Flip the paused flag, waking the loop when the value changed.
    pub fn set_paused(&self, paused: bool) {
        if self.paused.swap(paused, Ordering::SeqCst) != paused {
            if let Some(poke) = self.bus.pause_poke() {
                poke.notify_one();
            }
        }
    }

    pub fn pause(&self) {
        self.set_paused(true);
    }

    pub fn resume(&self) {
        self.set_paused(false);
    }

    /// Listener on the current run's broadcaster.
    ///
    /// While no run is active the returned listener is born closed.
    pub fn listen(&self) -> Listener<T> {
        if self.active() {
            if let Some(broadcast) = self.bus.broadcast() {
                return broadcast.listen();
            }
        }

        let detached = Broadcaster::new(0);
        detached.discard();
        detached.listen()
    }

    /// Reschedule the next tick: zero means immediately, otherwise after
    /// `delay`. Returns whether the request reached the loop.
    pub async fn immediate(&self, delay: Duration) -> bool {
        if !self.active() {
            return false;
        }
        let Some(tx) = self.bus.immediate_tx() else {
            return false;
        };

        tx.send(delay).await.is_ok()
    }

    /// Graceful shutdown handshake.
    ///
    /// True only when the stop request was delivered and the loop confirmed
    /// termination. Callers wanting a deadline race this future themselves.
    pub async fn stop(&self) -> bool {
        if !self.active() {
            return false;
        }
        let Some((stop_tx, stopped_rx)) = self.bus.stop_handles() else {
            return false;
        };

        if stop_tx.send(()).await.is_err() {
            return false;
        }
        let mut stopped = stopped_rx.lock().await;
        stopped.recv().await.is_some()
    }

    fn halt(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.bus.reset();
    }
}

impl<T> Session<T>
where
    T: PassOutcome + Clone + Send + Sync + 'static,
{
    /// Launch the run loop.
    ///
    /// `token` bounds the whole session: cancelling it tears the loop down
    /// and closes every listener.
    pub fn start<H>(
        self: Arc<Self>,
        token: CancellationToken,
        handler: Arc<H>,
        settings: SessionSettings,
    ) -> Result<(), SessionError>
    where
        H: PassHandler<T> + 'static,
    {
        if settings.interval < MINIMUM_SESSION_INTERVAL {
            return Err(SessionError::InvalidInterval);
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyActive);
        }

        self.paused.store(settings.paused, Ordering::SeqCst);
        self.pause_idle.store(settings.pause_idle, Ordering::SeqCst);
        self.pass.store(0, Ordering::SeqCst);

        let id = unique_hex();
        *self.id.write().unwrap_or_else(|e| e.into_inner()) = id.clone();

        let channels = self.bus.setup();
        tracing::debug!(session = %id, "session started");
        tokio::spawn(self.run(
            token,
            handler,
            settings.interval,
            settings.single_pass_timeout,
            channels,
        ));

        Ok(())
    }

    async fn run<H>(
        self: Arc<Self>,
        token: CancellationToken,
        handler: Arc<H>,
        interval: Duration,
        single_pass_timeout: Duration,
        channels: LoopChannels<T>,
    ) where
        H: PassHandler<T> + 'static,
    {
        let LoopChannels {
            results_tx,
            mut results_rx,
            mut stop_rx,
            stopped_tx,
            mut immediate_rx,
            pause_poke,
            broadcast,
        } = channels;

        // None while paused or a pass is pending; Some(deadline) between
        // a processed result and the next tick.
        let mut cooldown: Option<Instant> = None;

        loop {
            if token.is_cancelled() {
                break;
            }

            if !self.paused() && cooldown.is_none() {
                Self::spawn_pass(&self, &token, &handler, single_pass_timeout, &results_tx);
            }

            tokio::select! {
                Some(()) = stop_rx.recv() => break,

                () = tokio::time::sleep_until(cooldown.unwrap_or_else(Instant::now)),
                    if cooldown.is_some() =>
                {
                    cooldown = None;
                    continue;
                }

                Some(delay) = immediate_rx.recv() => {
                    cooldown = if delay.is_zero() {
                        None
                    } else {
                        Some(Instant::now() + delay)
                    };
                    continue;
                }

                () = pause_poke.notified() => {
                    cooldown = None;
                    continue;
                }

                () = token.cancelled() => {}

                Some(result) = results_rx.recv() => {
                    if result.is_valid() {
                        let _ = broadcast.send(result.clone(), false).await;

                        if self.pause_idle() && result.is_idle() {
                            self.paused.store(true, Ordering::SeqCst);
                        }

                        self.pass.fetch_add(1, Ordering::SeqCst);
                    } else {
                        tracing::debug!(session = %self.id(), "dropping invalid pass result");
                    }
                }
            }

            cooldown = if self.paused() {
                None
            } else {
                Some(Instant::now() + interval)
            };
        }

        let _ = stopped_tx.try_send(());
        self.halt();
        tracing::debug!(session = %self.id(), "session stopped");
    }

    fn spawn_pass<H>(
        session: &Arc<Self>,
        token: &CancellationToken,
        handler: &Arc<H>,
        single_pass_timeout: Duration,
        results_tx: &tokio::sync::mpsc::Sender<T>,
    ) where
        H: PassHandler<T> + 'static,
    {
        let session = Arc::clone(session);
        let handler = Arc::clone(handler);
        let results_tx = results_tx.clone();
        let pass_token = token.child_token();

        tokio::spawn(async move {
            let result = if single_pass_timeout.is_zero() {
                handler.pass(pass_token, session).await
            } else {
                // The handler keeps running past the deadline but sees its
                // token cancelled; it is expected to wind down promptly.
                let watchdog_token = pass_token.clone();
                let watchdog_session = Arc::clone(&session);
                let watchdog = tokio::spawn(async move {
                    tokio::time::sleep(single_pass_timeout).await;
                    tracing::warn!(
                        session = %watchdog_session.id(),
                        error = %SessionError::ExceededPassTimeout,
                        "cancelling overrunning pass"
                    );
                    watchdog_token.cancel();
                });

                let result = handler.pass(pass_token, session).await;
                watchdog.abort();
                result
            };

            let _ = results_tx.send(result).await;
        });
    }
}

impl<T> Default for Session<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

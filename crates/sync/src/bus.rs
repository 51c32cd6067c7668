// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Channel bundle backing one session run
//!
//! Built when a session starts and torn down when it halts. Receivers are
//! owned by the run loop, so `setup` hands them over once; callers keep the
//! cloneable sender side.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, Notify};

use crate::broadcast::Broadcaster;

pub(crate) struct Bus<T> {
    state: RwLock<Option<BusState<T>>>,
}

struct BusState<T> {
    broadcast: Broadcaster<T>,
    stop_tx: mpsc::Sender<()>,
    stopped_rx: Arc<Mutex<mpsc::Receiver<()>>>,
    immediate_tx: mpsc::Sender<Duration>,
    pause_poke: Arc<Notify>,
}

/// The run loop's side of the bus.
pub(crate) struct LoopChannels<T> {
    pub results_tx: mpsc::Sender<T>,
    pub results_rx: mpsc::Receiver<T>,
    pub stop_rx: mpsc::Receiver<()>,
    pub stopped_tx: mpsc::Sender<()>,
    pub immediate_rx: mpsc::Receiver<Duration>,
    pub pause_poke: Arc<Notify>,
    pub broadcast: Broadcaster<T>,
}

impl<T> Bus<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    /// Create fresh channels for a new run and return the loop's side.
    pub fn setup(&self) -> LoopChannels<T> {
        let (results_tx, results_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (stopped_tx, stopped_rx) = mpsc::channel(1);
        let (immediate_tx, immediate_rx) = mpsc::channel(1);
        let pause_poke = Arc::new(Notify::new());
        let broadcast = Broadcaster::new(0);

        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(BusState {
            broadcast: broadcast.clone(),
            stop_tx,
            stopped_rx: Arc::new(Mutex::new(stopped_rx)),
            immediate_tx,
            pause_poke: Arc::clone(&pause_poke),
        });

        LoopChannels {
            results_tx,
            results_rx,
            stop_rx,
            stopped_tx,
            immediate_rx,
            pause_poke,
            broadcast,
        }
    }

    /// Drop the channel state and discard the broadcaster.
    pub fn reset(&self) {
        let state = self
            .state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(state) = state {
            state.broadcast.discard();
        }
    }

    pub fn broadcast(&self) -> Option<Broadcaster<T>> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.broadcast.clone())
    }

    pub fn stop_handles(&self) -> Option<(mpsc::Sender<()>, Arc<Mutex<mpsc::Receiver<()>>>)> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| (s.stop_tx.clone(), Arc::clone(&s.stopped_rx)))
    }

    pub fn immediate_tx(&self) -> Option<mpsc::Sender<Duration>> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.immediate_tx.clone())
    }

    pub fn pause_poke(&self) -> Option<Arc<Notify>> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| Arc::clone(&s.pause_poke))
    }
}

impl<T> Default for Bus<T> {
    fn default() -> Self {
        Self::new()
    }
}

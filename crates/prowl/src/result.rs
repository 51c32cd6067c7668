// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Broadcast payload of one pass

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use prowl_sync::PassOutcome;

use crate::error::CrawlError;
use crate::track::TrackingResult;

/// Everything one pass decided, fanned out to listeners.
#[derive(Debug, Clone)]
pub struct PassResult<H, D> {
    pub valid: bool,
    /// True when no orders and no entities were visited.
    pub idle: bool,
    /// First framework-level error; per-handle errors live in the tracking
    /// results instead.
    pub err: Option<CrawlError>,

    pub session_id: String,
    pub pass: u64,
    pub timestamp: DateTime<Utc>,

    pub orders: HashMap<H, TrackingResult<H, D>>,
    pub entities: HashMap<H, TrackingResult<H, D>>,
}

impl<H, D> PassResult<H, D> {
    pub(crate) fn new(session_id: String, pass: u64) -> Self {
        Self {
            valid: true,
            idle: true,
            err: None,
            session_id,
            pass,
            timestamp: Utc::now(),
            orders: HashMap::new(),
            entities: HashMap::new(),
        }
    }
}

impl<H, D> PassOutcome for PassResult<H, D> {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn is_idle(&self) -> bool {
        self.idle
    }
}

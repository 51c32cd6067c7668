// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Crawler tuning knobs

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-handle processing limits, replaced wholesale through the settings
/// cell. Attempt caps of zero mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerSettings {
    /// Upper bound for one order handler invocation; zero disables it.
    pub tracking_order_timeout: Duration,
    /// Orders processed more recently than this are skipped for the pass.
    pub minimum_tracking_order_delay: Duration,
    /// Consecutive order failures tolerated before removal.
    pub maximum_tracking_order_attempts: u32,

    /// Upper bound for one entity handler invocation; zero disables it.
    pub tracking_timeout: Duration,
    /// Entities refreshed more recently than this are skipped for the pass.
    pub minimum_tracking_delay: Duration,
    /// Consecutive refresh failures tolerated before removal.
    pub maximum_tracking_attempts: u32,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            tracking_order_timeout: Duration::from_secs(45),
            minimum_tracking_order_delay: Duration::from_secs(10),
            maximum_tracking_order_attempts: 3,

            tracking_timeout: Duration::from_secs(45),
            minimum_tracking_delay: Duration::from_secs(10),
            maximum_tracking_attempts: 10,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Error sentinels of the crawler core

use std::sync::Arc;

use thiserror::Error;

pub use prowl_sync::SessionError;

/// Everything a crawler call or a tracking step can fail with.
///
/// Results carry these by value, so the opaque handler variant is reference
/// counted to stay cheap to clone.
#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    #[error("invalid handle")]
    InvalidHandle,
    #[error("invalid tracking command")]
    InvalidCommand,
    #[error("no handler installed")]
    MissingHandler,
    #[error("exceeded tracking order timeout")]
    ExceededOrderTimeout,
    #[error("exceeded tracking timeout")]
    ExceededTrackingTimeout,
    #[error("pass cancelled")]
    Cancelled,
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Opaque failure returned by a user handler.
    #[error("{0}")]
    Handler(Arc<anyhow::Error>),
}

impl CrawlError {
    /// Wrap an arbitrary error as a handler failure.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Handler(Arc::new(err.into()))
    }

    /// Whether this is the handle-rejection sentinel, which bypasses the
    /// attempt cap and removes the entry outright.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::InvalidHandle)
    }
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        Self::Handler(Arc::new(err))
    }
}

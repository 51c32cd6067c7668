// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Error sentinels for the session engine and broadcaster

use thiserror::Error;

/// Errors surfaced by [`crate::Session`] lifecycle calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session is already active")]
    AlreadyActive,
    #[error("invalid session interval")]
    InvalidInterval,
    /// A pass outlived `single_pass_timeout`. Handlers observe this as
    /// cancellation of their pass token; the loop reports the cause.
    #[error("exceeded session pass timeout")]
    ExceededPassTimeout,
}

/// Errors surfaced by [`crate::Broadcaster`] delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BroadcastError {
    #[error("closed broadcast channel")]
    Closed,
    #[error("exceeded broadcast send timeout")]
    ExceededSendTimeout,
}

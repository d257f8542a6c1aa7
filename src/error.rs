// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error types for planning and signing.
//!
//! Verification never produces an error: a signature that is malformed,
//! does not close its ring, or reuses a key image simply verifies as
//! `false`. Unknown currencies are not an error either; they fall back to a
//! single-chunk split.

use crate::store::SessionError;

/// Errors raised by the mixing planner and the ring-signature engine.
#[derive(Debug, thiserror::Error)]
pub enum MixerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid mix request: {0}")]
    InvalidRequest(String),

    #[error("Invalid delay bound: {0} hours")]
    InvalidDelayBound(f64),

    #[error("Ring construction failed: {0}")]
    RingConstruction(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Custody error: {0}")]
    Custody(String),
}

impl MixerError {
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn ring_construction(message: impl Into<String>) -> Self {
        Self::RingConstruction(message.into())
    }

    /// Stable machine-readable code, used in audit records.
    pub fn error_code(&self) -> &'static str {
        match self {
            MixerError::InvalidAmount(_) => "invalid_amount",
            MixerError::InvalidRequest(_) => "invalid_request",
            MixerError::InvalidDelayBound(_) => "invalid_delay_bound",
            MixerError::RingConstruction(_) => "ring_construction_failure",
            MixerError::Session(_) => "session_error",
            MixerError::Custody(_) => "custody_error",
        }
    }
}

/// Result type for mixer operations.
pub type MixerResult<T> = Result<T, MixerError>;

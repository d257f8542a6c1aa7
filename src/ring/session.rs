// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing ceremony records.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::keys::{RingPublicKey, RingSignatureKey};
use crate::models::Currency;

/// Lifecycle of one signing ceremony.
///
/// `Preparing -> Signing -> Completed`, or `Failed` from either transient
/// state. Terminal states never change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Preparing,
    Signing,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Preparing, SessionStatus::Signing)
                | (SessionStatus::Preparing, SessionStatus::Failed)
                | (SessionStatus::Signing, SessionStatus::Completed)
                | (SessionStatus::Signing, SessionStatus::Failed)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Preparing => "PREPARING",
            SessionStatus::Signing => "SIGNING",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// One signing ceremony.
///
/// `participants` is the ring in signing order. `ring_keys` holds the same
/// members as public-key-only records: no private keys and no key images,
/// so nothing stored here singles out the real signer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingMixingSession {
    pub id: String,
    pub currency: Currency,
    pub amount: Decimal,
    pub participants: Vec<RingPublicKey>,
    pub ring_keys: Vec<RingSignatureKey>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl RingMixingSession {
    pub fn new(currency: Currency, amount: Decimal, ring: &[RingPublicKey]) -> Self {
        Self {
            id: format!("ring-{}", Uuid::new_v4().simple()),
            currency,
            amount,
            participants: ring.to_vec(),
            ring_keys: ring.iter().copied().map(RingSignatureKey::from_public).collect(),
            status: SessionStatus::Preparing,
            created_at: Utc::now(),
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoy selection.
//!
//! Freshly generated decoys hide nothing on-chain: an observer who knows
//! which outputs exist can tell them apart from real spends. A source that
//! samples historical outputs from a chain index plugs in behind
//! [`DecoySource`].

use std::collections::HashSet;

use rand::rngs::OsRng;

use super::keys::{RingPublicKey, RingSignatureKey};
use crate::error::{MixerError, MixerResult};
use crate::models::Currency;

/// Supplies public-only decoy keys for a ring.
pub trait DecoySource: Send + Sync {
    /// Return exactly `count` decoys, none equal to `real_public_key`.
    fn decoys(
        &self,
        currency: &Currency,
        real_public_key: &RingPublicKey,
        count: usize,
    ) -> MixerResult<Vec<RingSignatureKey>>;
}

/// Decoys made from freshly generated keypairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedDecoys;

impl DecoySource for GeneratedDecoys {
    fn decoys(
        &self,
        currency: &Currency,
        real_public_key: &RingPublicKey,
        count: usize,
    ) -> MixerResult<Vec<RingSignatureKey>> {
        Ok(generate_decoys(&mut OsRng, currency, real_public_key, count))
    }
}

/// `count` distinct public-only keys with key images, excluding
/// `real_public_key`.
pub fn generate_decoys<R: rand::RngCore + rand::CryptoRng>(
    rng: &mut R,
    currency: &Currency,
    real_public_key: &RingPublicKey,
    count: usize,
) -> Vec<RingSignatureKey> {
    let mut seen: HashSet<RingPublicKey> = HashSet::from([*real_public_key]);
    let mut decoys = Vec::with_capacity(count);
    while decoys.len() < count {
        let key = RingSignatureKey::generate(rng);
        if seen.insert(key.public_key) {
            decoys.push(key.public_only());
        }
    }

    tracing::debug!(currency = %currency, count, "Generated synthetic decoys");
    decoys
}

/// Fixed decoy pool, mostly useful for tests and replaying recorded rings.
#[derive(Debug, Clone, Default)]
pub struct StaticDecoys {
    pool: Vec<RingSignatureKey>,
}

impl StaticDecoys {
    pub fn new(pool: Vec<RingSignatureKey>) -> Self {
        Self {
            pool: pool.iter().map(RingSignatureKey::public_only).collect(),
        }
    }
}

impl DecoySource for StaticDecoys {
    fn decoys(
        &self,
        currency: &Currency,
        real_public_key: &RingPublicKey,
        count: usize,
    ) -> MixerResult<Vec<RingSignatureKey>> {
        let picked: Vec<RingSignatureKey> = self
            .pool
            .iter()
            .filter(|key| key.public_key != *real_public_key)
            .take(count)
            .cloned()
            .collect();

        if picked.len() < count {
            return Err(MixerError::ring_construction(format!(
                "decoy pool for {currency} has {} usable keys, need {count}",
                picked.len()
            )));
        }
        Ok(picked)
    }
}

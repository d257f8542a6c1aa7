// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-chunk payout signing.
//!
//! When the scheduler releases a chunk it asks [`PayoutSigner`] for a ring
//! signature over that chunk's payout message, then calls
//! [`PayoutSigner::verify_for_broadcast`] once before handing the payout to
//! transport. A payout that fails verification is withheld.

use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::custody::KeyCustody;
use crate::error::{MixerError, MixerResult};
use crate::models::MixingPlan;
use crate::ring::{DecoySource, RingSignatureEngine, SignatureResult};

const PAYOUT_DOMAIN: &[u8] = b"relational-mixer/payout/v1";

/// Digest signed for chunk `index` of `plan`.
///
/// Binds the mix request, chunk index, currency, exact amount and
/// destination.
pub fn payout_message(plan: &MixingPlan, index: usize) -> MixerResult<[u8; 32]> {
    let (Some(amount), Some(destination)) = (plan.chunks.get(index), plan.destinations.get(index))
    else {
        return Err(MixerError::invalid_request(format!(
            "chunk {index} outside plan of {}",
            plan.len()
        )));
    };

    let amount = amount.normalize().to_string();
    let mut hasher = Sha256::new();
    hasher.update(PAYOUT_DOMAIN);
    hasher.update(plan.mix_request_id.as_bytes());
    hasher.update((index as u64).to_le_bytes());
    for field in [plan.currency.as_str(), amount.as_str(), destination.as_str()] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

/// A signed chunk payout awaiting broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedPayout {
    pub mix_request_id: Uuid,
    pub chunk_index: usize,
    pub amount: Decimal,
    pub destination: String,
    #[serde(with = "hex::serde")]
    pub message: [u8; 32],
    pub signature: SignatureResult,
}

pub struct PayoutSigner {
    engine: Arc<RingSignatureEngine>,
    custody: Arc<dyn KeyCustody>,
    decoys: Arc<dyn DecoySource>,
}

impl PayoutSigner {
    pub fn new(
        engine: Arc<RingSignatureEngine>,
        custody: Arc<dyn KeyCustody>,
        decoys: Arc<dyn DecoySource>,
    ) -> Self {
        Self {
            engine,
            custody,
            decoys,
        }
    }

    /// Sign chunk `index` of `plan` with the custody key `key_id`.
    pub fn sign_chunk<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        plan: &MixingPlan,
        index: usize,
        key_id: &str,
    ) -> MixerResult<SignedPayout> {
        let message = payout_message(plan, index)?;
        let real_key = self.custody.signing_key(key_id)?;
        let decoy_count = self.engine.decoy_count();
        let decoys = self
            .decoys
            .decoys(&plan.currency, &real_key.public_key, decoy_count)?;

        let amount = plan.chunks[index];
        let signature = self.engine.create_ring_signature(
            rng,
            &message,
            &real_key,
            &decoys,
            &plan.currency,
            amount,
        )?;

        Ok(SignedPayout {
            mix_request_id: plan.mix_request_id,
            chunk_index: index,
            amount,
            destination: plan.destinations[index].clone(),
            message,
            signature,
        })
    }

    /// Final gate before broadcast. Consumes the payout's key image on
    /// success, so a second call for the same key returns `false`.
    pub fn verify_for_broadcast(&self, plan: &MixingPlan, payout: &SignedPayout) -> bool {
        let expected = match payout_message(plan, payout.chunk_index) {
            Ok(message) => message,
            Err(_) => return false,
        };
        if payout.mix_request_id != plan.mix_request_id || expected != payout.message {
            tracing::warn!(
                mix_request_id = %plan.mix_request_id,
                chunk_index = payout.chunk_index,
                "Payout does not match its plan"
            );
            return false;
        }

        self.engine.verify_ring_signature(
            &payout.message,
            &payout.signature.signature,
            &payout.signature.ring_keys,
            &payout.signature.key_image,
        )
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ring signature engine.
//!
//! Builds signing ceremonies around [`lsag`](super::lsag): assembles and
//! shuffles the ring, records the session, and on verification consults the
//! shared key-image registry so a key can only pass once.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::{CryptoRng, RngCore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::decoy::generate_decoys;
use super::key_image::KeyImageRegistry;
use super::keys::{KeyImage, RingPublicKey, RingSignatureKey, SecretKey};
use super::lsag::{self, RingSignature, Verdict};
use super::session::{RingMixingSession, SessionStatus};
use crate::config::MixerConfig;
use crate::error::{MixerError, MixerResult};
use crate::models::Currency;
use crate::observer::{MixerObserver, NoopObserver};
use crate::store::SessionStore;

/// A finished signature and the ring it was made over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureResult {
    pub session_id: String,
    pub signature: RingSignature,
    pub key_image: KeyImage,
    /// Ring members in signing order.
    pub ring_keys: Vec<RingPublicKey>,
}

pub struct RingSignatureEngine {
    decoy_count: usize,
    key_images: Arc<dyn KeyImageRegistry>,
    sessions: Arc<dyn SessionStore>,
    observer: Arc<dyn MixerObserver>,
}

impl RingSignatureEngine {
    pub fn new(
        config: &MixerConfig,
        key_images: Arc<dyn KeyImageRegistry>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            decoy_count: config.decoy_count(),
            key_images,
            sessions,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn MixerObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Ring size including the real signer.
    pub fn ring_size(&self) -> usize {
        self.decoy_count + 1
    }

    pub fn decoy_count(&self) -> usize {
        self.decoy_count
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn key_images(&self) -> &Arc<dyn KeyImageRegistry> {
        &self.key_images
    }

    /// Sign `message` with `real_key` hidden among `decoys`.
    ///
    /// The ring is shuffled uniformly and recorded as a `PREPARING` session
    /// before it is checked, so every ceremony that reaches the store ends
    /// `COMPLETED` or `FAILED`. Any failure is logged, marks the session
    /// `FAILED`, and is returned; no partial signature escapes.
    pub fn create_ring_signature<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        message: &[u8],
        real_key: &RingSignatureKey,
        decoys: &[RingSignatureKey],
        currency: &Currency,
        amount: Decimal,
    ) -> MixerResult<SignatureResult> {
        let mut ring_keys: Vec<RingPublicKey> = std::iter::once(real_key)
            .chain(decoys)
            .map(|key| key.public_key)
            .collect();
        ring_keys.shuffle(rng);

        let session = RingMixingSession::new(currency.clone(), amount, &ring_keys);
        let session_id = session.id.clone();
        if let Err(err) = self.sessions.insert(session) {
            return Err(self.report_failure(None, err.into()));
        }

        let signed = check_ring(real_key, decoys)
            .and_then(|secret| {
                let real_index = ring_keys
                    .iter()
                    .position(|key| *key == real_key.public_key)
                    .ok_or_else(|| {
                        MixerError::ring_construction("real key missing from shuffled ring")
                    })?;
                self.sessions
                    .update_status(&session_id, SessionStatus::Signing)?;
                lsag::sign(rng, message, &ring_keys, real_index, secret)
            })
            .and_then(|signed| {
                let session = self
                    .sessions
                    .update_status(&session_id, SessionStatus::Completed)?;
                Ok((signed, session))
            });

        let ((signature, key_image), session) = match signed {
            Ok(done) => done,
            Err(err) => {
                if let Err(mark_err) = self
                    .sessions
                    .update_status(&session_id, SessionStatus::Failed)
                {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %mark_err,
                        "Could not mark signing session failed"
                    );
                }
                return Err(self.report_failure(Some(&session_id), err));
            }
        };

        tracing::info!(
            session_id = %session_id,
            currency = %currency,
            ring_size = ring_keys.len(),
            "Ring signature created"
        );
        self.observer.signature_created(&session, &key_image);

        Ok(SignatureResult {
            session_id,
            signature,
            key_image,
            ring_keys,
        })
    }

    fn report_failure(&self, session_id: Option<&str>, err: MixerError) -> MixerError {
        tracing::error!(
            session_id = session_id.unwrap_or("-"),
            error = %err,
            "Ring signature construction failed"
        );
        self.observer.signature_failed(session_id, &err);
        err
    }

    /// Verify and consume: `true` only for a valid signature whose key image
    /// has never been accepted before.
    pub fn verify_ring_signature(
        &self,
        message: &[u8],
        signature: &RingSignature,
        ring_keys: &[RingPublicKey],
        key_image: &KeyImage,
    ) -> bool {
        self.verify_with_verdict(message, signature, ring_keys, key_image)
            .is_accepted()
    }

    /// Same as [`verify_ring_signature`](Self::verify_ring_signature) but
    /// reports why a signature was rejected.
    pub fn verify_with_verdict(
        &self,
        message: &[u8],
        signature: &RingSignature,
        ring_keys: &[RingPublicKey],
        key_image: &KeyImage,
    ) -> Verdict {
        let verdict = match lsag::verify(message, signature, ring_keys, key_image) {
            Verdict::Accepted if self.key_images.claim(key_image) => Verdict::Accepted,
            Verdict::Accepted => {
                tracing::warn!(key_image = %key_image, "Key image replay rejected");
                Verdict::Replayed
            }
            rejected => {
                tracing::debug!(
                    key_image = %key_image,
                    verdict = ?rejected,
                    ring_size = ring_keys.len(),
                    "Ring signature rejected"
                );
                rejected
            }
        };

        self.observer.verification_completed(key_image, verdict);
        verdict
    }

    /// `ring_size - 1` fresh public-only decoys for `real_public_key`.
    pub fn generate_decoy_keys<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        currency: &Currency,
        real_public_key: &RingPublicKey,
    ) -> Vec<RingSignatureKey> {
        generate_decoys(rng, currency, real_public_key, self.decoy_count)
    }
}

/// Check the real key against its private half and the ring for
/// duplicate members.
fn check_ring<'a>(
    real_key: &'a RingSignatureKey,
    decoys: &[RingSignatureKey],
) -> MixerResult<&'a SecretKey> {
    let secret = real_key
        .private_key
        .as_ref()
        .ok_or_else(|| MixerError::ring_construction("real key has no private key"))?;

    if secret.public_key() != real_key.public_key {
        return Err(MixerError::ring_construction(
            "real key's public key does not match its private key",
        ));
    }
    if let Some(image) = real_key.key_image {
        if image != secret.key_image() {
            return Err(MixerError::ring_construction(
                "real key's key image does not match its private key",
            ));
        }
    }
    if decoys.is_empty() {
        return Err(MixerError::ring_construction("ring needs at least one decoy"));
    }

    let mut seen = HashSet::with_capacity(decoys.len() + 1);
    for key in std::iter::once(real_key).chain(decoys) {
        if !seen.insert(key.public_key) {
            return Err(MixerError::ring_construction(format!(
                "duplicate ring member {}",
                key.public_key
            )));
        }
    }

    Ok(secret)
}

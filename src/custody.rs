// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key custody boundary.
//!
//! The real signer's key lives with a custody collaborator (wallet service,
//! HSM). The signer asks for it by id right before signing and drops it
//! afterwards; nothing in this crate persists private material.

use std::collections::HashMap;
use std::sync::RwLock;

use rand::{CryptoRng, RngCore};

use crate::error::{MixerError, MixerResult};
use crate::ring::{RingPublicKey, RingSignatureKey, SecretKey};

/// Supplies signing keys by id.
pub trait KeyCustody: Send + Sync {
    /// Full signing key (private key and key image) for `key_id`.
    fn signing_key(&self, key_id: &str) -> MixerResult<RingSignatureKey>;
}

/// In-process custody for tests and single-node deployments.
#[derive(Debug, Default)]
pub struct LocalCustody {
    keys: RwLock<HashMap<String, SecretKey>>,
}

impl LocalCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `secret` under `key_id`, replacing any previous key.
    pub fn insert(&self, key_id: impl Into<String>, secret: SecretKey) -> MixerResult<RingPublicKey> {
        let public_key = secret.public_key();
        self.keys
            .write()
            .map_err(|_| MixerError::Custody("key store lock poisoned".to_string()))?
            .insert(key_id.into(), secret);
        Ok(public_key)
    }

    /// Generate and store a fresh key.
    pub fn generate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        key_id: impl Into<String>,
    ) -> MixerResult<RingPublicKey> {
        self.insert(key_id, SecretKey::random(rng))
    }
}

impl KeyCustody for LocalCustody {
    fn signing_key(&self, key_id: &str) -> MixerResult<RingSignatureKey> {
        let keys = self
            .keys
            .read()
            .map_err(|_| MixerError::Custody("key store lock poisoned".to_string()))?;
        keys.get(key_id)
            .cloned()
            .map(RingSignatureKey::from_secret)
            .ok_or_else(|| MixerError::Custody(format!("unknown key id {key_id}")))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn returns_stored_key() {
        let custody = LocalCustody::new();
        let mut rng = StdRng::seed_from_u64(1);
        let public_key = custody.generate(&mut rng, "output-7").unwrap();

        let key = custody.signing_key("output-7").unwrap();
        assert_eq!(key.public_key, public_key);
        assert!(key.has_private_key());
        assert!(key.key_image.is_some());
    }

    #[test]
    fn unknown_id_is_custody_error() {
        let custody = LocalCustody::new();
        let err = custody.signing_key("missing").unwrap_err();
        assert_eq!(err.error_code(), "custody_error");
    }
}

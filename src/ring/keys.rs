// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ring member keys and key images over Ristretto255.
//!
//! A member key is a scalar `x` with public point `P = x·G`. Its key image is
//! `I = x·Hp(P)`, where `Hp` hashes the compressed public key onto the group.
//! The image is stable for a given private key, which is what lets a verifier
//! detect reuse without learning which ring member signed.

use std::fmt;

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

const HASH_TO_POINT_DOMAIN: &[u8] = b"relational-mixer/hash-to-point/v1";

/// Hash a compressed public key onto the Ristretto group.
pub(crate) fn hash_to_point(public_key: &RingPublicKey) -> RistrettoPoint {
    let mut hasher = Sha512::new();
    hasher.update(HASH_TO_POINT_DOMAIN);
    hasher.update(public_key.as_bytes());
    RistrettoPoint::from_hash(hasher)
}

// =============================================================================
// Secret Key
// =============================================================================

/// Private signing scalar.
///
/// Deliberately neither `Serialize` nor printable: the `Debug` output is
/// redacted and the raw scalar is only reachable inside the crate.
#[derive(Clone)]
pub struct SecretKey(Scalar);

impl SecretKey {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        SecretKey(Scalar::random(rng))
    }

    /// Load a canonical little-endian scalar. Returns `None` for
    /// non-canonical encodings and for zero.
    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        let scalar: Option<Scalar> = Scalar::from_canonical_bytes(bytes).into();
        scalar.filter(|s| *s != Scalar::ZERO).map(SecretKey)
    }

    pub fn public_key(&self) -> RingPublicKey {
        let point = &self.0 * RISTRETTO_BASEPOINT_TABLE;
        RingPublicKey(point.compress().to_bytes())
    }

    pub fn key_image(&self) -> KeyImage {
        let point = self.0 * hash_to_point(&self.public_key());
        KeyImage(point.compress().to_bytes())
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

// =============================================================================
// Public Key / Key Image
// =============================================================================

/// Compressed Ristretto public key, hex-encoded on the wire.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RingPublicKey(#[serde(with = "hex::serde")] [u8; 32]);

impl RingPublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        RingPublicKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decode the point; `None` if the bytes are not a valid encoding.
    pub fn decompress(&self) -> Option<RistrettoPoint> {
        CompressedRistretto(self.0).decompress()
    }
}

impl fmt::Debug for RingPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RingPublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for RingPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Compressed key image `x·Hp(P)`, hex-encoded on the wire.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct KeyImage(#[serde(with = "hex::serde")] [u8; 32]);

impl KeyImage {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        KeyImage(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn decompress(&self) -> Option<RistrettoPoint> {
        CompressedRistretto(self.0).decompress()
    }
}

impl fmt::Debug for KeyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyImage({})", hex::encode(self.0))
    }
}

impl fmt::Display for KeyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// =============================================================================
// Ring Signature Key
// =============================================================================

/// One ring member.
///
/// The private key is present only for the real signer and is never
/// serialized. Decoys carry a public key and, optionally, a key image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingSignatureKey {
    pub public_key: RingPublicKey,
    #[serde(skip)]
    pub private_key: Option<SecretKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_image: Option<KeyImage>,
}

impl RingSignatureKey {
    /// Fresh keypair with its key image.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_secret(SecretKey::random(rng))
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        Self {
            public_key: secret.public_key(),
            key_image: Some(secret.key_image()),
            private_key: Some(secret),
        }
    }

    /// Record carrying nothing but `public_key`.
    pub fn from_public(public_key: RingPublicKey) -> Self {
        Self {
            public_key,
            private_key: None,
            key_image: None,
        }
    }

    /// Copy of this record with the private key dropped.
    pub fn public_only(&self) -> Self {
        Self {
            public_key: self.public_key,
            private_key: None,
            key_image: self.key_image,
        }
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn key_image_is_stable_per_secret() {
        let mut rng = StdRng::seed_from_u64(7);
        let secret = SecretKey::random(&mut rng);
        assert_eq!(secret.key_image(), secret.key_image());

        let restored = SecretKey::from_bytes(secret.scalar().to_bytes()).unwrap();
        assert_eq!(restored.public_key(), secret.public_key());
        assert_eq!(restored.key_image(), secret.key_image());

        let other = SecretKey::random(&mut rng);
        assert_ne!(other.key_image(), secret.key_image());
    }

    #[test]
    fn rejects_zero_and_non_canonical_scalars() {
        assert!(SecretKey::from_bytes([0u8; 32]).is_none());
        assert!(SecretKey::from_bytes([0xff; 32]).is_none());
    }

    #[test]
    fn public_keys_decompress() {
        let mut rng = StdRng::seed_from_u64(8);
        let key = RingSignatureKey::generate(&mut rng);
        assert!(key.public_key.decompress().is_some());
        assert!(key.key_image.unwrap().decompress().is_some());
        assert!(RingPublicKey::from_bytes([0xff; 32]).decompress().is_none());
    }

    #[test]
    fn serialization_never_contains_private_key() {
        let mut rng = StdRng::seed_from_u64(9);
        let key = RingSignatureKey::generate(&mut rng);
        let json = serde_json::to_value(&key).unwrap();

        assert!(json.get("private_key").is_none());
        assert_eq!(json["public_key"], hex::encode(key.public_key.as_bytes()));

        let back: RingSignatureKey = serde_json::from_value(json).unwrap();
        assert_eq!(back.public_key, key.public_key);
        assert_eq!(back.key_image, key.key_image);
        assert!(!back.has_private_key());
    }

    #[test]
    fn debug_output_is_redacted() {
        let mut rng = StdRng::seed_from_u64(10);
        let key = RingSignatureKey::generate(&mut rng);
        let printed = format!("{:?}", key);
        assert!(printed.contains("<redacted>"));
        assert!(!key.public_only().has_private_key());
    }
}

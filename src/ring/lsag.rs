// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Linkable spontaneous anonymous group (LSAG) signatures.
//!
//! For a ring `P_0..P_{n-1}`, key image `I` and message `m`, every index
//! satisfies
//!
//! ```text
//! L_i     = s_i·G + c_i·P_i
//! R_i     = s_i·Hp(P_i) + c_i·I
//! c_{i+1} = H(tag, n, P_0..P_{n-1}, I, m, L_i, R_i)
//! ```
//!
//! with indices taken modulo `n`. The signer starts the chain at its own
//! index from an ephemeral `α` and closes it with `s_π = α - c_π·x`. The full
//! challenge and response vectors are published so a verifier can check
//! every link, not only the loop closure.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use super::keys::{hash_to_point, KeyImage, RingPublicKey, SecretKey};
use crate::error::{MixerError, MixerResult};

const CHALLENGE_DOMAIN: &[u8] = b"relational-mixer/lsag-challenge/v1";

/// Challenge and response vectors, one entry per ring member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RingSignature {
    #[serde(with = "hex_scalars")]
    pub c: Vec<[u8; 32]>,
    #[serde(with = "hex_scalars")]
    pub s: Vec<[u8; 32]>,
}

impl RingSignature {
    pub fn len(&self) -> usize {
        self.c.len()
    }

    pub fn is_empty(&self) -> bool {
        self.c.is_empty()
    }
}

/// Outcome of a verification.
///
/// Callers of the engine only ever see `bool`; the reason is reported to
/// the observer and the logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    /// Wrong vector lengths, non-canonical scalars or undecodable points.
    Malformed,
    /// Well-formed but the challenge chain does not close.
    InvalidSignature,
    /// Valid signature whose key image was already used.
    Replayed,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

/// Hash state shared by every challenge of one signature.
fn transcript(ring: &[RingPublicKey], key_image: &KeyImage, message: &[u8]) -> Sha512 {
    let mut hasher = Sha512::new();
    hasher.update(CHALLENGE_DOMAIN);
    hasher.update((ring.len() as u64).to_le_bytes());
    for member in ring {
        hasher.update(member.as_bytes());
    }
    hasher.update(key_image.as_bytes());
    hasher.update((message.len() as u64).to_le_bytes());
    hasher.update(message);
    hasher
}

fn challenge(prefix: &Sha512, l: &RistrettoPoint, r: &RistrettoPoint) -> Scalar {
    let mut hasher = prefix.clone();
    hasher.update(l.compress().as_bytes());
    hasher.update(r.compress().as_bytes());
    Scalar::from_hash(hasher)
}

/// Sign `message` as ring member `real_index`.
///
/// `secret` must be the private key of `ring[real_index]`.
pub fn sign<R: RngCore + CryptoRng>(
    rng: &mut R,
    message: &[u8],
    ring: &[RingPublicKey],
    real_index: usize,
    secret: &SecretKey,
) -> MixerResult<(RingSignature, KeyImage)> {
    let n = ring.len();
    if real_index >= n {
        return Err(MixerError::ring_construction(format!(
            "signer index {real_index} outside ring of {n}"
        )));
    }
    if ring[real_index] != secret.public_key() {
        return Err(MixerError::ring_construction(
            "private key does not match the signer's ring entry",
        ));
    }

    let points = ring
        .iter()
        .map(|member| {
            member.decompress().ok_or_else(|| {
                MixerError::ring_construction(format!("ring key {member} is not a valid point"))
            })
        })
        .collect::<MixerResult<Vec<_>>>()?;
    let hashed: Vec<RistrettoPoint> = ring.iter().map(hash_to_point).collect();

    let x = secret.scalar();
    let image_point = x * hashed[real_index];
    let key_image = KeyImage::from_bytes(image_point.compress().to_bytes());
    let prefix = transcript(ring, &key_image, message);

    let mut c = vec![Scalar::ZERO; n];
    let mut s = vec![Scalar::ZERO; n];

    let alpha = Scalar::random(rng);
    let l = &alpha * RISTRETTO_BASEPOINT_TABLE;
    let r = alpha * hashed[real_index];
    c[(real_index + 1) % n] = challenge(&prefix, &l, &r);

    let mut i = (real_index + 1) % n;
    while i != real_index {
        s[i] = Scalar::random(rng);
        let l = &s[i] * RISTRETTO_BASEPOINT_TABLE + c[i] * points[i];
        let r = s[i] * hashed[i] + c[i] * image_point;
        c[(i + 1) % n] = challenge(&prefix, &l, &r);
        i = (i + 1) % n;
    }

    s[real_index] = alpha - c[real_index] * x;

    let signature = RingSignature {
        c: c.iter().map(Scalar::to_bytes).collect(),
        s: s.iter().map(Scalar::to_bytes).collect(),
    };
    Ok((signature, key_image))
}

fn canonical_scalars(encoded: &[[u8; 32]]) -> Option<Vec<Scalar>> {
    encoded
        .iter()
        .map(|bytes| Option::<Scalar>::from(Scalar::from_canonical_bytes(*bytes)))
        .collect()
}

/// Check the challenge chain. Does not consult or touch any key-image set.
pub fn verify(
    message: &[u8],
    signature: &RingSignature,
    ring: &[RingPublicKey],
    key_image: &KeyImage,
) -> Verdict {
    let n = ring.len();
    if n == 0 || signature.c.len() != n || signature.s.len() != n {
        return Verdict::Malformed;
    }

    let (Some(c), Some(s)) = (
        canonical_scalars(&signature.c),
        canonical_scalars(&signature.s),
    ) else {
        return Verdict::Malformed;
    };
    let Some(points) = ring
        .iter()
        .map(RingPublicKey::decompress)
        .collect::<Option<Vec<_>>>()
    else {
        return Verdict::Malformed;
    };
    let image_point = match key_image.decompress() {
        Some(point) if point != RistrettoPoint::identity() => point,
        _ => return Verdict::Malformed,
    };

    let prefix = transcript(ring, key_image, message);
    for i in 0..n {
        let l = RistrettoPoint::vartime_double_scalar_mul_basepoint(&c[i], &points[i], &s[i]);
        let r = s[i] * hash_to_point(&ring[i]) + c[i] * image_point;
        if challenge(&prefix, &l, &r) != c[(i + 1) % n] {
            return Verdict::InvalidSignature;
        }
    }

    Verdict::Accepted
}

mod hex_scalars {
    use hex::FromHex;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[[u8; 32]], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<[u8; 32]>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|value| <[u8; 32]>::from_hex(value).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::ring::RingSignatureKey;

    fn ring_of(rng: &mut StdRng, n: usize) -> (Vec<RingPublicKey>, Vec<SecretKey>) {
        let secrets: Vec<SecretKey> = (0..n).map(|_| SecretKey::random(rng)).collect();
        (secrets.iter().map(SecretKey::public_key).collect(), secrets)
    }

    #[test]
    fn signs_and_verifies_at_every_position() {
        let mut rng = StdRng::seed_from_u64(1);
        let (ring, secrets) = ring_of(&mut rng, 5);

        for (index, secret) in secrets.iter().enumerate() {
            let (sig, image) = sign(&mut rng, b"payout", &ring, index, secret).unwrap();
            assert_eq!(sig.c.len(), 5);
            assert_eq!(sig.s.len(), 5);
            assert_eq!(image, secret.key_image());
            assert_eq!(verify(b"payout", &sig, &ring, &image), Verdict::Accepted);
        }
    }

    #[test]
    fn single_member_ring_is_a_plain_signature() {
        let mut rng = StdRng::seed_from_u64(2);
        let (ring, secrets) = ring_of(&mut rng, 1);
        let (sig, image) = sign(&mut rng, b"m", &ring, 0, &secrets[0]).unwrap();
        assert!(verify(b"m", &sig, &ring, &image).is_accepted());
    }

    #[test]
    fn wrong_message_or_ring_fails() {
        let mut rng = StdRng::seed_from_u64(3);
        let (ring, secrets) = ring_of(&mut rng, 4);
        let (sig, image) = sign(&mut rng, b"original", &ring, 2, &secrets[2]).unwrap();

        assert_eq!(
            verify(b"tampered", &sig, &ring, &image),
            Verdict::InvalidSignature
        );

        let mut reordered = ring.clone();
        reordered.swap(0, 1);
        assert_eq!(
            verify(b"original", &sig, &reordered, &image),
            Verdict::InvalidSignature
        );
    }

    #[test]
    fn foreign_key_image_fails() {
        let mut rng = StdRng::seed_from_u64(4);
        let (ring, secrets) = ring_of(&mut rng, 3);
        let (sig, _) = sign(&mut rng, b"m", &ring, 0, &secrets[0]).unwrap();
        let other = RingSignatureKey::generate(&mut rng).key_image.unwrap();
        assert_eq!(verify(b"m", &sig, &ring, &other), Verdict::InvalidSignature);
    }

    #[test]
    fn tampered_response_fails() {
        let mut rng = StdRng::seed_from_u64(5);
        let (ring, secrets) = ring_of(&mut rng, 3);
        let (mut sig, image) = sign(&mut rng, b"m", &ring, 1, &secrets[1]).unwrap();
        sig.s[2][0] ^= 0x01;
        assert!(!verify(b"m", &sig, &ring, &image).is_accepted());
    }

    #[test]
    fn malformed_inputs_are_reported() {
        let mut rng = StdRng::seed_from_u64(6);
        let (ring, secrets) = ring_of(&mut rng, 3);
        let (sig, image) = sign(&mut rng, b"m", &ring, 0, &secrets[0]).unwrap();

        let mut short = sig.clone();
        short.s.pop();
        assert_eq!(verify(b"m", &short, &ring, &image), Verdict::Malformed);

        let mut non_canonical = sig.clone();
        non_canonical.c[1] = [0xff; 32];
        assert_eq!(verify(b"m", &non_canonical, &ring, &image), Verdict::Malformed);

        let identity = KeyImage::from_bytes([0u8; 32]);
        assert_eq!(verify(b"m", &sig, &ring, &identity), Verdict::Malformed);

        let mut bad_ring = ring.clone();
        bad_ring[2] = RingPublicKey::from_bytes([0xff; 32]);
        assert_eq!(verify(b"m", &sig, &bad_ring, &image), Verdict::Malformed);

        let empty = RingSignature { c: vec![], s: vec![] };
        assert_eq!(verify(b"m", &empty, &[], &image), Verdict::Malformed);
    }

    #[test]
    fn signing_rejects_mismatched_secret_and_index() {
        let mut rng = StdRng::seed_from_u64(7);
        let (ring, secrets) = ring_of(&mut rng, 3);
        assert!(matches!(
            sign(&mut rng, b"m", &ring, 1, &secrets[0]),
            Err(MixerError::RingConstruction(_))
        ));
        assert!(matches!(
            sign(&mut rng, b"m", &ring, 3, &secrets[0]),
            Err(MixerError::RingConstruction(_))
        ));
    }

    #[test]
    fn signature_serializes_as_hex() {
        let mut rng = StdRng::seed_from_u64(8);
        let (ring, secrets) = ring_of(&mut rng, 2);
        let (sig, _) = sign(&mut rng, b"m", &ring, 0, &secrets[0]).unwrap();

        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json["c"][0], hex::encode(sig.c[0]));
        let back: RingSignature = serde_json::from_value(json).unwrap();
        assert_eq!(back, sig);
    }
}

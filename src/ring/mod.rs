// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Linkable ring signatures for chunk payouts.
//!
//! - [`keys`]: member keys, key images and hash-to-point
//! - [`lsag`]: the signature scheme itself
//! - [`key_image`]: registry of spent key images
//! - [`session`]: signing ceremony records and their lifecycle
//! - [`decoy`]: where decoy ring members come from
//! - [`engine`]: ties the above together

pub mod decoy;
pub mod engine;
pub mod key_image;
pub mod keys;
pub mod lsag;
pub mod session;

pub use decoy::{DecoySource, GeneratedDecoys, StaticDecoys};
pub use engine::{RingSignatureEngine, SignatureResult};
pub use key_image::{InMemoryKeyImageSet, KeyImageRegistry};
pub use keys::{KeyImage, RingPublicKey, RingSignatureKey, SecretKey};
pub use lsag::{RingSignature, Verdict};
pub use session::{RingMixingSession, SessionStatus};

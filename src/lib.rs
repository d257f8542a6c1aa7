// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Mixer - Mixing Plans and Linkable Ring Signatures
//!
//! This crate decides how a deposit is split, delayed and staged, and signs
//! each chunk payout with a linkable ring signature whose key image blocks
//! reuse of the same key.
//!
//! ## Modules
//!
//! - `mixing` - Denomination split, delay sampling, hop routes, plan building
//! - `ring` - LSAG signatures over Ristretto255, key images, signing sessions
//! - `payout` - Per-chunk payout messages and the broadcast gate
//! - `custody` - Key custody boundary
//! - `store` - Signing session storage
//! - `observer` / `audit` - Outcome reporting and the audit trail

pub mod audit;
pub mod config;
pub mod custody;
pub mod error;
pub mod mixing;
pub mod models;
pub mod observer;
pub mod payout;
pub mod ring;
pub mod store;
pub mod telemetry;

pub use error::{MixerError, MixerResult};

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Synthetic hop routes.
//!
//! Hops are logical staging markers for the scheduler, not network
//! addresses. Each chunk gets two to four of them.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

/// Hop counts a route may have.
pub const HOP_COUNTS: [usize; 3] = [2, 3, 4];

/// Opaque identifier of one forwarding stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct HopId(Uuid);

impl HopId {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        HopId(Builder::from_random_bytes(rng.gen()).into_uuid())
    }
}

impl fmt::Display for HopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hop-{}", self.0.simple())
    }
}

/// Generates per-chunk hop routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGenerator;

impl RouteGenerator {
    /// One route per chunk, each with a uniformly chosen length from
    /// [`HOP_COUNTS`].
    pub fn routes<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Vec<HopId>> {
        (0..count)
            .map(|_| {
                let hops = HOP_COUNTS[rng.gen_range(0..HOP_COUNTS.len())];
                (0..hops).map(|_| HopId::random(rng)).collect()
            })
            .collect()
    }
}

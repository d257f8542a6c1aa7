// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mixing plan generation.
//!
//! A mix request flows through four independent stages:
//!
//! ```text
//! MixRequest ─▶ DenominationSplitter ─▶ DelaySampler ─▶ RouteGenerator ─▶ allocation ─▶ MixingPlan
//!                (chunk amounts)        (release hours)  (hop stages)      (destinations)
//! ```
//!
//! Every stage takes its randomness from a caller-supplied RNG so plans are
//! reproducible under a seeded generator.

pub mod allocation;
pub mod delay;
pub mod denominations;
pub mod planner;
pub mod route;
pub mod splitter;

pub use allocation::allocate_destinations;
pub use delay::DelaySampler;
pub use denominations::DenominationTable;
pub use planner::MixingPlanner;
pub use route::{HopId, RouteGenerator};
pub use splitter::{DenominationSplitter, SplitOutcome};

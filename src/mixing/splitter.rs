// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Denomination splitting.
//!
//! An amount is broken into standard denominations picked uniformly from
//! the ones that still fit, then each chunk is jittered by up to ±5% so the
//! outputs do not line up with the table exactly.
//!
//! ## Sum Guarantees
//!
//! - The drawn denominations (before jitter) sum to the requested amount
//!   exactly. A remainder at or below [`SPLIT_EPSILON`] left after the draw
//!   loop is folded into the last drawn chunk instead of being dropped.
//! - Every chunk stays inside its band: within [`PERTURBATION_BAND`] of its
//!   drawn value, with the band width truncated to [`AMOUNT_SCALE`] places.
//! - The jittered chunks are reconciled so they also sum to the amount
//!   exactly. The bands of the drawn values always contain the amount, so
//!   the drift can be absorbed without leaving any band.
//!
//! Amounts above [`MAX_AMOUNT`], or splits needing more than
//! [`MAX_SPLIT_CHUNKS`] chunks, are rejected.

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::DenominationTable;
use crate::config::{
    AMOUNT_SCALE, MAX_AMOUNT, MAX_SPLIT_CHUNKS, PERTURBATION_BAND, PERTURBATION_RATIO,
    SPLIT_EPSILON,
};
use crate::error::{MixerError, MixerResult};
use crate::models::Currency;

/// Result of splitting one amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Values drawn from the denomination table, before jitter.
    pub denominations: Vec<Decimal>,
    /// Jittered, reconciled chunk amounts. Same length as `denominations`.
    pub chunks: Vec<Decimal>,
}

/// Splits amounts into jittered standard denominations.
#[derive(Debug, Clone)]
pub struct DenominationSplitter {
    table: DenominationTable,
}

impl Default for DenominationSplitter {
    fn default() -> Self {
        Self::new(DenominationTable::standard())
    }
}

impl DenominationSplitter {
    pub fn new(table: DenominationTable) -> Self {
        Self { table }
    }

    /// Split `amount` of `currency` into chunks.
    ///
    /// Unknown currencies produce a single chunk holding the full amount.
    pub fn split<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        amount: Decimal,
        currency: &Currency,
    ) -> MixerResult<SplitOutcome> {
        if amount <= Decimal::ZERO {
            return Err(MixerError::invalid_amount(format!(
                "cannot split non-positive amount {amount}"
            )));
        }
        if amount > MAX_AMOUNT {
            return Err(MixerError::invalid_amount(format!(
                "amount {amount} exceeds the limit of {MAX_AMOUNT}"
            )));
        }

        let denominations = match self.table.get(currency) {
            Some(table) => draw_denominations(rng, amount, table)?,
            None => {
                tracing::warn!(
                    currency = %currency,
                    "No denomination table for currency, using a single chunk"
                );
                vec![amount]
            }
        };

        let bands = denominations
            .iter()
            .map(|base| Band::around(*base))
            .collect::<MixerResult<Vec<_>>>()?;
        let jittered = denominations
            .iter()
            .zip(&bands)
            .map(|(base, band)| perturb(rng, *base, band))
            .collect();
        let chunks = reconcile(amount, &bands, jittered)?;

        tracing::debug!(
            currency = %currency,
            chunks = chunks.len(),
            "Split amount into denominations"
        );

        Ok(SplitOutcome {
            denominations,
            chunks,
        })
    }
}

/// Draw denominations until the remainder is within epsilon of zero.
fn draw_denominations<R: Rng + ?Sized>(
    rng: &mut R,
    amount: Decimal,
    table: &[Decimal],
) -> MixerResult<Vec<Decimal>> {
    let mut remaining = amount;
    let mut drawn = Vec::new();

    while remaining > SPLIT_EPSILON {
        if drawn.len() == MAX_SPLIT_CHUNKS {
            return Err(MixerError::invalid_amount(format!(
                "amount {amount} needs more than {MAX_SPLIT_CHUNKS} chunks"
            )));
        }

        // table is ascending, so the fitting values form a prefix
        let fitting = table.partition_point(|value| *value <= remaining);
        let pick = table.get(..fitting).and_then(|values| values.choose(rng));

        match pick {
            Some(value) => {
                remaining -= *value;
                drawn.push(*value);
            }
            None => {
                drawn.push(remaining);
                remaining = Decimal::ZERO;
            }
        }
    }

    if remaining > Decimal::ZERO {
        match drawn.last_mut() {
            Some(last) => *last += remaining,
            None => drawn.push(remaining),
        }
    }

    Ok(drawn)
}

/// Closed range a chunk drawn as `base` may end up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Band {
    low: Decimal,
    high: Decimal,
}

impl Band {
    fn around(base: Decimal) -> MixerResult<Self> {
        let width = base
            .checked_mul(PERTURBATION_BAND)
            .ok_or_else(|| MixerError::invalid_amount(format!("chunk {base} is too large")))?
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero);
        let high = base
            .checked_add(width)
            .ok_or_else(|| MixerError::invalid_amount(format!("chunk {base} is too large")))?;
        Ok(Self {
            low: base - width,
            high,
        })
    }
}

/// Jitter `base` uniformly within ±[`PERTURBATION_RATIO`] of itself.
fn perturb<R: Rng + ?Sized>(rng: &mut R, base: Decimal, band: &Band) -> Decimal {
    let ratio = rng.gen_range(-PERTURBATION_RATIO..=PERTURBATION_RATIO);
    let factor = Decimal::from_f64(ratio).unwrap_or(Decimal::ZERO);
    base.checked_mul(factor)
        .and_then(|jitter| base.checked_add(jitter))
        .unwrap_or(base)
        .round_dp(AMOUNT_SCALE)
        .clamp(band.low, band.high)
}

/// Absorb the jitter drift so the chunks sum to `amount` exactly, keeping
/// each chunk inside its band.
fn reconcile(
    amount: Decimal,
    bands: &[Band],
    mut chunks: Vec<Decimal>,
) -> MixerResult<Vec<Decimal>> {
    let mut drift = amount - chunks.iter().copied().sum::<Decimal>();

    for (chunk, band) in chunks.iter_mut().zip(bands).rev() {
        if drift.is_zero() {
            break;
        }
        let adjusted = (*chunk + drift).clamp(band.low, band.high);
        drift -= adjusted - *chunk;
        *chunk = adjusted;
    }

    if !drift.is_zero() {
        return Err(MixerError::invalid_amount(format!(
            "chunks cannot be reconciled to {amount}"
        )));
    }
    Ok(chunks)
}

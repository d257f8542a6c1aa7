// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Assigns each chunk to one of the request's output addresses.

use rust_decimal::Decimal;

use crate::error::{MixerError, MixerResult};
use crate::models::OutputAddress;

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Pick a destination for every chunk so per-address totals track the
/// requested percentages.
///
/// Chunks are visited largest first; each goes to the address with the
/// largest outstanding deficit (`amount * pct / 100 - assigned`). Ties go to
/// the address listed first. The returned vector is in chunk order.
pub fn allocate_destinations(
    amount: Decimal,
    chunks: &[Decimal],
    outputs: &[OutputAddress],
) -> MixerResult<Vec<String>> {
    if outputs.is_empty() {
        return Err(MixerError::invalid_request(
            "cannot allocate chunks without output addresses",
        ));
    }

    let mut deficits = outputs
        .iter()
        .map(|output| {
            amount
                .checked_mul(output.percentage)
                .map(|share| share / ONE_HUNDRED)
                .ok_or_else(|| too_large(amount))
        })
        .collect::<MixerResult<Vec<Decimal>>>()?;

    let mut order: Vec<usize> = (0..chunks.len()).collect();
    order.sort_by(|a, b| chunks[*b].cmp(&chunks[*a]));

    let mut assigned = vec![0usize; chunks.len()];
    for index in order {
        let mut target = 0;
        for (candidate, deficit) in deficits.iter().enumerate() {
            if *deficit > deficits[target] {
                target = candidate;
            }
        }
        deficits[target] = deficits[target]
            .checked_sub(chunks[index])
            .ok_or_else(|| too_large(amount))?;
        assigned[index] = target;
    }

    Ok(assigned
        .into_iter()
        .map(|target| outputs[target].address.clone())
        .collect())
}

fn too_large(amount: Decimal) -> MixerError {
    MixerError::invalid_amount(format!("amount {amount} is too large to allocate"))
}

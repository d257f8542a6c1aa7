// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Standard per-currency denominations.
//!
//! Chunks drawn from a small set of common values blend in with ordinary
//! transfers of the same size.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::Currency;

/// Per-currency ascending denomination lists.
#[derive(Debug, Clone, Default)]
pub struct DenominationTable {
    tables: HashMap<Currency, Vec<Decimal>>,
}

impl DenominationTable {
    /// Empty table; every currency falls back to a single chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table for the supported currencies.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.insert(Currency::from("BTC"), &[1, 5, 10, 50, 100, 500, 1000], 3);
        table.insert(Currency::from("BCH"), &[1, 5, 10, 50, 100, 500, 1000], 3);
        table.insert(Currency::from("LTC"), &[1, 5, 10, 50, 100, 500, 1000], 2);
        table.insert(Currency::from("ETH"), &[1, 5, 10, 50, 100, 500, 1000], 2);
        table.insert(Currency::from("XMR"), &[1, 10, 100, 1000], 2);
        table
    }

    fn insert(&mut self, currency: Currency, mantissas: &[i64], scale: u32) {
        let values = mantissas
            .iter()
            .map(|mantissa| Decimal::new(*mantissa, scale).normalize())
            .collect();
        self.set(currency, values);
    }

    /// Replace the denominations for `currency`. Values are sorted ascending
    /// and non-positive entries dropped.
    pub fn set(&mut self, currency: Currency, mut values: Vec<Decimal>) {
        values.retain(|value| *value > Decimal::ZERO);
        values.sort();
        values.dedup();
        self.tables.insert(currency, values);
    }

    /// Denominations for `currency`, or `None` when the currency is unknown.
    pub fn get(&self, currency: &Currency) -> Option<&[Decimal]> {
        self.tables
            .get(currency)
            .map(Vec::as_slice)
            .filter(|values| !values.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn btc_table_spans_milli_to_one() {
        let table = DenominationTable::standard();
        let btc = table.get(&Currency::from("btc")).unwrap();
        assert_eq!(btc.first(), Some(&dec!(0.001)));
        assert_eq!(btc.last(), Some(&dec!(1)));
        assert!(btc.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unknown_currency_has_no_table() {
        let table = DenominationTable::standard();
        assert!(table.get(&Currency::from("DOGE")).is_none());
    }

    #[test]
    fn set_sorts_and_filters() {
        let mut table = DenominationTable::new();
        table.set(
            Currency::from("TST"),
            vec![dec!(5), dec!(0), dec!(1), dec!(5), dec!(-2)],
        );
        assert_eq!(table.get(&Currency::from("TST")).unwrap(), &[dec!(1), dec!(5)]);

        table.set(Currency::from("NIL"), vec![dec!(0)]);
        assert!(table.get(&Currency::from("NIL")).is_none());
    }
}

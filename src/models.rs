// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Mixing Data Models
//!
//! Value objects exchanged with the API, persistence and scheduler layers.
//! All types derive `Serialize` and `Deserialize`; amounts are exact
//! decimals and serialize as strings.
//!
//! ## Model Categories
//!
//! - **Currency**: normalized ticker symbol
//! - **Mix requests**: the read-only input produced by the API layer
//! - **Mixing plans**: the immutable schedule handed to the scheduler

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MAX_AMOUNT;
use crate::error::{MixerError, MixerResult};
use crate::mixing::HopId;

/// Allowed deviation when output percentages are summed.
pub const PERCENTAGE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

// =============================================================================
// Currency
// =============================================================================

/// Currency ticker symbol, stored upper-case.
///
/// ```rust,ignore
/// assert_eq!(Currency::from("btc"), Currency::from("BTC"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Currency {
    fn from(value: String) -> Self {
        Currency(value.trim().to_ascii_uppercase())
    }
}

impl From<&str> for Currency {
    fn from(value: &str) -> Self {
        Currency::from(value.to_string())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

// =============================================================================
// Mix Request Models
// =============================================================================

/// One payout destination and the share of the deposit it receives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputAddress {
    pub address: String,
    /// Share of the deposit in percent (0, 100].
    pub percentage: Decimal,
}

/// Requested mixing strength.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MixingStrength {
    Low,
    #[default]
    Medium,
    High,
}

/// A deposit accepted by the API layer and awaiting a plan.
///
/// Owned by persistence; the planner reads it exactly once and never
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixRequest {
    pub id: Uuid,
    pub session_id: String,
    pub currency: Currency,
    pub amount: Decimal,
    pub output_addresses: Vec<OutputAddress>,
    /// Upper bound for any chunk's release delay. Zero means "use the
    /// configured default".
    #[serde(default)]
    pub delay_hours: f64,
    #[serde(default)]
    pub mixing_strength: MixingStrength,
}

impl MixRequest {
    /// Check the request shape before planning.
    ///
    /// The amount must be positive and at most [`MAX_AMOUNT`]. Percentages
    /// must each lie in (0, 100] and sum to 100 within
    /// [`PERCENTAGE_TOLERANCE`]. The delay bound must be finite and not
    /// negative.
    pub fn validate(&self) -> MixerResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(MixerError::invalid_amount(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.amount > MAX_AMOUNT {
            return Err(MixerError::invalid_amount(format!(
                "amount {} exceeds the limit of {MAX_AMOUNT}",
                self.amount
            )));
        }

        if self.output_addresses.is_empty() {
            return Err(MixerError::invalid_request(
                "at least one output address is required",
            ));
        }

        if let Some(output) = self
            .output_addresses
            .iter()
            .find(|output| output.address.trim().is_empty())
        {
            return Err(MixerError::invalid_request(format!(
                "output address with {}% has an empty address",
                output.percentage
            )));
        }

        if let Some(output) = self
            .output_addresses
            .iter()
            .find(|output| output.percentage <= Decimal::ZERO || output.percentage > ONE_HUNDRED)
        {
            return Err(MixerError::invalid_request(format!(
                "percentage {} for {} is outside (0, 100]",
                output.percentage, output.address
            )));
        }

        let total: Decimal = self.output_addresses.iter().map(|o| o.percentage).sum();
        if (total - ONE_HUNDRED).abs() > PERCENTAGE_TOLERANCE {
            return Err(MixerError::invalid_request(format!(
                "output percentages sum to {total}, expected 100"
            )));
        }

        if !self.delay_hours.is_finite() || self.delay_hours < 0.0 {
            return Err(MixerError::InvalidDelayBound(self.delay_hours));
        }

        Ok(())
    }
}

// =============================================================================
// Mixing Plan
// =============================================================================

/// The schedule derived from one mix request.
///
/// `chunks`, `delays_hours`, `routes` and `destinations` always have the same
/// length; entry `i` of each describes chunk `i`. Delays are ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixingPlan {
    pub mix_request_id: Uuid,
    pub currency: Currency,
    pub mixing_strength: MixingStrength,
    pub chunks: Vec<Decimal>,
    /// Release offsets in hours from `created_at`.
    pub delays_hours: Vec<f64>,
    pub routes: Vec<Vec<HopId>>,
    /// Output address receiving each chunk.
    pub destinations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub estimated_completion: DateTime<Utc>,
}

impl MixingPlan {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_amount(&self) -> Decimal {
        self.chunks.iter().copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn request(outputs: Vec<(&str, Decimal)>) -> MixRequest {
        MixRequest {
            id: Uuid::new_v4(),
            session_id: "session-1".to_string(),
            currency: Currency::from("btc"),
            amount: dec!(1.5),
            output_addresses: outputs
                .into_iter()
                .map(|(address, percentage)| OutputAddress {
                    address: address.to_string(),
                    percentage,
                })
                .collect(),
            delay_hours: 12.0,
            mixing_strength: MixingStrength::High,
        }
    }

    #[test]
    fn currency_is_normalized() {
        assert_eq!(Currency::from(" btc "), Currency::from("BTC"));
        assert_eq!(Currency::from("eth").to_string(), "ETH");
    }

    #[test]
    fn valid_request_passes() {
        let req = request(vec![("addr-a", dec!(33.33)), ("addr-b", dec!(66.67))]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn percentages_within_tolerance_pass() {
        let req = request(vec![
            ("addr-a", dec!(33.33)),
            ("addr-b", dec!(33.33)),
            ("addr-c", dec!(33.33)),
        ]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn percentages_outside_tolerance_fail() {
        let req = request(vec![("addr-a", dec!(50)), ("addr-b", dec!(49.98))]);
        assert!(matches!(req.validate(), Err(MixerError::InvalidRequest(_))));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let mut req = request(vec![("addr-a", dec!(100))]);
        req.amount = Decimal::ZERO;
        assert!(matches!(req.validate(), Err(MixerError::InvalidAmount(_))));
    }

    #[test]
    fn rejects_amount_above_limit() {
        let mut req = request(vec![("addr-a", dec!(100))]);
        req.amount = MAX_AMOUNT;
        assert!(req.validate().is_ok());

        req.amount = MAX_AMOUNT + Decimal::ONE;
        assert!(matches!(req.validate(), Err(MixerError::InvalidAmount(_))));

        req.amount = Decimal::MAX;
        assert!(matches!(req.validate(), Err(MixerError::InvalidAmount(_))));
    }

    #[test]
    fn rejects_missing_outputs_and_bad_delay() {
        let req = request(vec![]);
        assert!(matches!(req.validate(), Err(MixerError::InvalidRequest(_))));

        let mut req = request(vec![("addr-a", dec!(100))]);
        req.delay_hours = f64::NAN;
        assert!(matches!(req.validate(), Err(MixerError::InvalidDelayBound(_))));

        req.delay_hours = -1.0;
        assert!(matches!(req.validate(), Err(MixerError::InvalidDelayBound(_))));

        req.delay_hours = 0.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_json_round_trip_uses_string_amounts() {
        let req = request(vec![("addr-a", dec!(100))]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["amount"], "1.5");
        assert_eq!(json["currency"], "BTC");
        assert_eq!(json["mixing_strength"], "high");

        let back: MixRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn mixing_strength_defaults_to_medium() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "session_id": "s",
            "currency": "ltc",
            "amount": "2",
            "output_addresses": [{ "address": "x", "percentage": "100" }],
            "delay_hours": 6.0
        });
        let req: MixRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.mixing_strength, MixingStrength::Medium);
        assert_eq!(req.currency.as_str(), "LTC");
    }
}

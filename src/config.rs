// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`MixerConfig`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `MIXER_RING_SIZE` | Ring size (real signer + decoys), at least 2 | `11` |
//! | `MIXER_MIN_DELAY_HOURS` | Lower clamp for chunk release delays | `0.5` |
//! | `MIXER_DEFAULT_MAX_DELAY_HOURS` | Delay bound used when a request gives none | `24` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Environment variable name for the ring size.
pub const RING_SIZE_ENV: &str = "MIXER_RING_SIZE";

/// Environment variable name for the minimum release delay (hours).
pub const MIN_DELAY_HOURS_ENV: &str = "MIXER_MIN_DELAY_HOURS";

/// Environment variable name for the fallback maximum delay (hours).
pub const DEFAULT_MAX_DELAY_HOURS_ENV: &str = "MIXER_DEFAULT_MAX_DELAY_HOURS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// One real signer plus ten decoys.
pub const DEFAULT_RING_SIZE: usize = 11;

pub const DEFAULT_MIN_DELAY_HOURS: f64 = 0.5;

pub const DEFAULT_MAX_DELAY_HOURS: f64 = 24.0;

/// Smallest amount the splitter treats as non-zero (1e-5).
pub const SPLIT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 5);

/// Chunks are perturbed by up to this fraction of their own value.
pub const PERTURBATION_RATIO: f64 = 0.05;

/// [`PERTURBATION_RATIO`] as an exact decimal, used for chunk bands.
pub const PERTURBATION_BAND: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Largest amount a single mix request may carry (1e12 units).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Most chunks one split may produce.
pub const MAX_SPLIT_CHUNKS: usize = 10_000;

/// Decimal places kept on perturbed chunk amounts.
pub const AMOUNT_SCALE: u32 = 8;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                value: other.to_string(),
            }),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Mixer configuration shared by the planner and the signing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MixerConfig {
    /// Total ring size, real key included.
    pub ring_size: usize,
    /// Lower clamp for sampled delays.
    pub min_delay_hours: f64,
    /// Delay bound used when a request carries no usable bound.
    pub default_max_delay_hours: f64,
    pub log_format: LogFormat,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            ring_size: DEFAULT_RING_SIZE,
            min_delay_hours: DEFAULT_MIN_DELAY_HOURS,
            default_max_delay_hours: DEFAULT_MAX_DELAY_HOURS,
            log_format: LogFormat::default(),
        }
    }
}

impl MixerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset variables take their defaults; set but unparsable ones are
    /// rejected rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ring_size = match lookup(RING_SIZE_ENV) {
            Some(raw) => {
                let parsed = raw.trim().parse::<usize>().ok().filter(|size| *size >= 2);
                parsed.ok_or(ConfigError::Invalid {
                    name: RING_SIZE_ENV,
                    value: raw,
                })?
            }
            None => defaults.ring_size,
        };

        let min_delay_hours = parse_hours(&lookup, MIN_DELAY_HOURS_ENV, defaults.min_delay_hours)?;
        let default_max_delay_hours = parse_hours(
            &lookup,
            DEFAULT_MAX_DELAY_HOURS_ENV,
            defaults.default_max_delay_hours,
        )?;

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            ring_size,
            min_delay_hours,
            default_max_delay_hours,
            log_format,
        })
    }

    /// Number of decoys drawn per ring.
    pub fn decoy_count(&self) -> usize {
        self.ring_size.saturating_sub(1)
    }
}

fn parse_hours<F>(lookup: &F, name: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|hours| hours.is_finite() && *hours > 0.0)
            .ok_or(ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

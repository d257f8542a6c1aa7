// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mixing plan construction.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use rand::Rng;

use super::{allocate_destinations, DelaySampler, DenominationSplitter, RouteGenerator};
use crate::config::MixerConfig;
use crate::error::{MixerError, MixerResult};
use crate::models::{MixRequest, MixingPlan};
use crate::observer::{MixerObserver, NoopObserver};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Turns accepted mix requests into immutable [`MixingPlan`]s.
pub struct MixingPlanner {
    splitter: DenominationSplitter,
    delays: DelaySampler,
    routes: RouteGenerator,
    default_max_delay_hours: f64,
    observer: Arc<dyn MixerObserver>,
}

impl MixingPlanner {
    /// Planner with the standard denomination table.
    pub fn new(config: &MixerConfig) -> Self {
        Self::with_splitter(config, DenominationSplitter::default())
    }

    pub fn with_splitter(config: &MixerConfig, splitter: DenominationSplitter) -> Self {
        Self {
            splitter,
            delays: DelaySampler::new(config.min_delay_hours),
            routes: RouteGenerator,
            default_max_delay_hours: config.default_max_delay_hours,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report outcomes to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn MixerObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Build the plan for `request`.
    ///
    /// The request is validated first; a zero delay bound is replaced by
    /// the configured default.
    pub fn create_plan<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &MixRequest,
    ) -> MixerResult<MixingPlan> {
        request.validate()?;

        let max_delay_hours = if request.delay_hours > 0.0 {
            request.delay_hours
        } else {
            self.default_max_delay_hours
        };

        let split = self.splitter.split(rng, request.amount, &request.currency)?;
        let count = split.chunks.len();
        let delays_hours = self.delays.sample(rng, count, max_delay_hours)?;
        let routes = self.routes.routes(rng, count);
        let destinations =
            allocate_destinations(request.amount, &split.chunks, &request.output_addresses)?;

        let created_at = Utc::now();
        let last_release = delays_hours.last().copied().unwrap_or(0.0);
        let estimated_completion = TimeDelta::try_milliseconds(
            // bounded by a finite, validated delay bound
            (last_release * MILLIS_PER_HOUR).round() as i64,
        )
        .and_then(|offset| created_at.checked_add_signed(offset))
        .ok_or(MixerError::InvalidDelayBound(max_delay_hours))?;

        let plan = MixingPlan {
            mix_request_id: request.id,
            currency: request.currency.clone(),
            mixing_strength: request.mixing_strength,
            chunks: split.chunks,
            delays_hours,
            routes,
            destinations,
            created_at,
            estimated_completion,
        };

        tracing::info!(
            mix_request_id = %plan.mix_request_id,
            currency = %plan.currency,
            chunks = plan.len(),
            max_delay_hours,
            estimated_completion = %plan.estimated_completion,
            "Mixing plan created"
        );
        self.observer.plan_created(&plan);

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::models::{Currency, MixingStrength, OutputAddress};

    fn request(amount: Decimal, delay_hours: f64) -> MixRequest {
        MixRequest {
            id: Uuid::new_v4(),
            session_id: "s-1".to_string(),
            currency: Currency::from("BTC"),
            amount,
            output_addresses: vec![
                OutputAddress {
                    address: "bc1-first".to_string(),
                    percentage: dec!(60),
                },
                OutputAddress {
                    address: "bc1-second".to_string(),
                    percentage: dec!(40),
                },
            ],
            delay_hours,
            mixing_strength: MixingStrength::Low,
        }
    }

    #[test]
    fn plan_vectors_line_up() {
        let planner = MixingPlanner::new(&MixerConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let req = request(dec!(1.5), 12.0);
        let plan = planner.create_plan(&mut rng, &req).unwrap();

        assert_eq!(plan.mix_request_id, req.id);
        assert_eq!(plan.mixing_strength, MixingStrength::Low);
        assert!(!plan.is_empty());
        assert_eq!(plan.delays_hours.len(), plan.len());
        assert_eq!(plan.routes.len(), plan.len());
        assert_eq!(plan.destinations.len(), plan.len());
        assert_eq!(plan.total_amount(), dec!(1.5));
        assert!(plan.delays_hours.windows(2).all(|w| w[0] <= w[1]));
        assert!(plan.delays_hours.iter().all(|d| (0.5..=12.0).contains(d)));
    }

    #[test]
    fn estimated_completion_follows_last_delay() {
        let planner = MixingPlanner::new(&MixerConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        let plan = planner.create_plan(&mut rng, &request(dec!(0.75), 6.0)).unwrap();

        let last = plan.delays_hours.last().copied().unwrap();
        let expected_ms = (last * MILLIS_PER_HOUR).round() as i64;
        let actual = plan.estimated_completion - plan.created_at;
        assert_eq!(actual.num_milliseconds(), expected_ms);
    }

    #[test]
    fn zero_delay_bound_uses_configured_default() {
        let config = MixerConfig {
            default_max_delay_hours: 2.0,
            ..MixerConfig::default()
        };
        let planner = MixingPlanner::new(&config);
        let mut rng = StdRng::seed_from_u64(3);
        let plan = planner.create_plan(&mut rng, &request(dec!(3), 0.0)).unwrap();
        assert!(plan.delays_hours.iter().all(|d| *d <= 2.0));
    }

    #[test]
    fn invalid_request_is_rejected() {
        let planner = MixingPlanner::new(&MixerConfig::default());
        let mut rng = StdRng::seed_from_u64(4);
        let mut req = request(dec!(1), 4.0);
        req.output_addresses[1].percentage = dec!(10);
        assert!(matches!(
            planner.create_plan(&mut rng, &req),
            Err(MixerError::InvalidRequest(_))
        ));

        let req = request(dec!(-1), 4.0);
        assert!(matches!(
            planner.create_plan(&mut rng, &req),
            Err(MixerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn huge_amount_is_rejected_for_any_currency() {
        let planner = MixingPlanner::new(&MixerConfig::default());
        let mut rng = StdRng::seed_from_u64(5);

        for currency in ["DOGE", "BTC"] {
            let mut req = request(Decimal::MAX, 4.0);
            req.currency = Currency::from(currency);
            assert!(matches!(
                planner.create_plan(&mut rng, &req),
                Err(MixerError::InvalidAmount(_))
            ));
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        plans: Mutex<Vec<Uuid>>,
    }

    impl MixerObserver for CountingObserver {
        fn plan_created(&self, plan: &MixingPlan) {
            self.plans.lock().unwrap().push(plan.mix_request_id);
        }
    }

    #[test]
    fn observer_sees_created_plans() {
        let observer = Arc::new(CountingObserver::default());
        let planner = MixingPlanner::new(&MixerConfig::default()).with_observer(observer.clone());
        let mut rng = StdRng::seed_from_u64(5);
        let req = request(dec!(0.2), 1.0);
        planner.create_plan(&mut rng, &req).unwrap();

        assert_eq!(*observer.plans.lock().unwrap(), vec![req.id]);
    }
}

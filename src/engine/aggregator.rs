use crate::contract::OptionContract;
use crate::engine::cancel::CancelToken;
use crate::engine::result::PricingResult;
use crate::engine::stats::RunningStats;
use crate::errors::{PricerError, PricerResult};
use crate::models::path::{PathGenerator, SimulatedPath};
use crate::models::PayoffEvaluator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Default number of trials simulated per RNG stream.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Settings for one aggregator. Stack-allocated, Copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Root seed. Batch `b` draws from stream `b` of this seed.
    pub seed: u64,
    /// Worker threads. 0 = rayon default, 1 = run on the caller thread.
    pub workers: usize,
    /// Trials per batch. Fixes the partition, and with it the result bits.
    pub batch_size: usize,
}

impl SimulationConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            workers: 0,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Drives independent trials and folds their discounted payoffs into a
/// `PricingResult`.
///
/// Trials are cut into batches of `batch_size`. Each batch owns a ChaCha8
/// stream keyed by its index, and batch statistics are merged in index
/// order, so the estimate is identical for any worker count.
pub struct SimulationAggregator {
    config: SimulationConfig,
    cancel: Option<CancelToken>,
}

impl SimulationAggregator {
    pub fn new(config: SimulationConfig) -> PricerResult<Self> {
        if config.batch_size == 0 {
            return Err(PricerError::invalid("batch_size", "must be at least 1"));
        }
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Check `token` before every batch.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run<E>(&self, contract: &OptionContract, evaluator: &E) -> PricerResult<PricingResult>
    where
        E: PayoffEvaluator + ?Sized,
    {
        let trials = contract.trial_count();
        let batch_size = self.config.batch_size;
        let n_batches = trials.div_ceil(batch_size);
        let generator = PathGenerator::new(contract);

        tracing::debug!(
            variant = evaluator.name(),
            trials,
            steps = contract.step_count(),
            batches = n_batches,
            workers = self.config.workers,
            seed = self.config.seed,
            "simulation started"
        );

        let simulate = |batch: usize| -> Option<RunningStats> {
            if self.is_cancelled() {
                return None;
            }
            let start = batch * batch_size;
            let len = batch_size.min(trials - start);
            Some(self.simulate_batch(contract, evaluator, &generator, batch, len))
        };

        let partials: Vec<Option<RunningStats>> = match self.config.workers {
            1 => (0..n_batches).map(simulate).collect(),
            0 => (0..n_batches).into_par_iter().map(simulate).collect(),
            n => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(|| (0..n_batches).into_par_iter().map(simulate).collect())
            }
        };

        let mut total = RunningStats::new();
        let mut cancelled = false;
        for partial in &partials {
            match partial {
                Some(stats) => total.merge(stats),
                None => cancelled = true,
            }
        }

        if cancelled {
            tracing::warn!(
                completed = total.count(),
                requested = trials,
                "simulation cancelled"
            );
            return Err(PricerError::Cancelled {
                completed: total.count(),
                requested: trials,
            });
        }

        let result = PricingResult::from_stats(&total);
        tracing::debug!(
            variant = evaluator.name(),
            price = result.price,
            standard_error = result.standard_error,
            "simulation finished"
        );
        Ok(result)
    }

    fn simulate_batch<E>(
        &self,
        contract: &OptionContract,
        evaluator: &E,
        generator: &PathGenerator,
        batch: usize,
        len: usize,
    ) -> RunningStats
    where
        E: PayoffEvaluator + ?Sized,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(batch as u64);

        let mut path = SimulatedPath::with_capacity(contract.step_count());
        let mut stats = RunningStats::new();
        for _ in 0..len {
            generator.fill(&mut rng, &mut path);
            stats.push(evaluator.discounted_payoff(&path, contract));
        }
        stats
    }

    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// One-shot pricing with default settings and the given seed.
pub fn price<E>(contract: &OptionContract, evaluator: &E, seed: u64) -> PricerResult<PricingResult>
where
    E: PayoffEvaluator + ?Sized,
{
    SimulationAggregator::new(SimulationConfig::seeded(seed))?.run(contract, evaluator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payoff::PayoffVariant;
    use statrs::distribution::{ContinuousCDF, Normal};

    fn contract(spot: f64, strike: f64, r: f64, sigma: f64, steps: usize, trials: usize) -> OptionContract {
        OptionContract::new(spot, strike, r, sigma, 1.0, steps, trials).unwrap()
    }

    fn sequential(seed: u64) -> SimulationAggregator {
        SimulationAggregator::new(SimulationConfig {
            seed,
            workers: 1,
            batch_size: DEFAULT_BATCH_SIZE,
        })
        .unwrap()
    }

    fn bs_call(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
        let n = Normal::new(0.0, 1.0).unwrap();
        let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
        let d2 = d1 - sigma * t.sqrt();
        s * n.cdf(d1) - k * (-r * t).exp() * n.cdf(d2)
    }

    #[test]
    fn test_single_trial_has_zero_error() {
        let c = contract(100.0, 100.0, 0.1, 0.3, 50, 1);
        for variant in PayoffVariant::ALL {
            let result = sequential(3).run(&c, &variant).unwrap();
            assert_eq!(result.trials, 1);
            assert_eq!(result.standard_error, 0.0, "{variant}");
            assert_eq!(result.std_dev, 0.0, "{variant}");
            assert!(result.price >= 0.0);
        }
    }

    #[test]
    fn test_non_negative_for_all_variants() {
        let c = contract(100.0, 110.0, 0.05, 0.25, 12, 2_000);
        for variant in PayoffVariant::ALL {
            let result = sequential(11).run(&c, &variant).unwrap();
            assert!(result.price >= 0.0, "{variant} price={}", result.price);
            assert!(result.standard_error >= 0.0, "{variant}");
            assert_eq!(result.trials, 2_000);
        }
    }

    #[test]
    fn test_european_call_near_black_scholes() {
        // European payoff only reads S_T, which the exact scheme samples
        // without bias for any step count.
        let c = contract(100.0, 100.0, 0.1, 0.3, 10, 200_000);
        let result = price(&c, &PayoffVariant::EUROPEAN_CALL, 42).unwrap();
        let analytic = bs_call(100.0, 100.0, 0.1, 0.3, 1.0);

        assert!((analytic - 16.73).abs() < 0.01, "analytic={analytic}");
        assert!(
            (result.price - analytic).abs() < 5.0 * result.standard_error,
            "mc={} analytic={analytic} se={}",
            result.price,
            result.standard_error
        );
    }

    #[test]
    fn test_standard_error_shrinks_with_trials() {
        let base = contract(100.0, 100.0, 0.1, 0.3, 4, 1);
        let mut prev = f64::INFINITY;
        for trials in [100, 1_000, 10_000, 100_000] {
            let c = base.with_trial_count(trials).unwrap();
            let result = price(&c, &PayoffVariant::EUROPEAN_CALL, 5).unwrap();
            assert!(
                result.standard_error < prev,
                "se={} at {trials} trials did not drop below {prev}",
                result.standard_error
            );
            prev = result.standard_error;
        }
    }

    #[test]
    fn test_atm_zero_rate_call_put_parity() {
        let c = contract(100.0, 100.0, 0.0, 0.2, 1, 100_000);
        let call = price(&c, &PayoffVariant::EUROPEAN_CALL, 17).unwrap();
        let put = price(&c, &PayoffVariant::EUROPEAN_PUT, 18).unwrap();
        let tol = 5.0 * (call.standard_error.powi(2) + put.standard_error.powi(2)).sqrt();
        assert!(
            (call.price - put.price).abs() < tol,
            "call={} put={} tol={tol}",
            call.price,
            put.price
        );
    }

    #[test]
    fn test_vanishing_volatility_gives_intrinsic() {
        let itm = contract(100.0, 90.0, 0.0, 1e-9, 20, 500);
        let call = price(&itm, &PayoffVariant::EUROPEAN_CALL, 1).unwrap();
        let put = price(&itm, &PayoffVariant::EUROPEAN_PUT, 1).unwrap();
        assert!((call.price - 10.0).abs() < 1e-4, "call={}", call.price);
        assert_eq!(put.price, 0.0);

        let otm = contract(100.0, 110.0, 0.0, 1e-9, 20, 500);
        let call = price(&otm, &PayoffVariant::EUROPEAN_CALL, 1).unwrap();
        let put = price(&otm, &PayoffVariant::EUROPEAN_PUT, 1).unwrap();
        assert_eq!(call.price, 0.0);
        assert!((put.price - 10.0).abs() < 1e-4, "put={}", put.price);
    }

    #[test]
    fn test_estimator_variance_scales_inversely_with_trials() {
        fn spread(trials: usize) -> f64 {
            let c = contract(100.0, 100.0, 0.05, 0.2, 1, trials);
            let prices: Vec<f64> = (0..40)
                .map(|seed| price(&c, &PayoffVariant::EUROPEAN_CALL, 1_000 + seed).unwrap().price)
                .collect();
            let stats: RunningStats = prices.into_iter().collect();
            stats.population_variance()
        }

        let ratio = spread(100) / spread(1_600);
        // Expected ratio is 16
        assert!(ratio > 5.0 && ratio < 50.0, "variance ratio={ratio}");
    }

    #[test]
    fn test_lookback_dominates_european() {
        let c = contract(100.0, 100.0, 0.05, 0.3, 50, 5_000);
        let agg = sequential(23);
        let euro_call = agg.run(&c, &PayoffVariant::EUROPEAN_CALL).unwrap();
        let look_call = agg.run(&c, &PayoffVariant::LOOKBACK_CALL).unwrap();
        let euro_put = agg.run(&c, &PayoffVariant::EUROPEAN_PUT).unwrap();
        let look_put = agg.run(&c, &PayoffVariant::LOOKBACK_PUT).unwrap();

        // Same seed, same paths: the ordering holds trial by trial
        assert!(look_call.price >= euro_call.price);
        assert!(look_put.price >= euro_put.price);
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let c = contract(100.0, 95.0, 0.03, 0.25, 16, 25_000);
        let config = SimulationConfig {
            seed: 77,
            workers: 1,
            batch_size: 1_000,
        };
        let single = SimulationAggregator::new(config).unwrap();
        let multi = SimulationAggregator::new(SimulationConfig { workers: 4, ..config }).unwrap();
        let global = SimulationAggregator::new(SimulationConfig { workers: 0, ..config }).unwrap();

        let a = single.run(&c, &PayoffVariant::ASIAN_CALL).unwrap();
        let b = multi.run(&c, &PayoffVariant::ASIAN_CALL).unwrap();
        let g = global.run(&c, &PayoffVariant::ASIAN_CALL).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, g);
    }

    #[test]
    fn test_partial_last_batch() {
        let c = contract(100.0, 100.0, 0.05, 0.2, 2, 2_501);
        let agg = SimulationAggregator::new(SimulationConfig {
            seed: 9,
            workers: 2,
            batch_size: 1_000,
        })
        .unwrap();
        let result = agg.run(&c, &PayoffVariant::EUROPEAN_PUT).unwrap();
        assert_eq!(result.trials, 2_501);
    }

    #[test]
    fn test_different_seeds_differ() {
        let c = contract(100.0, 100.0, 0.05, 0.2, 2, 1_000);
        let a = price(&c, &PayoffVariant::EUROPEAN_CALL, 1).unwrap();
        let b = price(&c, &PayoffVariant::EUROPEAN_CALL, 2).unwrap();
        assert_ne!(a.price, b.price);
    }

    #[test]
    fn test_cancelled_run() {
        let token = CancelToken::new();
        token.cancel();
        let agg = sequential(1).with_cancel_token(token);
        let c = contract(100.0, 100.0, 0.05, 0.2, 2, 30_000);

        match agg.run(&c, &PayoffVariant::EUROPEAN_CALL) {
            Err(PricerError::Cancelled { completed, requested }) => {
                assert_eq!(completed, 0);
                assert_eq!(requested, 30_000);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = SimulationAggregator::new(SimulationConfig {
            batch_size: 0,
            ..SimulationConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, PricerError::InvalidParameter { name: "batch_size", .. }));
    }

    #[test]
    fn test_dyn_evaluator() {
        let c = contract(100.0, 100.0, 0.05, 0.2, 2, 100);
        let evaluator: Box<dyn PayoffEvaluator> = Box::new(PayoffVariant::ASIAN_PUT);
        let result = price(&c, evaluator.as_ref(), 4).unwrap();
        assert_eq!(result.trials, 100);
    }
}

use crate::engine::stats::RunningStats;
use crate::errors::{PricerError, PricerResult};
use statrs::distribution::{ContinuousCDF, Normal};

/// Outcome of one full simulation run. Immutable once returned.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PricingResult {
    /// Mean discounted payoff.
    pub price: f64,
    /// Population standard deviation of the discounted payoffs / sqrt(trials).
    pub standard_error: f64,
    /// Population standard deviation of the discounted payoffs.
    pub std_dev: f64,
    pub trials: usize,
}

impl PricingResult {
    pub(crate) fn from_stats(stats: &RunningStats) -> Self {
        Self {
            price: stats.mean(),
            standard_error: stats.standard_error(),
            std_dev: stats.population_std_dev(),
            trials: stats.count(),
        }
    }

    /// Two-sided normal-approximation interval: price +/- z * SE.
    pub fn confidence_interval(&self, level: f64) -> PricerResult<(f64, f64)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(PricerError::invalid(
                "confidence_level",
                format!("must lie in (0, 1), got {level}"),
            ));
        }
        let normal = Normal::new(0.0, 1.0).map_err(|e| PricerError::Statistics(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + 0.5 * level);
        let half_width = z * self.standard_error;
        Ok((self.price - half_width, self.price + half_width))
    }
}

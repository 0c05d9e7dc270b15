use crate::contract::OptionContract;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// One simulated price path: the initial spot followed by exactly
/// `step_count` multiplicative GBM steps.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPath {
    prices: Vec<f64>,
}

impl SimulatedPath {
    pub fn with_capacity(step_count: usize) -> Self {
        Self {
            prices: Vec::with_capacity(step_count + 1),
        }
    }

    #[inline]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    #[inline]
    pub fn initial(&self) -> f64 {
        self.prices.first().copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn last(&self) -> f64 {
        self.prices.last().copied().unwrap_or(0.0)
    }

    /// Arithmetic mean over every sample, initial spot included.
    pub fn mean(&self) -> f64 {
        if self.prices.is_empty() {
            return 0.0;
        }
        self.prices.iter().sum::<f64>() / self.prices.len() as f64
    }

    pub fn max(&self) -> f64 {
        self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.prices.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

impl From<Vec<f64>> for SimulatedPath {
    fn from(prices: Vec<f64>) -> Self {
        Self { prices }
    }
}

/// Exact-discretisation GBM path generator under the risk-neutral measure.
///
/// S_{k+1} = S_k * exp((r - sigma^2/2) * dt + sigma * sqrt(dt) * Z_k)
///
/// where dt = T / n and Z_k ~ N(0, 1) i.i.d. The per-step drift and
/// diffusion are precomputed once per contract. Stack-allocated, Copy.
#[derive(Debug, Clone, Copy)]
pub struct PathGenerator {
    spot: f64,
    step_count: usize,
    drift_dt: f64,
    vol_sqrt_dt: f64,
}

impl PathGenerator {
    pub fn new(contract: &OptionContract) -> Self {
        let sigma = contract.volatility();
        let dt = contract.maturity() / contract.step_count() as f64;
        let drift = contract.risk_free_rate() - 0.5 * sigma * sigma;
        Self {
            spot: contract.spot(),
            step_count: contract.step_count(),
            drift_dt: drift * dt,
            vol_sqrt_dt: sigma * dt.sqrt(),
        }
    }

    /// Generate a fresh path.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulatedPath {
        let mut path = SimulatedPath::with_capacity(self.step_count);
        self.fill(rng, &mut path);
        path
    }

    /// Overwrite `path` with a new simulation, reusing its allocation.
    /// Consumes exactly `step_count` normal draws from `rng`.
    #[inline]
    pub fn fill<R: Rng + ?Sized>(&self, rng: &mut R, path: &mut SimulatedPath) {
        path.prices.clear();
        let mut price = self.spot;
        path.prices.push(price);
        for _ in 0..self.step_count {
            let z: f64 = StandardNormal.sample(rng);
            price *= self.vol_sqrt_dt.mul_add(z, self.drift_dt).exp();
            path.prices.push(price);
        }
    }
}

use crate::errors::{PricerError, PricerResult};

/// Immutable parameter bundle for one pricing run.
///
/// Fields are private so a contract can only exist in a validated state:
/// spot, strike, volatility and maturity are finite and > 0, the rate is
/// finite, and both counts are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct OptionContract {
    spot: f64,
    strike: f64,
    risk_free_rate: f64,
    volatility: f64,
    maturity: f64,
    step_count: usize,
    trial_count: usize,
}

impl OptionContract {
    pub fn new(
        spot: f64,
        strike: f64,
        risk_free_rate: f64,
        volatility: f64,
        maturity: f64,
        step_count: usize,
        trial_count: usize,
    ) -> PricerResult<Self> {
        positive("spot", spot)?;
        positive("strike", strike)?;
        positive("volatility", volatility)?;
        positive("maturity", maturity)?;
        if !risk_free_rate.is_finite() {
            return Err(PricerError::invalid(
                "risk_free_rate",
                format!("must be finite, got {risk_free_rate}"),
            ));
        }
        at_least_one("step_count", step_count)?;
        at_least_one("trial_count", trial_count)?;

        Ok(Self {
            spot,
            strike,
            risk_free_rate,
            volatility,
            maturity,
            step_count,
            trial_count,
        })
    }

    /// Same contract, different number of simulated paths.
    pub fn with_trial_count(&self, trial_count: usize) -> PricerResult<Self> {
        at_least_one("trial_count", trial_count)?;
        Ok(Self {
            trial_count,
            ..*self
        })
    }

    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    #[inline]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    #[inline]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    #[inline]
    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    /// exp(-r*T), shared by every payoff variant.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.maturity).exp()
    }
}

impl std::fmt::Display for OptionContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OptionContract, s={:.2}, x={:.2}, r={:.2}, sigma={:.2}, t={:.2}, nsteps={}, ntrials={}",
            self.spot,
            self.strike,
            self.risk_free_rate,
            self.volatility,
            self.maturity,
            self.step_count,
            self.trial_count,
        )
    }
}

fn positive(name: &'static str, value: f64) -> PricerResult<()> {
    // NaN fails the comparison too
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PricerError::invalid(
            name,
            format!("must be finite and > 0, got {value}"),
        ))
    }
}

fn at_least_one(name: &'static str, value: usize) -> PricerResult<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(PricerError::invalid(name, "must be at least 1"))
    }
}

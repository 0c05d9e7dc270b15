use crate::contract::OptionContract;
use crate::engine::{SimulationConfig, DEFAULT_BATCH_SIZE};
use crate::errors::{PricerError, PricerResult};
use crate::models::payoff::PayoffVariant;

/// Output format for the benchmark driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spot: f64,
    pub strike: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub maturity: f64,
    pub step_count: usize,
    pub trial_counts: Vec<usize>,
    pub variant: PayoffVariant,
    pub seed: u64,
    pub workers: usize,
    pub batch_size: usize,
    pub output: OutputFormat,
}

impl AppConfig {
    pub fn from_env() -> PricerResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source. Unset keys take the defaults of
    /// the classic at-the-money benchmark (S=K=100, r=10%, vol=30%, 1y).
    pub fn from_lookup<F>(lookup: F) -> PricerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let spot = parse_var("SPOT", &get("SPOT", "100"))?;
        let strike = parse_var("STRIKE", &get("STRIKE", "100"))?;
        let risk_free_rate = parse_var("RISK_FREE_RATE", &get("RISK_FREE_RATE", "0.1"))?;
        let volatility = parse_var("VOLATILITY", &get("VOLATILITY", "0.3"))?;
        let maturity = parse_var("MATURITY", &get("MATURITY", "1"))?;
        let step_count = parse_var("STEP_COUNT", &get("STEP_COUNT", "100"))?;
        let workers = parse_var("WORKERS", &get("WORKERS", "0"))?;
        let batch_size = parse_var(
            "BATCH_SIZE",
            &get("BATCH_SIZE", &DEFAULT_BATCH_SIZE.to_string()),
        )?;

        let trial_counts = get("TRIAL_COUNTS", "10,100,1000,10000,100000,1000000")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_var::<usize>("TRIAL_COUNTS", s))
            .collect::<PricerResult<Vec<_>>>()?;
        if trial_counts.is_empty() {
            return Err(PricerError::Config("TRIAL_COUNTS: empty list".into()));
        }

        let variant = get("VARIANT", "european-call").parse::<PayoffVariant>()?;

        let seed = match lookup("SEED") {
            Some(raw) => parse_var("SEED", &raw)?,
            None => rand::random::<u64>(),
        };

        let output = match get("OUTPUT_FORMAT", "text").trim().to_ascii_lowercase().as_str() {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            other => {
                return Err(PricerError::Config(format!(
                    "OUTPUT_FORMAT: expected text or json, got {other}"
                )))
            }
        };

        let cfg = Self {
            spot,
            strike,
            risk_free_rate,
            volatility,
            maturity,
            step_count,
            trial_counts,
            variant,
            seed,
            workers,
            batch_size,
            output,
        };

        // Fail on bad market/contract values before any run starts
        for &trials in &cfg.trial_counts {
            cfg.contract(trials)?;
        }
        if cfg.batch_size == 0 {
            return Err(PricerError::Config("BATCH_SIZE: must be at least 1".into()));
        }

        Ok(cfg)
    }

    pub fn contract(&self, trial_count: usize) -> PricerResult<OptionContract> {
        OptionContract::new(
            self.spot,
            self.strike,
            self.risk_free_rate,
            self.volatility,
            self.maturity,
            self.step_count,
            trial_count,
        )
    }

    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            seed: self.seed,
            workers: self.workers,
            batch_size: self.batch_size,
        }
    }
}

fn parse_var<T>(key: &str, raw: &str) -> PricerResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| PricerError::Config(format!("{key}: {e}")))
}

//! # mc_pricer - Monte Carlo option pricing under geometric Brownian motion
//!
//! Simulates risk-neutral GBM price paths, evaluates a path-dependent payoff
//! on each, discounts at exp(-rT) and reports the mean with its standard
//! error.
//!
//! Supported payoffs: European, Asian (arithmetic average) and Lookback
//! (fixed strike), each as call or put.
//!
//! ```rust,no_run
//! use mc_pricer::prelude::*;
//!
//! let contract = OptionContract::new(100.0, 100.0, 0.1, 0.3, 1.0, 100, 100_000)?;
//! let variant: PayoffVariant = "asian-call".parse()?;
//! let result = price(&contract, &variant, 42)?;
//! println!("{:.4} +/- {:.4}", result.price, result.standard_error);
//! # Ok::<(), mc_pricer::PricerError>(())
//! ```

pub mod bench;
pub mod config;
pub mod contract;
pub mod engine;
pub mod errors;
pub mod models;

pub mod prelude {
    pub use crate::contract::OptionContract;
    pub use crate::engine::{
        price, CancelToken, PricingResult, RunningStats, SimulationAggregator, SimulationConfig,
    };
    pub use crate::errors::{PricerError, PricerResult};
    pub use crate::models::path::{PathGenerator, SimulatedPath};
    pub use crate::models::payoff::{OptionStyle, OptionType, PayoffVariant};
    pub use crate::models::PayoffEvaluator;
}

pub use crate::errors::{PricerError, PricerResult};

pub mod path;
pub mod payoff;

use crate::contract::OptionContract;
use crate::models::path::SimulatedPath;

/// All payoff evaluators implement this trait.
/// discounted_payoff() must be a pure function of the path and contract,
/// and never negative: every variant floors at zero before discounting.
/// Send + Sync required so one evaluator can be shared by worker threads.
pub trait PayoffEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    fn discounted_payoff(&self, path: &SimulatedPath, contract: &OptionContract) -> f64;
}

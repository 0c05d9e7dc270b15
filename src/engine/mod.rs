pub mod aggregator;
pub mod cancel;
pub mod result;
pub mod stats;

pub use aggregator::{price, SimulationAggregator, SimulationConfig, DEFAULT_BATCH_SIZE};
pub use cancel::CancelToken;
pub use result::PricingResult;
pub use stats::RunningStats;

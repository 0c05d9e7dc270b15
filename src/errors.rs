/// Domain-specific error types for the pricing engine.
/// Validation happens at the boundary (contract, variant, settings); once a
/// run has started the only way out is cancellation.
#[derive(Debug, thiserror::Error)]
pub enum PricerError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unsupported payoff variant: {0}")]
    UnsupportedVariant(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("simulation cancelled after {completed} of {requested} trials")]
    Cancelled { completed: usize, requested: usize },

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("statistics error: {0}")]
    Statistics(String),
}

impl PricerError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        PricerError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(e: serde_json::Error) -> Self {
        PricerError::Serialization(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for PricerError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        PricerError::WorkerPool(e.to_string())
    }
}

pub type PricerResult<T> = Result<T, PricerError>;

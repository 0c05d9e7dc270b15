//! Timing sweep over a list of trial counts: one priced run per count,
//! each timed with a wall clock.
use crate::config::{AppConfig, OutputFormat};
use crate::engine::{CancelToken, SimulationAggregator};
use crate::errors::PricerResult;
use std::time::Instant;

#[derive(Debug, Clone, serde::Serialize)]
pub struct BenchmarkRow {
    pub variant: String,
    pub trials: usize,
    pub price: f64,
    pub standard_error: f64,
    pub elapsed_secs: f64,
}

impl BenchmarkRow {
    pub fn format(&self, output: OutputFormat) -> PricerResult<String> {
        match output {
            OutputFormat::Text => Ok(format!(
                "ntrials = {}, value = ${:.4}, stderr = ${:.8}, time = {:.4}",
                self.trials, self.price, self.standard_error, self.elapsed_secs
            )),
            OutputFormat::Json => Ok(serde_json::to_string(self)?),
        }
    }
}

/// Price `cfg.variant` once per entry of `cfg.trial_counts`, handing each
/// row to `on_row` as soon as it is ready.
pub fn run_benchmark<F>(cfg: &AppConfig, cancel: &CancelToken, mut on_row: F) -> PricerResult<Vec<BenchmarkRow>>
where
    F: FnMut(&BenchmarkRow),
{
    let aggregator = SimulationAggregator::new(cfg.simulation())?.with_cancel_token(cancel.clone());
    let mut rows = Vec::with_capacity(cfg.trial_counts.len());

    for &trials in &cfg.trial_counts {
        let contract = cfg.contract(trials)?;
        let start = Instant::now();
        let result = aggregator.run(&contract, &cfg.variant)?;
        let elapsed_secs = start.elapsed().as_secs_f64();

        tracing::info!(
            contract = %contract,
            variant = %cfg.variant,
            price = result.price,
            standard_error = result.standard_error,
            elapsed_secs,
            "priced"
        );

        let row = BenchmarkRow {
            variant: cfg.variant.to_string(),
            trials,
            price: result.price,
            standard_error: result.standard_error,
            elapsed_secs,
        };
        on_row(&row);
        rows.push(row);
    }

    Ok(rows)
}

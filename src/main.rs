use mc_pricer::bench;
use mc_pricer::config::AppConfig;
use mc_pricer::engine::CancelToken;

fn main() {
    // Structured logging on stderr; stdout carries only the result rows
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        variant = %cfg.variant,
        seed = cfg.seed,
        workers = cfg.workers,
        batch_size = cfg.batch_size,
        "mc_pricer starting"
    );

    let output = cfg.output;
    let result = bench::run_benchmark(&cfg, &CancelToken::new(), |row| match row.format(output) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(error = %e, "failed to format result"),
    });

    if let Err(e) = result {
        tracing::error!("pricing failed: {e}");
        std::process::exit(1);
    }
}

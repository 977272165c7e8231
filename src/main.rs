use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt, prelude::*, EnvFilter};

use cot_eval::{
    cli::Cli,
    config::{Config, LogFormat},
    llm::LlmClient,
    logging::{LogRouter, RouterLayer},
    EvalHarness, HarnessOptions,
};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c.with_model(cli.model.clone()),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    // Initialize logging
    let router = Arc::new(LogRouter::new());
    init_logging(&config, Arc::clone(&router));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.llm.model,
        "cot-eval starting..."
    );

    // Model requests run on this runtime, driven from the worker threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let client = match LlmClient::new(&config.llm, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %c.base_url(), "Model client initialized");
            c.blocking(runtime.handle().clone())
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize model client");
            return Ok(ExitCode::FAILURE);
        }
    };

    let harness = EvalHarness::new(
        HarnessOptions::from_config(&config.eval, cli.debug),
        Arc::new(client),
    )
    .with_router(router);

    let summary = match harness.run(&cli.jobs()) {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Evaluation could not start");
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    print!("{}", summary.render());

    if summary.all_completed() {
        info!("All jobs completed");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("One or more jobs failed");
        Ok(ExitCode::FAILURE)
    }
}

/// Initialize tracing: console output plus per-job file routing
fn init_logging(config: &Config, router: Arc<LogRouter>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    // Job files take this crate's events only; each route applies its own level
    let routed = RouterLayer::new(router)
        .with_filter(Targets::new().with_target("cot_eval", LevelFilter::TRACE));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(routed)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_filter(env_filter),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(routed)
                .with(fmt::layer().with_writer(std::io::stderr).with_filter(env_filter))
                .init();
        }
    }
}

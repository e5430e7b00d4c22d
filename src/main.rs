//! # llm-sync
//!
//! Keeps a UI's view of the active LLM provider and model consistent with its backend,
//! and runs the gateway that fronts that backend.
//!
//! ## Features
//! - Bootstrap with a bounded status fetch, one delayed retry, then a degraded state
//! - Provider catalog with a built-in fallback list and an on-disk cache
//! - Two-step provider/model switch
//! - Gateway that answers with environment hints when the backend is down

mod cli;
mod core;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    if let Commands::Completions { shell } = &args.command {
        let mut cmd = Args::command();
        cli::generate(*shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration (print user-friendly message; exit uses Display not Debug)
    let config = core::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match &args.command {
        Commands::Serve { listen } => run::run_serve(&config, *listen).await?,
        Commands::Status => core::cli::run_status(&config).await,
        Commands::Providers { query } => core::cli::run_providers(&config, query.as_deref()).await,
        Commands::Switch { provider, model } => {
            core::cli::run_switch(&config, provider, model).await
        }
        Commands::Watch => run::run_watch(&config).await?,
        Commands::Hints => core::cli::run_hints(),
        Commands::Config => core::cli::run_config(&config),
        Commands::Completions { .. } => {}
    }
    Ok(())
}

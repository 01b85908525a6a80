mod config;
mod engine;
mod error;
mod model;

use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::engine::driver::{run_all, Pacer};
use crate::engine::engine::Engine;
use crate::engine::llm_client::GeminiClient;
use crate::error::ConfigError;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base = std::env::current_dir().context("failed to determine current directory")?;
    config::load_dotenv(&base)?;

    let (client, settings) = match config::connect(
        |name| std::env::var(name).ok(),
        |key| {
            let settings = config::load_settings(&base)?;
            Ok((GeminiClient::new(key, &settings.model), settings))
        },
    ) {
        Ok(ready) => ready,
        Err(err @ ConfigError::MissingApiKey(_)) => {
            error!("FATAL ERROR: {err}.");
            error!("Please set it before running the script.");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    let engine = Engine::new(&client, settings.paths(&base));
    let mut pacer = Pacer::new(settings.min_interval());

    let outcomes = run_all(&engine, &settings.jobs, &mut pacer)?;
    info!(jobs = outcomes.len(), "all jobs finished");

    Ok(ExitCode::SUCCESS)
}

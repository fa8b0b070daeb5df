use clap::Parser;
use std::process::ExitCode;

use cli::Cli;
use config::AppConfig;
use error::{AppError, AppResult};
use logging::LoggingConfig;
use state::AppState;

#[macro_use]
extern crate log;

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod service;
mod state;
mod storage;

#[cfg(test)]
mod tests;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.app_config(LoggingConfig::from_env());
    let console_enabled = config.logging.console_enabled;

    let result = run(&cli, config).await;
    report(result, console_enabled)
}

/// Logs a top-level error and maps the run result to the process exit code.
/// A login the portal rejected is an `Ok` result and exits 0.
fn report(result: AppResult<()>, console_enabled: bool) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // A logger that failed to install cannot report its own failure.
            let print = !console_enabled || matches!(e, AppError::Logging(_));
            let e = anyhow::Error::from(e);
            error!("Application error: {e:#}");
            if print {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: AppConfig) -> AppResult<()> {
    logging::init(&config.logging)?;
    debug!("Running with {config:?}");

    let state = AppState::new(config).await?;
    commands::dispatch(cli, &state).await
}

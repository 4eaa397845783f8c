//! Dubber - Video Dubbing Workflow
//!
//! Entry point for the `dubber` command: parses flags, loads configuration
//! and the API key, and hands the selected action to the workflow.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use dubber::cli::Args;
use dubber::config::{Config, Credentials};
use dubber::error::DubError;
use dubber::workflow::Workflow;

const DEFAULT_CONFIG_FILE: &str = "dubber.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;
    info!("Starting Dubber");

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(output_dir) = &args.output_dir {
        config.download.output_dir = output_dir.clone();
    }

    if let Some(path) = &args.write_config {
        config.save_to_file(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let credentials = Credentials::from_env()?;
    let target_lang = args
        .target_lang
        .clone()
        .unwrap_or_else(|| config.api.target_lang.clone());
    let action = args.action();
    debug!("Dispatching {:?} (target language {})", action, target_lang);

    let workflow = Workflow::new(config, credentials)?;
    workflow.run(action, &target_lang).await?;

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".dubber").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotated log file
    let file_appender = rolling::daily(&log_dir, "dubber.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| DubError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

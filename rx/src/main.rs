//! rx - run ripgrep as a bounded subprocess
//!
//! CLI entry point: builds the invocation from the command line and prints
//! the interpreted result.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use ripexec::cli::{BinaryCheck, Cli, Command};
use ripexec::config::Config;
use ripexec::{RipGrep, RipGrepResult, SearchOutcome};

/// Exit status for a failed search
const FAILURE_EXIT: u8 = 2;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ripexec")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("ripexec.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Loaded once; the subscriber is not installed yet, so summarize below
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    info!(path = ?cli.config, ?config, "main: configuration loaded");

    let rg = RipGrep::new(config.resolver_config());

    debug!(command = ?cli.command, "main: dispatching command");
    match &cli.command {
        Command::Search { json, .. } => {
            let invocation = cli
                .command
                .invocation()
                .ok_or_else(|| eyre::eyre!("search needs a target"))?;
            let outcome = rg.run(&invocation).await;
            if *json {
                print_json(outcome)
            } else {
                Ok(print_outcome(&outcome))
            }
        }
        Command::Which => cmd_which(&rg).await,
    }
}

fn print_json(outcome: SearchOutcome) -> Result<ExitCode> {
    let result = RipGrepResult::from(outcome);
    let success = result.success;
    let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(exit_code(success))
}

fn print_outcome(outcome: &SearchOutcome) -> ExitCode {
    match outcome {
        SearchOutcome::Matches { lines } => {
            for line in lines {
                println!("{}", line);
            }
        }
        SearchOutcome::NoMatch => {
            eprintln!("{}", "No matches found".dimmed());
        }
        SearchOutcome::Failed(failure) => {
            for line in &failure.lines {
                println!("{}", line);
            }
            let code = failure
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string());
            eprintln!("{} {:?} (exit code: {})", "✗".red(), failure.kind, code);
            eprintln!("{}", failure.stderr.trim_end());
        }
    }
    exit_code(outcome.is_success())
}

async fn cmd_which(rg: &RipGrep) -> Result<ExitCode> {
    let check = BinaryCheck::check(rg).await;
    let path = check.location.path.display().to_string();

    if check.available {
        let version = check.version.unwrap_or_else(|| "unknown".to_string());
        println!(
            "{} {} ({}, {})",
            "✓".green(),
            path.cyan(),
            check.location.source,
            version
        );
    } else {
        let state = if check.location.exists() { "not runnable" } else { "missing" };
        println!(
            "{} {} ({}, {})",
            "✗".red(),
            path.cyan(),
            check.location.source,
            state.red()
        );
    }
    Ok(exit_code(check.available))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(FAILURE_EXIT)
    }
}

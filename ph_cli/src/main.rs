mod cli;
mod commands;
mod error_fmt;

use std::io::IsTerminal;
use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, Layer, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error handler: {e}");
    }

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    let (cfg, warnings) = commands::load_config(&cli.config)?;
    init_tracing(cli.log_level.as_deref(), cli.json, &cfg.logging)?;
    for w in &warnings {
        tracing::warn!(warning = %w, "config");
    }
    let setup = commands::resolve_setup(&cfg, cli.calibration.as_deref())?;
    tracing::debug!(?setup, "sensor setup resolved");

    match cli.cmd {
        Commands::Check => commands::run_check(&cfg, &setup, &warnings, cli.json),
        Commands::Estimate { voltage } => commands::run_estimate(&setup, voltage, cli.json),
        Commands::Read { count, interval_ms } => {
            let shutdown = commands::shutdown_flag();
            commands::run_read(setup, count, interval_ms, cli.json, shutdown)
        }
    }
}

/// Console logs go to stderr so stdout carries only command output.
/// `[logging] file` adds a JSON-lines sink with the configured rotation.
fn init_tracing(level: Option<&str>, json: bool, logging: &ph_config::Logging) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.or(logging.level.as_deref()).unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .compact()
            .boxed()
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(path.as_os_str());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .wrap_err("initialize logging")
}

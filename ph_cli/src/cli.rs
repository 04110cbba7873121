//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "ph4502c", version, about = "PH-4502C pH sensor CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/ph4502c.toml")]
    pub config: PathBuf,

    /// Calibration CSV with a strict `voltage,ph` header; replaces the config points
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Print results and errors as JSON, and log as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); RUST_LOG takes precedence,
    /// then this flag, then `[logging] level`, then info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the config and show the resolved sensor setup
    Check,
    /// Convert a voltage to pH with the configured calibration
    Estimate {
        /// Probe output in volts
        #[arg(long, allow_hyphen_values = true)]
        voltage: f32,
    },
    /// Poll the simulated probe and print readings
    Read {
        /// Stop after this many updates (default: until Ctrl-C)
        #[arg(long)]
        count: Option<u64>,
        /// Override sensor.update_interval_ms
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
    },
}

/// Context attached to errors raised while loading the config file.
#[derive(Debug)]
pub struct ConfigStage(pub PathBuf);

impl fmt::Display for ConfigStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration in {}", self.0.display())
    }
}

/// Context attached to errors raised while loading a calibration CSV.
#[derive(Debug)]
pub struct CalibrationStage(pub PathBuf);

impl fmt::Display for CalibrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid calibration file {}", self.0.display())
    }
}

use thiserror::Error;

/// Construction-time calibration failures. An instance that failed to build must not be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("calibration table is empty")]
    EmptyCalibration,
    #[error("calibration point {index} is not finite (voltage={voltage}, ph={ph})")]
    NonFinitePoint { index: usize, voltage: f32, ph: f32 },
    #[error("linear fit is degenerate: {0}")]
    DegenerateFit(&'static str),
}

#[derive(Debug, Error, Clone)]
pub enum SensorError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("autorange failed: {0}")]
    Autorange(&'static str),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing ADC reader")]
    MissingAdc,
    #[error("missing calibration")]
    MissingCalibration,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pH sensing logic (hardware-agnostic).
//!
//! All hardware access goes through `ph_traits::AdcReader`.
//!
//! ## Architecture
//!
//! - **Calibration**: sorted (voltage, pH) table and piecewise-linear interpolator (`calibration`)
//! - **Fit**: least-squares line as an alternative model (`fit`, `model`)
//! - **Configuration**: runtime settings resolved from `ph_config` (`config`, `conversions`)
//! - **Sensor**: multisampling, autorange, counts → volts → pH (`sensor`, `builder`)
//! - **Polling**: fixed-interval update loop (`poller`)

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod fit;
pub mod model;
pub mod poller;
pub mod sensor;

pub use builder::PhSensorBuilder;
pub use calibration::{Advisory, CalibrationPoint, CalibrationTable, Interpolator};
pub use config::{AdcChannel, AdcSource, GainMode, SensorSetup};
pub use error::{BuildError, ConfigError, SensorError};
pub use fit::LinearFit;
pub use model::CalibrationModel;
pub use ph_config::ModelKind;
pub use poller::{PollSummary, Poller};
pub use sensor::{PhSensor, Reading};

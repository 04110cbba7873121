//! Type-state builder for `PhSensor`.
//!
//! The builder enforces at compile time that an ADC and calibration are provided
//! before `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::time::Duration;

use ph_config::ModelKind;
use ph_traits::AdcReader;

use crate::calibration::CalibrationPoint;
use crate::config::{GainMode, SensorSetup};
use crate::error::{BuildError, Result};
use crate::model::CalibrationModel;
use crate::sensor::PhSensor;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `PhSensor`. Settings are validated on `build()`.
pub struct PhSensorBuilder<A, C> {
    adc: Option<Box<dyn AdcReader>>,
    setup: SensorSetup,
    calibration_set: bool,
    _a: PhantomData<A>,
    _c: PhantomData<C>,
}

impl Default for PhSensorBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            adc: None,
            setup: SensorSetup::default(),
            calibration_set: false,
            _a: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<A, C> PhSensorBuilder<A, C> {
    fn retype<A2, C2>(self) -> PhSensorBuilder<A2, C2> {
        PhSensorBuilder {
            adc: self.adc,
            setup: self.setup,
            calibration_set: self.calibration_set,
            _a: PhantomData,
            _c: PhantomData,
        }
    }

    pub fn with_adc(mut self, adc: impl AdcReader + 'static) -> PhSensorBuilder<Set, C> {
        self.adc = Some(Box::new(adc));
        self.retype()
    }

    /// Replace every setting, calibration included.
    pub fn with_setup(mut self, setup: SensorSetup) -> PhSensorBuilder<A, Set> {
        self.calibration_set = !setup.calibration.is_empty();
        self.setup = setup;
        self.retype()
    }

    /// Replace the calibration points (e.g. from a CSV file).
    pub fn with_calibration<I>(mut self, points: I) -> PhSensorBuilder<A, Set>
    where
        I: IntoIterator,
        I::Item: Into<CalibrationPoint>,
    {
        self.setup.calibration = points.into_iter().map(Into::into).collect();
        self.calibration_set = !self.setup.calibration.is_empty();
        self.retype()
    }

    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.setup.model = model;
        self
    }

    pub fn with_gain(mut self, gain: GainMode) -> Self {
        self.setup.gain = gain;
        self
    }

    pub fn with_sample_count(mut self, n: u8) -> Self {
        self.setup.sample_count = n;
        self
    }

    pub fn with_output_raw(mut self, raw: bool) -> Self {
        self.setup.output_raw = raw;
        self
    }

    pub fn with_signal_voltage(mut self, volts: f32) -> Self {
        self.setup.signal_voltage = volts;
        self
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.setup.update_interval = interval;
        self
    }

    /// Build without compile-time guarantees; missing pieces become `BuildError`s.
    pub fn try_build(self) -> Result<PhSensor> {
        let Some(adc) = self.adc else {
            return Err(BuildError::MissingAdc.into());
        };
        if !self.calibration_set {
            return Err(BuildError::MissingCalibration.into());
        }
        let setup = self.setup;
        if setup.sample_count == 0 {
            return Err(BuildError::InvalidConfig("sample_count must be >= 1").into());
        }
        if !(setup.signal_voltage.is_finite() && setup.signal_voltage > 0.0) {
            return Err(BuildError::InvalidConfig("signal_voltage must be finite and > 0").into());
        }
        if setup.gain == GainMode::Auto && setup.output_raw {
            return Err(BuildError::InvalidConfig("auto gain cannot publish raw counts").into());
        }
        if setup.gain == GainMode::Auto && setup.sample_count > 1 {
            return Err(BuildError::InvalidConfig("auto gain cannot be multisampled").into());
        }
        if setup.update_interval.is_zero() {
            return Err(BuildError::InvalidConfig("update_interval must be > 0").into());
        }

        let (model, advisories) = CalibrationModel::build(setup.model, &setup.calibration)?;
        for a in &advisories {
            tracing::warn!(advisory = %a, "calibration advisory");
        }
        tracing::debug!(
            points = model.table().len(),
            model = ?model.kind(),
            gain = ?setup.gain,
            samples = setup.sample_count,
            "ph sensor built"
        );
        Ok(PhSensor {
            adc,
            setup,
            model,
            advisories,
        })
    }
}

impl PhSensorBuilder<Set, Set> {
    pub fn build(self) -> Result<PhSensor> {
        self.try_build()
    }
}

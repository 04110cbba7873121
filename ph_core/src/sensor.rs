//! pH sensor: ADC sampling, averaging, counts → volts, volts → pH.

use ph_traits::{AdcReader, Attenuation};

use crate::builder::{Missing, PhSensorBuilder};
use crate::calibration::Advisory;
use crate::config::{GainMode, SensorSetup};
use crate::error::SensorError;
use crate::model::CalibrationModel;

/// Published precision of pH values (decimal places).
pub const ACCURACY_DECIMALS: i32 = 2;

/// Result of one `update`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Averaged conversion counts (the 12 dB conversion in auto mode).
    pub counts: f32,
    /// Input voltage in volts.
    pub voltage: f32,
    /// pH rounded to [`ACCURACY_DECIMALS`]; `None` when publishing raw counts.
    pub ph: Option<f32>,
}

impl Reading {
    /// The value the sensor publishes: pH, or counts in raw mode.
    pub fn state(&self) -> f32 {
        self.ph.unwrap_or(self.counts)
    }
}

pub struct PhSensor {
    pub(crate) adc: Box<dyn AdcReader>,
    pub(crate) setup: SensorSetup,
    pub(crate) model: CalibrationModel,
    pub(crate) advisories: Vec<Advisory>,
}

impl core::fmt::Debug for PhSensor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PhSensor")
            .field("setup", &self.setup)
            .field("model", &self.model.kind())
            .field("advisories", &self.advisories.len())
            .finish()
    }
}

impl PhSensor {
    /// Start building a sensor.
    pub fn builder() -> PhSensorBuilder<Missing, Missing> {
        PhSensorBuilder::default()
    }

    pub fn setup(&self) -> &SensorSetup {
        &self.setup
    }

    pub fn model(&self) -> &CalibrationModel {
        &self.model
    }

    /// Calibration findings reported while the sensor was built.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Map a voltage through the calibration without touching the ADC.
    pub fn estimate(&self, voltage: f32) -> f32 {
        self.model.estimate(voltage)
    }

    /// Sample the ADC once (with multisampling) and convert.
    pub fn update(&mut self) -> Result<Reading, SensorError> {
        let (counts, voltage) = match self.setup.gain {
            GainMode::Auto => self.sample_autorange()?,
            GainMode::Fixed(a) => self.sample_fixed(a)?,
            GainMode::Native => self.sample_fixed(Attenuation::Db0)?,
        };
        let ph = if self.setup.output_raw {
            None
        } else {
            Some(round_to_accuracy(self.model.estimate(voltage)))
        };
        tracing::debug!(counts, voltage, ?ph, "ph sample");
        Ok(Reading {
            counts,
            voltage,
            ph,
        })
    }

    fn read(&mut self, attenuation: Attenuation) -> Result<u16, SensorError> {
        self.adc
            .read_raw(attenuation)
            .map_err(|e| SensorError::Hardware(e.to_string()))
    }

    fn sample_fixed(&mut self, attenuation: Attenuation) -> Result<(f32, f32), SensorError> {
        let n = usize::from(self.setup.sample_count.max(1));
        let mut buf = Vec::with_capacity(n);
        for _ in 0..n {
            buf.push(self.read(attenuation)?);
        }
        let counts = trimmed_mean(&mut buf);
        let voltage = counts * self.setup.signal_voltage / f32::from(self.adc.max_count());
        Ok((counts, voltage))
    }

    /// Read at 12, 6, 2.5 and 0 dB (stopping at the first saturated conversion)
    /// and blend the millivolt values, weighting each by how far its count sits
    /// from the ends of the range.
    fn sample_autorange(&mut self) -> Result<(f32, f32), SensorError> {
        let max = i64::from(self.adc.max_count());
        let half = (max + 1) / 2;
        let mut raw = [max; 4];
        for (slot, att) in raw.iter_mut().zip(Attenuation::AUTORANGE) {
            let r = i64::from(self.read(att)?).min(max);
            *slot = r;
            if r >= max {
                break;
            }
        }
        let [r12, r6, r2, r0] = raw;
        let weights = [
            r12.min(half),
            (half - (r6 - half).abs()).max(0),
            (half - (r2 - half).abs()).max(0),
            (max - r0).min(half),
        ];
        let wsum: i64 = weights.iter().sum();
        if wsum == 0 {
            tracing::error!(?raw, "invalid weight sum in autorange");
            return Err(SensorError::Autorange("zero weight sum"));
        }
        let mut mv_weighted = 0.0f64;
        for ((r, w), att) in raw.iter().zip(weights).zip(Attenuation::AUTORANGE) {
            let mv = *r as f64 * f64::from(att.full_scale_mv()) / max as f64;
            mv_weighted += mv * w as f64;
        }
        let voltage = (mv_weighted / (wsum as f64 * 1000.0)) as f32;
        tracing::trace!(?raw, ?weights, voltage, "autorange");
        Ok((r12 as f32, voltage))
    }
}

/// Mean of the readings after dropping the lowest and highest fifth
/// (nothing is dropped below five readings; ten readings keep the middle six).
pub fn trimmed_mean(readings: &mut [u16]) -> f32 {
    if readings.is_empty() {
        return 0.0;
    }
    readings.sort_unstable();
    let trim = readings.len() / 5;
    let kept = &readings[trim..readings.len() - trim];
    let sum: u64 = kept.iter().map(|&r| u64::from(r)).sum();
    (sum as f64 / kept.len() as f64) as f32
}

#[inline]
pub fn round_to_accuracy(x: f32) -> f32 {
    let scale = 10f32.powi(ACCURACY_DECIMALS);
    (x * scale).round() / scale
}

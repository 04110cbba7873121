//! ADC backends for the pH sensor. Only a simulated probe is provided.

pub mod error;

use ph_traits::{AdcReader, Attenuation};

use crate::error::HwError;

/// How the simulated converter maps volts to counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scaling {
    /// Fixed reference voltage; attenuation is ignored.
    Reference(f32),
    /// Full scale follows the requested attenuation (ESP32 front end).
    Attenuated,
}

/// A PH-4502C style probe dipped in a solution of known pH.
///
/// Electrode response is linear: `volts = neutral_v + (7 - ph) * slope_v_per_ph`.
#[derive(Debug, Clone)]
pub struct SimulatedProbe {
    ph: f32,
    neutral_v: f32,
    slope_v_per_ph: f32,
    scaling: Scaling,
    max_count: u16,
    jitter_counts: u16,
    rng: u32,
    fail_on_saturation: bool,
}

impl SimulatedProbe {
    pub fn new(ph: f32, scaling: Scaling) -> Self {
        Self {
            ph,
            neutral_v: 2.5,
            slope_v_per_ph: 0.18,
            scaling,
            max_count: 4095,
            jitter_counts: 0,
            rng: 0x9E37_79B9,
            fail_on_saturation: false,
        }
    }

    /// Override the electrode response.
    pub fn with_response(mut self, neutral_v: f32, slope_v_per_ph: f32) -> Self {
        self.neutral_v = neutral_v;
        self.slope_v_per_ph = slope_v_per_ph;
        self
    }

    /// Add deterministic noise of up to ±`counts` per conversion.
    pub fn with_jitter(mut self, counts: u16, seed: u32) -> Self {
        self.jitter_counts = counts;
        self.rng = seed.max(1);
        self
    }

    /// Return `HwError::Saturated` instead of clamping at full scale.
    pub fn fail_on_saturation(mut self, fail: bool) -> Self {
        self.fail_on_saturation = fail;
        self
    }

    pub fn set_ph(&mut self, ph: f32) {
        self.ph = ph;
    }

    /// Probe output voltage for the current solution.
    pub fn voltage(&self) -> f32 {
        self.neutral_v + (7.0 - self.ph) * self.slope_v_per_ph
    }

    fn full_scale_v(&self, attenuation: Attenuation) -> f32 {
        match self.scaling {
            Scaling::Reference(v) => v,
            Scaling::Attenuated => attenuation.full_scale_mv() as f32 / 1000.0,
        }
    }

    // xorshift32
    fn next_jitter(&mut self) -> i32 {
        if self.jitter_counts == 0 {
            return 0;
        }
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        let span = 2 * u32::from(self.jitter_counts) + 1;
        (x % span) as i32 - i32::from(self.jitter_counts)
    }

    fn convert(&mut self, attenuation: Attenuation) -> Result<u16, HwError> {
        let fs = self.full_scale_v(attenuation);
        if !(fs.is_finite() && fs > 0.0) {
            return Err(HwError::Unsupported("reference voltage must be > 0"));
        }
        let ideal = (self.voltage() / fs * f32::from(self.max_count)).round() as i32;
        let max = i32::from(self.max_count);
        let counts = ideal + self.next_jitter();
        if counts > max && self.fail_on_saturation {
            tracing::warn!(counts, max, ?attenuation, "simulated adc saturated");
            return Err(HwError::Saturated(self.max_count));
        }
        Ok(counts.clamp(0, max) as u16)
    }
}

impl AdcReader for SimulatedProbe {
    fn max_count(&self) -> u16 {
        self.max_count
    }

    fn read_raw(
        &mut self,
        attenuation: Attenuation,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let raw = self.convert(attenuation)?;
        tracing::trace!(raw, ph = self.ph, ?attenuation, "simulated adc sample");
        Ok(raw)
    }
}

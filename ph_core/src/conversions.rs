//! `From` implementations bridging `ph_config` types to `ph_core` types.
//!
//! This is where a validated config is resolved into what the sensor needs:
//! the ADC channel for the pin, the gain mode and the calibration points.

use std::time::Duration;

use ph_config::adc_pins;
use ph_traits::Attenuation;

use crate::calibration::CalibrationPoint;
use crate::config::{AdcChannel, AdcSource, GainMode, SensorSetup};

// ── Calibration ──────────────────────────────────────────────────────────────

impl From<ph_config::CalibrationRow> for CalibrationPoint {
    fn from(r: ph_config::CalibrationRow) -> Self {
        Self::new(r.voltage, r.ph)
    }
}

impl From<&ph_config::CalibrationRow> for CalibrationPoint {
    fn from(r: &ph_config::CalibrationRow) -> Self {
        Self::new(r.voltage, r.ph)
    }
}

// ── Gain ─────────────────────────────────────────────────────────────────────

impl From<ph_config::AttenuationCfg> for GainMode {
    fn from(a: ph_config::AttenuationCfg) -> Self {
        use ph_config::AttenuationCfg::*;
        match a {
            Db0 => GainMode::Fixed(Attenuation::Db0),
            Db2_5 => GainMode::Fixed(Attenuation::Db2_5),
            Db6 => GainMode::Fixed(Attenuation::Db6),
            Db11 | Db12 => GainMode::Fixed(Attenuation::Db12),
            Auto => GainMode::Auto,
        }
    }
}

// ── Source ───────────────────────────────────────────────────────────────────

/// Resolve the analog source; ADC1 is preferred when a pin maps to both converters.
pub fn resolve_source(board: &ph_config::Board, pin: ph_config::PinSpec) -> AdcSource {
    match pin {
        ph_config::PinSpec::Vcc => AdcSource::Vcc,
        ph_config::PinSpec::Temperature => AdcSource::Temperature,
        ph_config::PinSpec::Gpio(n) => {
            let channel = board.esp32_variant().and_then(|v| {
                adc_pins::adc1_channel(v, n)
                    .map(AdcChannel::Adc1)
                    .or_else(|| adc_pins::adc2_channel(v, n).map(AdcChannel::Adc2))
            });
            AdcSource::Gpio { pin: n, channel }
        }
    }
}

// ── SensorSetup ──────────────────────────────────────────────────────────────

impl From<&ph_config::Config> for SensorSetup {
    fn from(c: &ph_config::Config) -> Self {
        let s = &c.sensor;
        Self {
            source: resolve_source(&c.board, s.pin),
            output_raw: s.raw,
            sample_count: u8::try_from(s.samples).unwrap_or(u8::MAX).max(1),
            gain: c
                .effective_attenuation()
                .map_or(GainMode::Native, GainMode::from),
            signal_voltage: s.signal_voltage,
            update_interval: Duration::from_millis(s.update_interval_ms),
            model: s.model,
            calibration: s.calibration_values.iter().map(CalibrationPoint::from).collect(),
        }
    }
}

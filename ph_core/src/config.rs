//! Runtime sensor settings.
//!
//! These are resolved from the TOML schema in `ph_config` (see `conversions`)
//! and consumed by the sensor builder.

use std::time::Duration;

use ph_config::ModelKind;
use ph_traits::Attenuation;

use crate::calibration::CalibrationPoint;

/// Hardware ADC channel a GPIO is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    Adc1(u8),
    Adc2(u8),
}

/// What the ADC samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcSource {
    /// `channel` is `None` on chips without a channel table (ESP8266, RP2040).
    Gpio { pin: u8, channel: Option<AdcChannel> },
    Vcc,
    Temperature,
}

/// Front-end gain handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainMode {
    /// Platform has no attenuation control.
    Native,
    Fixed(Attenuation),
    /// Read at every attenuation and blend (ESP32 only, single sample).
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorSetup {
    pub source: AdcSource,
    /// Publish averaged counts instead of pH.
    pub output_raw: bool,
    /// Conversions averaged per update (>= 1).
    pub sample_count: u8,
    pub gain: GainMode,
    /// Reference voltage for counts → volts.
    pub signal_voltage: f32,
    pub update_interval: Duration,
    pub model: ModelKind,
    pub calibration: Vec<CalibrationPoint>,
}

impl Default for SensorSetup {
    fn default() -> Self {
        Self {
            source: AdcSource::Gpio {
                pin: 36,
                channel: Some(AdcChannel::Adc1(0)),
            },
            output_raw: false,
            sample_count: 1,
            gain: GainMode::Fixed(Attenuation::Db0),
            signal_voltage: 3.0,
            update_interval: Duration::from_secs(60),
            model: ModelKind::Interpolate,
            calibration: Vec::new(),
        }
    }
}

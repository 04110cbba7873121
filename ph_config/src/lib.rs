#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and calibration parsing for the pH-4502C sensor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `migrate` rewrites deprecated values and reports what it changed.
//! - `final_validate` checks constraints that depend on the rest of the node
//!   (Wi-Fi vs. ADC2 pins).
//! - The calibration CSV loader enforces headers and row-level parse errors.
use serde::Deserialize;
use serde::de::Deserializer;
use std::fmt;

pub mod adc_pins;

/// One calibration pair: probe voltage measured in a reference solution of known pH.
///
/// Also the row schema of calibration CSV files:
/// voltage,ph
/// 2.50,7.00
/// 3.03,4.01
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CalibrationRow {
    pub voltage: f32,
    pub ph: f32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Esp32,
    Esp8266,
    Rp2040,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Esp32Variant {
    #[default]
    Esp32,
    Esp32s2,
    Esp32s3,
    Esp32c2,
    Esp32c3,
    Esp32c6,
    Esp32h2,
}

impl fmt::Display for Esp32Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Esp32 => "ESP32",
            Self::Esp32s2 => "ESP32-S2",
            Self::Esp32s3 => "ESP32-S3",
            Self::Esp32c2 => "ESP32-C2",
            Self::Esp32c3 => "ESP32-C3",
            Self::Esp32c6 => "ESP32-C6",
            Self::Esp32h2 => "ESP32-H2",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Board {
    pub platform: Platform,
    /// Chip variant; only meaningful for `platform = "esp32"` (defaults to the classic ESP32).
    pub variant: Option<Esp32Variant>,
    /// Whether the node also runs Wi-Fi (blocks ADC2 pins on ESP32 chips).
    pub wifi: bool,
}

impl Board {
    /// The ESP32 variant when the board is an ESP32, else `None`.
    pub fn esp32_variant(&self) -> Option<Esp32Variant> {
        match self.platform {
            Platform::Esp32 => Some(self.variant.unwrap_or_default()),
            _ => None,
        }
    }
}

/// Analog input selected by `sensor.pin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSpec {
    Gpio(u8),
    /// Supply voltage (ESP8266, RP2040).
    Vcc,
    /// Internal temperature channel (RP2040).
    Temperature,
}

impl fmt::Display for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(n) => write!(f, "GPIO{n}"),
            Self::Vcc => f.write_str("VCC"),
            Self::Temperature => f.write_str("TEMPERATURE"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum AttenuationCfg {
    #[serde(rename = "0db", alias = "0dB")]
    Db0,
    #[serde(rename = "2.5db", alias = "2.5dB")]
    Db2_5,
    #[serde(rename = "6db", alias = "6dB")]
    Db6,
    /// Deprecated spelling of `12db`; rewritten by `Config::migrate`.
    #[serde(rename = "11db", alias = "11dB")]
    Db11,
    #[serde(rename = "12db", alias = "12dB")]
    Db12,
    #[serde(rename = "auto")]
    Auto,
}

impl AttenuationCfg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Db0 => "0db",
            Self::Db2_5 => "2.5db",
            Self::Db6 => "6db",
            Self::Db11 => "11db",
            Self::Db12 => "12db",
            Self::Auto => "auto",
        }
    }
}

/// How calibration points are turned into a pH curve.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Piecewise-linear through every point, extrapolating from the end segments.
    #[default]
    Interpolate,
    /// Least-squares straight line over all points.
    LinearFit,
}

#[derive(Debug, Deserialize)]
pub struct SensorCfg {
    #[serde(deserialize_with = "de_pin")]
    pub pin: PinSpec,
    /// Publish averaged raw counts instead of pH.
    #[serde(default)]
    pub raw: bool,
    /// ESP32 only; defaults to 0db there.
    #[serde(default)]
    pub attenuation: Option<AttenuationCfg>,
    /// Multisampling count, 1..=255.
    #[serde(default = "default_samples")]
    pub samples: u32,
    /// ADC reference voltage used to convert counts to volts.
    #[serde(default = "default_signal_voltage")]
    pub signal_voltage: f32,
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    #[serde(default)]
    pub model: ModelKind,
    /// Accepts an array of tables, an array of `[voltage, ph]` tuples, or a single table.
    #[serde(deserialize_with = "de_calibration_values")]
    pub calibration_values: Vec<CalibrationRow>,
}

fn default_samples() -> u32 {
    1
}

fn default_signal_voltage() -> f32 {
    3.0
}

fn default_update_interval_ms() -> u64 {
    60_000
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub board: Board,
    pub sensor: SensorCfg,
    #[serde(default)]
    pub logging: Logging,
}

/// Non-fatal findings produced while loading a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `attenuation = "11db"` was rewritten to `12db`.
    DeprecatedAttenuation,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeprecatedAttenuation => f.write_str(
                "`attenuation: 11db` is deprecated, use `attenuation: 12db` instead",
            ),
        }
    }
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Parse, migrate, validate and final-validate a config in one pass.
pub fn load_and_validate(s: &str) -> eyre::Result<(Config, Vec<ConfigWarning>)> {
    let mut cfg = load_toml(s).map_err(|e| eyre::eyre!("invalid configuration: {e}"))?;
    let warnings = cfg.migrate();
    cfg.validate()?;
    cfg.final_validate()?;
    Ok((cfg, warnings))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PinNumberToml {
    Number(u8),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PinToml {
    Number(u8),
    Name(String),
    Table { number: PinNumberToml },
}

/// Parse "GPIO4", "4", "A0", "VCC" or "TEMPERATURE" (case-insensitive).
pub fn parse_pin_name(name: &str) -> Option<PinSpec> {
    let upper = name.trim().to_ascii_uppercase();
    match upper.as_str() {
        "VCC" => return Some(PinSpec::Vcc),
        "TEMPERATURE" => return Some(PinSpec::Temperature),
        "A0" => return Some(PinSpec::Gpio(17)),
        _ => {}
    }
    let digits = upper.strip_prefix("GPIO").unwrap_or(&upper);
    digits.parse::<u8>().ok().map(PinSpec::Gpio)
}

fn de_pin<'de, D>(deserializer: D) -> Result<PinSpec, D::Error>
where
    D: Deserializer<'de>,
{
    let from_name = |s: &str| -> Result<PinSpec, D::Error> {
        parse_pin_name(s).ok_or_else(|| serde::de::Error::custom(format!("unknown pin '{s}'")))
    };
    match PinToml::deserialize(deserializer)? {
        PinToml::Number(n) | PinToml::Table {
            number: PinNumberToml::Number(n),
        } => Ok(PinSpec::Gpio(n)),
        PinToml::Name(s)
        | PinToml::Table {
            number: PinNumberToml::Name(s),
        } => from_name(&s),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointToml {
    Tuple((f32, f32)),
    Table { voltage: f32, ph: f32 },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointsToml {
    Many(Vec<PointToml>),
    One(PointToml),
}

fn de_calibration_values<'de, D>(deserializer: D) -> Result<Vec<CalibrationRow>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match PointsToml::deserialize(deserializer)? {
        PointsToml::Many(v) => v,
        PointsToml::One(p) => vec![p],
    };
    Ok(items
        .into_iter()
        .map(|p| match p {
            PointToml::Tuple((voltage, ph)) | PointToml::Table { voltage, ph } => {
                CalibrationRow { voltage, ph }
            }
        })
        .collect())
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<Vec<CalibrationRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["voltage", "ph"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'voltage,ph', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("calibration CSV {:?} contains no rows", path);
    }
    Ok(rows)
}

impl Config {
    /// Attenuation in effect: the configured value, or `0db` on ESP32 when unset.
    pub fn effective_attenuation(&self) -> Option<AttenuationCfg> {
        match (self.sensor.attenuation, self.board.platform) {
            (Some(a), _) => Some(a),
            (None, Platform::Esp32) => Some(AttenuationCfg::Db0),
            (None, _) => None,
        }
    }

    /// Rewrite deprecated values in place so later stages only see current ones.
    pub fn migrate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.sensor.attenuation == Some(AttenuationCfg::Db11) {
            self.sensor.attenuation = Some(AttenuationCfg::Db12);
            warnings.push(ConfigWarning::DeprecatedAttenuation);
        }
        warnings
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Board
        if self.board.variant.is_some() && self.board.platform != Platform::Esp32 {
            eyre::bail!("board.variant is only valid with platform = \"esp32\"");
        }

        // Pin
        self.validate_pin()?;

        // Attenuation
        let auto = self.sensor.attenuation == Some(AttenuationCfg::Auto);
        if self.sensor.attenuation.is_some() && self.board.platform != Platform::Esp32 {
            eyre::bail!("sensor.attenuation is only available with ESP32");
        }
        if self.sensor.raw && auto {
            eyre::bail!("automatic attenuation cannot be used when raw output is set");
        }
        if auto && self.sensor.samples > 1 {
            eyre::bail!("automatic attenuation cannot be used when multisampling is set");
        }

        // Sampling
        if !(1..=255).contains(&self.sensor.samples) {
            eyre::bail!("sensor.samples must be in [1, 255]");
        }
        if !(self.sensor.signal_voltage.is_finite() && self.sensor.signal_voltage > 0.0) {
            eyre::bail!("sensor.signal_voltage must be a finite value > 0");
        }
        if self.sensor.update_interval_ms == 0 {
            eyre::bail!("sensor.update_interval_ms must be >= 1");
        }

        // Calibration
        if self.sensor.calibration_values.is_empty() {
            eyre::bail!("sensor.calibration_values must contain at least one point");
        }
        for (i, p) in self.sensor.calibration_values.iter().enumerate() {
            if !(p.voltage.is_finite() && p.ph.is_finite()) {
                eyre::bail!("sensor.calibration_values[{i}] must be finite");
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{rot}'");
        }

        Ok(())
    }

    fn validate_pin(&self) -> eyre::Result<()> {
        let pin = self.sensor.pin;
        match self.board.platform {
            Platform::Esp32 => {
                let variant = self.board.variant.unwrap_or_default();
                match pin {
                    PinSpec::Gpio(n) if adc_pins::is_adc_pin(variant, n) => Ok(()),
                    PinSpec::Gpio(_) => {
                        eyre::bail!("{variant} doesn't support ADC on pin {pin}")
                    }
                    _ => eyre::bail!("sensor.pin {pin} is not available on {variant}"),
                }
            }
            Platform::Esp8266 => match pin {
                PinSpec::Gpio(17) | PinSpec::Vcc => Ok(()),
                _ => eyre::bail!("ESP8266: only pin A0 (GPIO17) or VCC support ADC, got {pin}"),
            },
            Platform::Rp2040 => match pin {
                PinSpec::Gpio(26..=29) | PinSpec::Vcc | PinSpec::Temperature => Ok(()),
                _ => eyre::bail!(
                    "RP2040: only pins 26..=29, VCC or TEMPERATURE support ADC, got {pin}"
                ),
            },
        }
    }

    /// Checks that depend on other components of the node.
    pub fn final_validate(&self) -> eyre::Result<()> {
        if let Some(variant) = self.board.esp32_variant()
            && self.board.wifi
            && let PinSpec::Gpio(n) = self.sensor.pin
            && adc_pins::adc2_channel(variant, n).is_some()
        {
            eyre::bail!("{variant} doesn't support ADC on this pin when Wi-Fi is configured");
        }
        Ok(())
    }
}

//! Command implementations: config loading, sensor assembly, check/estimate/read.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::{Result, WrapErr};
use ph_config::{Config, ConfigWarning};
use ph_core::{
    AdcChannel, AdcSource, CalibrationModel, CalibrationPoint, GainMode, ModelKind, PhSensor,
    Poller, Reading, SensorError, SensorSetup,
};
use ph_hardware::{Scaling, SimulatedProbe};
use ph_traits::MonotonicClock;
use serde_json::json;

use crate::cli::{CalibrationStage, ConfigStage};

/// Solution pH the simulated probe sits in unless `PH_SIM_PH` says otherwise.
const DEFAULT_SIM_PH: f32 = 7.0;

pub fn load_config(path: &Path) -> Result<(Config, Vec<ConfigWarning>)> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))
        .wrap_err_with(|| ConfigStage(path.to_path_buf()))?;
    ph_config::load_and_validate(&text).wrap_err_with(|| ConfigStage(path.to_path_buf()))
}

/// Resolve the runtime setup, letting a calibration CSV replace the config points.
pub fn resolve_setup(cfg: &Config, calibration: Option<&Path>) -> Result<SensorSetup> {
    let mut setup = SensorSetup::from(cfg);
    if let Some(path) = calibration {
        let rows = ph_config::load_calibration_csv(path)
            .wrap_err_with(|| CalibrationStage(path.to_path_buf()))?;
        tracing::info!(path = %path.display(), points = rows.len(), "calibration loaded from CSV");
        setup.calibration = rows.iter().map(CalibrationPoint::from).collect();
    }
    Ok(setup)
}

pub fn run_check(cfg: &Config, setup: &SensorSetup, warnings: &[ConfigWarning], json: bool) -> Result<()> {
    let (model, advisories) = CalibrationModel::build(setup.model, &setup.calibration)?;
    let (lo, hi) = model.table().voltage_span();
    let notes: Vec<String> = warnings
        .iter()
        .map(ToString::to_string)
        .chain(advisories.iter().map(ToString::to_string))
        .collect();

    if json {
        let obj = json!({
            "platform": platform_name(cfg),
            "source": describe_source(setup.source),
            "gain": describe_gain(setup.gain),
            "samples": setup.sample_count,
            "raw": setup.output_raw,
            "signal_voltage": setup.signal_voltage,
            "update_interval_ms": setup.update_interval.as_millis() as u64,
            "model": model_name(model.kind()),
            "points": model.table().len(),
            "voltage_span": [lo, hi],
            "warnings": notes,
        });
        println!("{obj}");
        return Ok(());
    }

    println!("platform:        {}", platform_name(cfg));
    println!("source:          {}", describe_source(setup.source));
    println!("gain:            {}", describe_gain(setup.gain));
    println!("samples:         {}", setup.sample_count);
    println!("output:          {}", if setup.output_raw { "raw counts" } else { "pH" });
    println!("signal voltage:  {:.3} V", setup.signal_voltage);
    println!("update interval: {} ms", setup.update_interval.as_millis());
    println!("model:           {}", model_name(model.kind()));
    println!(
        "calibration:     {} points, {lo:.3} V .. {hi:.3} V",
        model.table().len()
    );
    for n in &notes {
        println!("warning: {n}");
    }
    println!("config OK");
    Ok(())
}

pub fn run_estimate(setup: &SensorSetup, voltage: f32, json: bool) -> Result<()> {
    let (model, advisories) = CalibrationModel::build(setup.model, &setup.calibration)?;
    for a in &advisories {
        tracing::warn!(advisory = %a, "calibration advisory");
    }
    let ph = ph_core::sensor::round_to_accuracy(model.estimate(voltage));
    tracing::debug!(voltage, ph, model = model_name(model.kind()), "estimate");
    if json {
        println!("{}", json!({ "voltage": voltage, "ph": ph }));
    } else {
        println!("pH {ph:.2} at {voltage:.3} V");
    }
    Ok(())
}

pub fn run_read(
    setup: SensorSetup,
    count: Option<u64>,
    interval_ms: Option<u64>,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let sim_ph = match std::env::var("PH_SIM_PH") {
        Ok(s) => s
            .trim()
            .parse::<f32>()
            .wrap_err_with(|| format!("PH_SIM_PH must be a number, got {s:?}"))?,
        Err(_) => DEFAULT_SIM_PH,
    };
    let interval = interval_ms.map_or(setup.update_interval, Duration::from_millis);
    let probe = simulated_probe(&setup, sim_ph);
    tracing::info!(sim_ph, interval_ms = interval.as_millis() as u64, "starting simulated probe");

    let mut sensor = PhSensor::builder()
        .with_setup(setup)
        .with_update_interval(interval)
        .with_adc(probe)
        .try_build()?;

    let mut poller = Poller::new(MonotonicClock::new(), interval).with_shutdown(shutdown);
    if let Some(n) = count {
        poller = poller.with_max_updates(n);
    }
    let summary = poller.run(&mut sensor, |r| print_reading(r, json));
    tracing::info!(updates = summary.updates, failures = summary.failures, "polling stopped");

    if summary.updates > 0 && summary.failures == summary.updates {
        return Err(SensorError::Hardware(format!(
            "all {} updates failed; see log for the ADC error",
            summary.updates
        ))
        .into());
    }
    Ok(())
}

/// Install a Ctrl-C handler that raises the returned flag.
pub fn shutdown_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let f = Arc::clone(&flag);
    if let Err(e) = ctrlc::set_handler(move || f.store(true, Ordering::Relaxed)) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
    }
    flag
}

// Auto gain needs the per-attenuation full scale; every other mode converts
// against signal_voltage, so the probe must saturate at the same reference.
fn simulated_probe(setup: &SensorSetup, ph: f32) -> SimulatedProbe {
    match setup.gain {
        GainMode::Auto => SimulatedProbe::new(ph, Scaling::Attenuated),
        GainMode::Fixed(_) | GainMode::Native => {
            SimulatedProbe::new(ph, Scaling::Reference(setup.signal_voltage))
                .fail_on_saturation(true)
        }
    }
    .with_jitter(1, 0x5EED)
}

fn print_reading(r: &Reading, json: bool) {
    if json {
        println!(
            "{}",
            json!({ "counts": r.counts, "voltage": r.voltage, "ph": r.ph, "state": r.state() })
        );
        return;
    }
    match r.ph {
        Some(ph) => println!("ph={ph:.2} voltage={:.3} V counts={:.1}", r.voltage, r.counts),
        None => println!("counts={:.1} voltage={:.3} V", r.counts, r.voltage),
    }
}

fn platform_name(cfg: &Config) -> String {
    match cfg.board.esp32_variant() {
        Some(v) => v.to_string(),
        None => match cfg.board.platform {
            ph_config::Platform::Esp8266 => "ESP8266".to_string(),
            ph_config::Platform::Rp2040 => "RP2040".to_string(),
            ph_config::Platform::Esp32 => "ESP32".to_string(),
        },
    }
}

fn describe_source(source: AdcSource) -> String {
    match source {
        AdcSource::Gpio {
            pin,
            channel: Some(AdcChannel::Adc1(ch)),
        } => format!("GPIO{pin} (ADC1 channel {ch})"),
        AdcSource::Gpio {
            pin,
            channel: Some(AdcChannel::Adc2(ch)),
        } => format!("GPIO{pin} (ADC2 channel {ch})"),
        AdcSource::Gpio { pin, channel: None } => format!("GPIO{pin}"),
        AdcSource::Vcc => "VCC".to_string(),
        AdcSource::Temperature => "TEMPERATURE".to_string(),
    }
}

fn describe_gain(gain: GainMode) -> String {
    match gain {
        GainMode::Native => "native".to_string(),
        GainMode::Fixed(a) => format!("fixed {}", a.as_str()),
        GainMode::Auto => "auto".to_string(),
    }
}

fn model_name(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Interpolate => "interpolate",
        ModelKind::LinearFit => "linear_fit",
    }
}

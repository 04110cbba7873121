//! Human-readable error descriptions, exit codes and structured JSON errors.

use ph_core::error::{BuildError, ConfigError, SensorError};

use crate::cli::{CalibrationStage, ConfigStage};

/// Exit code for configuration and calibration problems.
pub const EXIT_CONFIG: i32 = 3;
/// Exit code for sensor read failures.
pub const EXIT_SENSOR: i32 = 4;

fn find<T: std::error::Error + 'static>(err: &eyre::Report) -> Option<&T> {
    err.chain().find_map(|e| e.downcast_ref::<T>())
}

/// Innermost message in the chain, which is the one that names the problem.
fn root_message(err: &eyre::Report) -> String {
    err.root_cause().to_string()
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ce) = find::<ConfigError>(err) {
        return match ce {
            ConfigError::EmptyCalibration => "What happened: The calibration table has no points.\nLikely causes: sensor.calibration_values is empty or the calibration CSV has only a header.\nHow to fix: Add at least one `voltage,ph` point measured in a reference solution.".to_string(),
            ConfigError::NonFinitePoint { index, .. } => format!(
                "What happened: Calibration point {index} is not a finite number.\nLikely causes: A NaN or infinite value in the calibration data.\nHow to fix: Re-measure that point and enter plain decimal numbers."
            ),
            ConfigError::DegenerateFit(why) => format!(
                "What happened: The linear fit cannot be computed ({why}).\nLikely causes: Too few points, or all points share a voltage or a pH.\nHow to fix: Add points from at least two reference solutions, or use model = \"interpolate\"."
            ),
        };
    }

    if let Some(be) = find::<BuildError>(err) {
        return match be {
            BuildError::MissingAdc => "What happened: No ADC was provided to the sensor.\nLikely causes: The probe backend failed to initialize.\nHow to fix: Ensure an ADC reader is passed via with_adc(...).".to_string(),
            BuildError::MissingCalibration => "What happened: No calibration points were provided.\nLikely causes: sensor.calibration_values is empty and no --calibration CSV was given.\nHow to fix: Add calibration points to the config or pass --calibration FILE.".to_string(),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid sensor settings ({msg}).\nLikely causes: Conflicting or out-of-range values in the [sensor] section.\nHow to fix: Edit the config file, then rerun `ph4502c check`."
            ),
        };
    }

    if let Some(se) = find::<SensorError>(err) {
        return match se {
            SensorError::Hardware(_) => format!(
                "What happened: The ADC could not be read ({se}).\nLikely causes: Probe output above the ADC reference (saturation), or a wiring fault.\nHow to fix: Raise sensor.signal_voltage or use a higher attenuation, and check the probe wiring."
            ),
            SensorError::Autorange(_) => format!(
                "What happened: {se}.\nLikely causes: Every conversion sat at the end of its range.\nHow to fix: Check that the probe output is within 0..2.45 V, or set a fixed attenuation."
            ),
            SensorError::Config(_) => format!(
                "What happened: {se}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let root = root_message(err);

    if err.downcast_ref::<CalibrationStage>().is_some() {
        if root.contains("must have headers") {
            return "Invalid headers in calibration CSV. Expected 'voltage,ph'.".to_string();
        }
        return format!(
            "What happened: {err}: {root}.\nLikely causes: Missing file, non-numeric values, or a row with the wrong number of fields.\nHow to fix: Use a CSV with the header `voltage,ph` and one point per row."
        );
    }

    if err.downcast_ref::<ConfigStage>().is_some() {
        if root.contains("read config") || find::<std::io::Error>(err).is_some() {
            return format!(
                "What happened: The config file could not be read ({root}).\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config pointing at an existing TOML file (see etc/ph4502c.toml)."
            );
        }
        return format!(
            "What happened: {err}: {root}.\nLikely causes: Missing [sensor] keys, an unsupported pin, or conflicting options.\nHow to fix: Edit the TOML config and run `ph4502c check` again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {err}"
    )
}

/// Stable exit codes: 3 for config/calibration problems, 4 for sensor failures, else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if find::<ConfigError>(err).is_some()
        || find::<BuildError>(err).is_some()
        || err.downcast_ref::<ConfigStage>().is_some()
        || err.downcast_ref::<CalibrationStage>().is_some()
    {
        return EXIT_CONFIG;
    }
    if find::<SensorError>(err).is_some() {
        return EXIT_SENSOR;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if find::<ConfigError>(err).is_some() || err.downcast_ref::<CalibrationStage>().is_some() {
        "Calibration"
    } else if find::<BuildError>(err).is_some() || err.downcast_ref::<ConfigStage>().is_some() {
        "Config"
    } else if find::<SensorError>(err).is_some() {
        "Sensor"
    } else {
        "Error"
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

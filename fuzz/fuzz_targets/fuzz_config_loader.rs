#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse, migrate and validate must reject bad input with errors, never panic.
    if let Ok(mut cfg) = ph_config::load_toml(data) {
        let _ = cfg.migrate();
        if cfg.validate().is_ok() {
            let _ = cfg.final_validate();
            let setup = ph_core::SensorSetup::from(&cfg);
            let _ = ph_core::CalibrationModel::build(setup.model, &setup.calibration);
        }
    }
});

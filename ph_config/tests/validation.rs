use ph_config::{
    AttenuationCfg, ConfigWarning, Esp32Variant, ModelKind, PinSpec, Platform, load_and_validate,
    load_toml,
};
use rstest::rstest;

fn esp32_config(variant: &str, wifi: bool, sensor_extra: &str) -> String {
    format!(
        r#"
[board]
platform = "esp32"
variant = "{variant}"
wifi = {wifi}

[sensor]
calibration_values = [{{ voltage = 2.5, ph = 7.0 }}, {{ voltage = 3.0, ph = 4.0 }}]
{sensor_extra}
"#
    )
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[board]
platform = "esp32"
variant = "esp32s3"
wifi = true

[sensor]
pin = "GPIO4"
raw = false
attenuation = "12db"
samples = 10
signal_voltage = 3.3
update_interval_ms = 5000
model = "linear_fit"
calibration_values = [
    { voltage = 2.50, ph = 7.00 },
    [3.03, 4.01],
]

[logging]
level = "debug"
rotation = "daily"
"#;
    let (cfg, warnings) = load_and_validate(toml).expect("valid config should pass");
    assert!(warnings.is_empty());
    assert_eq!(cfg.board.esp32_variant(), Some(Esp32Variant::Esp32s3));
    assert_eq!(cfg.sensor.pin, PinSpec::Gpio(4));
    assert_eq!(cfg.sensor.samples, 10);
    assert_eq!(cfg.sensor.model, ModelKind::LinearFit);
    assert_eq!(cfg.sensor.calibration_values.len(), 2);
    assert!((cfg.sensor.calibration_values[1].ph - 4.01).abs() < 1e-6);
}

#[test]
fn single_calibration_table_is_wrapped_in_a_list() {
    let toml = r#"
[sensor]
pin = 36
calibration_values = { voltage = 2.5, ph = 7.0 }
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    assert_eq!(cfg.sensor.calibration_values.len(), 1);
}

#[rstest]
#[case("pin = 36", PinSpec::Gpio(36))]
#[case("pin = \"gpio39\"", PinSpec::Gpio(39))]
#[case("pin = { number = 34 }", PinSpec::Gpio(34))]
#[case("pin = { number = \"GPIO35\" }", PinSpec::Gpio(35))]
fn pin_shapes(#[case] line: &str, #[case] expected: PinSpec) {
    let cfg = load_toml(&esp32_config("esp32", false, line)).expect("parse TOML");
    assert_eq!(cfg.sensor.pin, expected);
}

#[test]
fn raw_with_auto_attenuation_is_rejected() {
    let toml = esp32_config("esp32", false, "pin = 36\nraw = true\nattenuation = \"auto\"");
    let err = load_and_validate(&toml).expect_err("raw + auto should fail");
    assert!(format!("{err}").contains("raw output is set"));
}

#[test]
fn multisampling_with_auto_attenuation_is_rejected() {
    let toml = esp32_config("esp32", false, "pin = 36\nsamples = 4\nattenuation = \"auto\"");
    let err = load_and_validate(&toml).expect_err("samples + auto should fail");
    assert!(format!("{err}").contains("multisampling is set"));
}

#[test]
fn auto_attenuation_with_single_sample_is_fine() {
    let toml = esp32_config("esp32", false, "pin = 36\nattenuation = \"auto\"");
    let (cfg, _) = load_and_validate(&toml).expect("auto alone is valid");
    assert_eq!(cfg.effective_attenuation(), Some(AttenuationCfg::Auto));
}

#[test]
fn deprecated_11db_is_migrated_with_warning() {
    let toml = esp32_config("esp32", false, "pin = 36\nattenuation = \"11db\"");
    let (cfg, warnings) = load_and_validate(&toml).expect("11db is still accepted");
    assert_eq!(warnings, vec![ConfigWarning::DeprecatedAttenuation]);
    assert_eq!(cfg.sensor.attenuation, Some(AttenuationCfg::Db12));
    assert!(warnings[0].to_string().contains("use `attenuation: 12db`"));
}

#[rstest]
#[case("esp32", 4)]
#[case("esp32", 26)]
#[case("esp32s3", 11)]
#[case("esp32s2", 20)]
#[case("esp32c3", 5)]
fn adc2_pin_with_wifi_is_rejected(#[case] variant: &str, #[case] pin: u8) {
    let toml = esp32_config(variant, true, &format!("pin = {pin}"));
    let err = load_and_validate(&toml).expect_err("ADC2 + Wi-Fi should fail");
    assert!(
        format!("{err}").contains("when Wi-Fi is configured"),
        "unexpected error: {err}"
    );
}

#[rstest]
#[case("esp32", 4)]
#[case("esp32s3", 11)]
fn adc2_pin_without_wifi_is_fine(#[case] variant: &str, #[case] pin: u8) {
    let toml = esp32_config(variant, false, &format!("pin = {pin}"));
    load_and_validate(&toml).expect("ADC2 without Wi-Fi is valid");
}

#[test]
fn adc1_pin_with_wifi_is_fine() {
    let toml = esp32_config("esp32", true, "pin = 36");
    load_and_validate(&toml).expect("ADC1 + Wi-Fi is valid");
}

#[rstest]
#[case("esp32", "pin = 5", "doesn't support ADC on pin GPIO5")]
#[case("esp32c6", "pin = 7", "doesn't support ADC on pin GPIO7")]
#[case("esp32", "pin = \"VCC\"", "not available on ESP32")]
#[case("esp32", "pin = 36\nsamples = 0", "samples must be in [1, 255]")]
#[case("esp32", "pin = 36\nsamples = 256", "samples must be in [1, 255]")]
#[case("esp32", "pin = 36\nsignal_voltage = 0.0", "signal_voltage must be")]
#[case("esp32", "pin = 36\nupdate_interval_ms = 0", "update_interval_ms must be >= 1")]
fn invalid_sensor_settings(#[case] variant: &str, #[case] extra: &str, #[case] needle: &str) {
    let toml = esp32_config(variant, false, extra);
    let err = load_and_validate(&toml).expect_err("should be rejected");
    assert!(format!("{err}").contains(needle), "unexpected error: {err}");
}

#[test]
fn empty_calibration_values_are_rejected() {
    let toml = r#"
[sensor]
pin = 36
calibration_values = []
"#;
    let err = load_and_validate(toml).expect_err("empty calibration should fail");
    assert!(format!("{err}").contains("at least one point"));
}

#[test]
fn missing_calibration_values_is_a_parse_error() {
    let toml = r#"
[sensor]
pin = 36
"#;
    let err = load_and_validate(toml).expect_err("calibration_values is required");
    assert!(format!("{err}").contains("invalid configuration"));
}

#[test]
fn esp8266_accepts_a0_and_vcc_only() {
    let ok = r#"
[board]
platform = "esp8266"

[sensor]
pin = "A0"
calibration_values = [[2.5, 7.0]]
"#;
    let (cfg, _) = load_and_validate(ok).expect("A0 is valid on ESP8266");
    assert_eq!(cfg.board.platform, Platform::Esp8266);
    assert_eq!(cfg.effective_attenuation(), None);

    let bad = ok.replace("\"A0\"", "4");
    let err = load_and_validate(&bad).expect_err("GPIO4 is not an ADC pin on ESP8266");
    assert!(format!("{err}").contains("ESP8266"));
}

#[test]
fn attenuation_outside_esp32_is_rejected() {
    let toml = r#"
[board]
platform = "rp2040"

[sensor]
pin = 26
attenuation = "6db"
calibration_values = [[2.5, 7.0]]
"#;
    let err = load_and_validate(toml).expect_err("attenuation is ESP32-only");
    assert!(format!("{err}").contains("only available with ESP32"));
}

#[test]
fn rp2040_temperature_channel_is_valid() {
    let toml = r#"
[board]
platform = "rp2040"

[sensor]
pin = "TEMPERATURE"
calibration_values = [[2.5, 7.0]]
"#;
    let (cfg, _) = load_and_validate(toml).expect("TEMPERATURE is valid on RP2040");
    assert_eq!(cfg.sensor.pin, PinSpec::Temperature);
}

#[test]
fn variant_on_non_esp32_is_rejected() {
    let toml = r#"
[board]
platform = "rp2040"
variant = "esp32s3"

[sensor]
pin = 26
calibration_values = [[2.5, 7.0]]
"#;
    let err = load_and_validate(toml).expect_err("variant requires esp32");
    assert!(format!("{err}").contains("board.variant"));
}

#[test]
fn unknown_rotation_is_rejected() {
    let toml = esp32_config("esp32", false, "pin = 36\n\n[logging]\nrotation = \"weekly\"");
    let err = load_and_validate(&toml).expect_err("weekly is not a rotation");
    assert!(format!("{err}").contains("logging.rotation"));
}

use std::cell::RefCell;
use std::collections::VecDeque;
use std::error::Error;
use std::rc::Rc;

use ph_core::error::{BuildError, SensorError};
use ph_core::{Advisory, GainMode, ModelKind, PhSensor};
use ph_traits::{AdcReader, Attenuation};
use rstest::rstest;

/// Replays scripted counts and records the attenuation of every read.
#[derive(Clone, Default)]
struct ScriptedAdc {
    counts: Rc<RefCell<VecDeque<u16>>>,
    seen: Rc<RefCell<Vec<Attenuation>>>,
}

impl ScriptedAdc {
    fn new(counts: &[u16]) -> Self {
        Self {
            counts: Rc::new(RefCell::new(counts.iter().copied().collect())),
            seen: Rc::default(),
        }
    }
}

impl AdcReader for ScriptedAdc {
    fn read_raw(&mut self, attenuation: Attenuation) -> Result<u16, Box<dyn Error + Send + Sync>> {
        self.seen.borrow_mut().push(attenuation);
        self.counts
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| "adc script exhausted".into())
    }
}

const CAL: [(f32, f32); 2] = [(2.0, 7.0), (3.0, 4.0)];

#[test]
fn converts_counts_to_ph() {
    // 2730 counts at 4.5 V reference and 4095 full scale = 3.0 V → pH 4.0
    let mut sensor = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[2730]))
        .with_calibration(CAL)
        .with_signal_voltage(4.5)
        .build()
        .unwrap();
    let r = sensor.update().unwrap();
    assert_eq!(r.counts, 2730.0);
    assert!((r.voltage - 3.0).abs() < 1e-6);
    assert_eq!(r.ph, Some(4.0));
    assert_eq!(r.state(), 4.0);
}

#[test]
fn ph_is_rounded_to_two_decimals() {
    // 1000 counts * 9.0 / 4095 = 2.1978 V → pH 6.4066 → 6.41
    let mut sensor = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[1000]))
        .with_calibration(CAL)
        .with_signal_voltage(9.0)
        .build()
        .unwrap();
    let ph = sensor.update().unwrap().ph.unwrap();
    assert!((ph - 6.41).abs() < 1e-6, "ph {ph}");
}

#[test]
fn raw_output_publishes_counts() {
    let mut sensor = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[1234]))
        .with_calibration(CAL)
        .with_output_raw(true)
        .build()
        .unwrap();
    let r = sensor.update().unwrap();
    assert_eq!(r.ph, None);
    assert_eq!(r.state(), 1234.0);
}

#[rstest]
#[case(&[100, 200, 300], 200.0)]
#[case(&[0, 4095, 500, 500, 500, 500, 500, 500, 1, 4000], 500.0)]
fn multisampling_averages(#[case] counts: &[u16], #[case] expected: f32) {
    let adc = ScriptedAdc::new(counts);
    let mut sensor = PhSensor::builder()
        .with_adc(adc.clone())
        .with_calibration(CAL)
        .with_output_raw(true)
        .with_sample_count(counts.len() as u8)
        .build()
        .unwrap();
    let r = sensor.update().unwrap();
    assert_eq!(r.counts, expected);
    assert_eq!(adc.seen.borrow().len(), counts.len());
}

#[test]
fn fixed_gain_is_passed_to_the_adc() {
    let adc = ScriptedAdc::new(&[10, 10]);
    let mut sensor = PhSensor::builder()
        .with_adc(adc.clone())
        .with_calibration(CAL)
        .with_gain(GainMode::Fixed(Attenuation::Db6))
        .with_sample_count(2)
        .build()
        .unwrap();
    sensor.update().unwrap();
    assert_eq!(*adc.seen.borrow(), vec![Attenuation::Db6, Attenuation::Db6]);
}

#[test]
fn autorange_stops_at_first_saturated_read() {
    // 12 dB mid-scale, 6 dB saturated → 2.5 and 0 dB are never read
    let adc = ScriptedAdc::new(&[2048, 4095]);
    let mut sensor = PhSensor::builder()
        .with_adc(adc.clone())
        .with_calibration(CAL)
        .with_gain(GainMode::Auto)
        .build()
        .unwrap();
    let r = sensor.update().unwrap();
    assert_eq!(*adc.seen.borrow(), vec![Attenuation::Db12, Attenuation::Db6]);
    // weights: c12 = 2048, c6 = 1, c2 = 1, c0 = 0
    let mv12 = 2048.0 * 2450.0 / 4095.0;
    let mv6 = 1750.0;
    let mv2 = 1250.0;
    let expected = (mv12 * 2048.0 + mv6 + mv2) / (2050.0 * 1000.0);
    assert!((f64::from(r.voltage) - expected).abs() < 1e-5, "{} vs {expected}", r.voltage);
    assert_eq!(r.counts, 2048.0);
}

#[test]
fn autorange_low_signal_uses_all_four_reads() {
    let adc = ScriptedAdc::new(&[100, 140, 190, 260]);
    let mut sensor = PhSensor::builder()
        .with_adc(adc.clone())
        .with_calibration(CAL)
        .with_gain(GainMode::Auto)
        .build()
        .unwrap();
    let r = sensor.update().unwrap();
    assert_eq!(adc.seen.borrow().as_slice(), &Attenuation::AUTORANGE);
    // all four conversions describe roughly 60 mV
    assert!(r.voltage > 0.05 && r.voltage < 0.07, "voltage {}", r.voltage);
}

#[test]
fn hardware_errors_map_to_sensor_error() {
    let mut sensor = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[]))
        .with_calibration(CAL)
        .build()
        .unwrap();
    match sensor.update().expect_err("script is empty") {
        SensorError::Hardware(msg) => assert!(msg.contains("exhausted")),
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[test]
fn builder_missing_adc_yields_typed_build_error() {
    let err = PhSensor::builder()
        .with_calibration(CAL)
        .try_build()
        .expect_err("should fail with MissingAdc");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingAdc) => {}
        other => panic!("expected MissingAdc, got: {other:?}"),
    }
}

#[test]
fn builder_missing_calibration_yields_typed_build_error() {
    let err = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[]))
        .try_build()
        .expect_err("should fail with MissingCalibration");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingCalibration)
    ));
}

#[rstest]
#[case(GainMode::Auto, true, 1, "raw counts")]
#[case(GainMode::Auto, false, 4, "multisampled")]
#[case(GainMode::Native, false, 0, "sample_count")]
fn builder_rejects_conflicting_settings(
    #[case] gain: GainMode,
    #[case] raw: bool,
    #[case] samples: u8,
    #[case] needle: &str,
) {
    let err = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[]))
        .with_calibration(CAL)
        .with_gain(gain)
        .with_output_raw(raw)
        .with_sample_count(samples)
        .build()
        .expect_err("conflicting settings");
    assert!(format!("{err}").contains(needle), "unexpected: {err}");
}

#[test]
fn duplicate_calibration_voltage_is_kept_as_advisory() {
    let sensor = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[]))
        .with_calibration([(2.0, 7.0), (2.0, 5.0), (3.0, 4.0)])
        .build()
        .unwrap();
    assert_eq!(
        sensor.advisories(),
        &[Advisory::DuplicateVoltage {
            voltage: 2.0,
            count: 2
        }]
    );
    assert_eq!(sensor.estimate(2.0), 7.0);
}

#[test]
fn linear_fit_model_is_selectable() {
    let sensor = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[]))
        .with_calibration([(2.0, 9.0), (2.5, 7.0), (3.0, 4.0)])
        .with_model(ModelKind::LinearFit)
        .build()
        .unwrap();
    assert_eq!(sensor.model().kind(), ModelKind::LinearFit);
    // the fitted line passes through the mean of the points, not the middle one
    assert!((sensor.estimate(2.5) - 20.0 / 3.0).abs() < 1e-5);
}

#[test]
fn degenerate_linear_fit_fails_to_build() {
    let err = PhSensor::builder()
        .with_adc(ScriptedAdc::new(&[]))
        .with_calibration([(2.0, 7.0)])
        .with_model(ModelKind::LinearFit)
        .build()
        .expect_err("one point cannot be fitted");
    assert!(err.downcast_ref::<ph_core::ConfigError>().is_some());
}

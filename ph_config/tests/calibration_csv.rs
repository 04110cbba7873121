use std::fs::File;
use std::io::Write;

use ph_config::{CalibrationRow, load_calibration_csv};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
fn csv_loads_rows_in_file_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");

    let mut f = File::create(&path).unwrap();
    writeln!(f, "voltage,ph").unwrap();
    writeln!(f, "3.03, 4.01").unwrap();
    writeln!(f, "2.50, 6.86").unwrap();
    writeln!(f, "2.03, 9.18").unwrap();

    let rows = load_calibration_csv(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            CalibrationRow {
                voltage: 3.03,
                ph: 4.01
            },
            CalibrationRow {
                voltage: 2.50,
                ph: 6.86
            },
            CalibrationRow {
                voltage: 2.03,
                ph: 9.18
            },
        ]
    );
}

#[rstest]
fn csv_with_wrong_headers_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad_headers.csv");

    let mut f = File::create(&path).unwrap();
    writeln!(f, "raw,grams").unwrap();
    writeln!(f, "100,0.0").unwrap();

    let err = load_calibration_csv(&path).expect_err("should error on bad headers");
    assert!(format!("{err}").contains("headers 'voltage,ph'"));
}

#[rstest]
fn csv_with_non_numeric_errors_with_line_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad_numeric.csv");

    let mut f = File::create(&path).unwrap();
    writeln!(f, "voltage,ph").unwrap();
    writeln!(f, "2.5,7.0").unwrap();
    writeln!(f, "abc,xyz").unwrap();

    let err = load_calibration_csv(&path).expect_err("should error on non-numeric");
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[rstest]
fn csv_with_only_headers_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    let mut f = File::create(&path).unwrap();
    writeln!(f, "voltage,ph").unwrap();

    let err = load_calibration_csv(&path).expect_err("should error on no rows");
    assert!(format!("{err}").contains("contains no rows"));
}

#[rstest]
fn missing_file_errors() {
    let dir = tempdir().unwrap();
    let err = load_calibration_csv(&dir.path().join("nope.csv")).expect_err("missing file");
    assert!(format!("{err}").contains("open calibration CSV"));
}

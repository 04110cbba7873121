//! Least-squares straight-line calibration: `ph = slope * voltage + intercept`.

use crate::calibration::{CalibrationTable, saturate_f32};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// pH units per volt.
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Ordinary least squares over every point in the table, in f64.
    pub fn from_table(table: &CalibrationTable) -> Result<Self, ConfigError> {
        let pts = table.points();
        if pts.len() < 2 {
            return Err(ConfigError::DegenerateFit("at least two points are required"));
        }
        let n = pts.len() as f64;
        let mean_x = pts.iter().map(|p| f64::from(p.voltage())).sum::<f64>() / n;
        let mean_y = pts.iter().map(|p| f64::from(p.ph())).sum::<f64>() / n;
        let mut sxx = 0.0f64;
        let mut sxy = 0.0f64;
        for p in pts {
            let x = f64::from(p.voltage()) - mean_x;
            let y = f64::from(p.ph()) - mean_y;
            sxx += x * x;
            sxy += x * y;
        }
        if !sxx.is_finite() || sxx == 0.0 {
            return Err(ConfigError::DegenerateFit(
                "all calibration voltages are identical",
            ));
        }
        let slope = sxy / sxx;
        if !slope.is_finite() {
            return Err(ConfigError::DegenerateFit("non-finite slope"));
        }
        if slope == 0.0 {
            return Err(ConfigError::DegenerateFit("pH does not change with voltage"));
        }
        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    #[inline]
    pub fn estimate(&self, voltage: f32) -> f32 {
        saturate_f32(self.slope * f64::from(voltage) + self.intercept)
    }

    /// Voltage at which the fitted line crosses pH 7.
    pub fn neutral_voltage(&self) -> f32 {
        ((7.0 - self.intercept) / self.slope) as f32
    }
}

//! Voltage → pH calibration by piecewise-linear interpolation.
//!
//! A [`CalibrationTable`] is built once from (voltage, pH) pairs measured in
//! reference solutions. Points are stably sorted by voltage, so construction
//! order does not matter except between points that share a voltage, where the
//! first one given wins. [`Interpolator::estimate`] is pure and never fails.

use std::cmp::Ordering;
use std::fmt;

use crate::error::ConfigError;

/// A known (voltage, pH) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    voltage: f32,
    ph: f32,
}

impl CalibrationPoint {
    pub const fn new(voltage: f32, ph: f32) -> Self {
        Self { voltage, ph }
    }

    #[inline]
    pub fn voltage(&self) -> f32 {
        self.voltage
    }

    #[inline]
    pub fn ph(&self) -> f32 {
        self.ph
    }
}

impl From<(f32, f32)> for CalibrationPoint {
    fn from((voltage, ph): (f32, f32)) -> Self {
        Self::new(voltage, ph)
    }
}

/// Non-fatal findings about a calibration table.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// `count` points share `voltage`; the first one given is used.
    DuplicateVoltage { voltage: f32, count: usize },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateVoltage { voltage, count } => write!(
                f,
                "{count} calibration points share voltage {voltage} V; using the first one"
            ),
        }
    }
}

/// Calibration points sorted by ascending voltage. Never empty, all values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    points: Box<[CalibrationPoint]>,
}

impl CalibrationTable {
    /// Validate and sort `points`, reporting repeated voltages as advisories.
    pub fn new<I>(points: I) -> Result<(Self, Vec<Advisory>), ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<CalibrationPoint>,
    {
        let mut pts: Vec<CalibrationPoint> = points.into_iter().map(Into::into).collect();
        if pts.is_empty() {
            return Err(ConfigError::EmptyCalibration);
        }
        if let Some((index, p)) = pts
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.voltage.is_finite() && p.ph.is_finite()))
        {
            return Err(ConfigError::NonFinitePoint {
                index,
                voltage: p.voltage,
                ph: p.ph,
            });
        }

        // sort_by is stable; all values are finite so partial_cmp is total here
        pts.sort_by(|a, b| {
            a.voltage
                .partial_cmp(&b.voltage)
                .unwrap_or(Ordering::Equal)
        });

        let advisories = pts
            .chunk_by(|a, b| a.voltage == b.voltage)
            .filter(|run| run.len() > 1)
            .map(|run| Advisory::DuplicateVoltage {
                voltage: run[0].voltage,
                count: run.len(),
            })
            .collect();

        Ok((
            Self {
                points: pts.into_boxed_slice(),
            },
            advisories,
        ))
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the table has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest and highest calibration voltage.
    pub fn voltage_span(&self) -> (f32, f32) {
        let lo = self.points.first().map_or(0.0, |p| p.voltage);
        let hi = self.points.last().map_or(0.0, |p| p.voltage);
        (lo, hi)
    }
}

/// Piecewise-linear voltage → pH mapping over a [`CalibrationTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolator {
    table: CalibrationTable,
}

impl Interpolator {
    /// Build from raw points. Fails only on an empty or non-finite table.
    pub fn new<I>(points: I) -> Result<(Self, Vec<Advisory>), ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<CalibrationPoint>,
    {
        let (table, advisories) = CalibrationTable::new(points)?;
        Ok((Self { table }, advisories))
    }

    pub fn from_table(table: CalibrationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Estimate pH for a measured voltage.
    ///
    /// - one point: its pH, whatever the input
    /// - input equal to a calibration voltage: that point's pH exactly
    /// - inside the table: linear between the bracketing points
    /// - outside: linear extrapolation from the first or last segment
    /// - zero-width segment: pH of its first point
    pub fn estimate(&self, voltage: f32) -> f32 {
        let pts = self.table.points();
        let n = pts.len();
        if n < 2 {
            return pts.first().map_or(f32::NAN, |p| p.ph);
        }

        // first index whose voltage is >= input; with duplicates that is the first one given
        let k = pts.partition_point(|p| p.voltage < voltage);
        if let Some(p) = pts.get(k)
            && p.voltage == voltage
        {
            return p.ph;
        }

        // k == 0 → below range, k == n → above range
        let i = k.saturating_sub(1).min(n - 2);
        segment(pts[i], pts[i + 1], voltage)
    }
}

#[inline]
fn segment(a: CalibrationPoint, b: CalibrationPoint, voltage: f32) -> f32 {
    let span = f64::from(b.voltage) - f64::from(a.voltage);
    if span == 0.0 {
        return a.ph;
    }
    let slope = (f64::from(b.ph) - f64::from(a.ph)) / span;
    saturate_f32(f64::from(a.ph) + (f64::from(voltage) - f64::from(a.voltage)) * slope)
}

/// Narrow to f32, clamping to the largest finite magnitude instead of overflowing to infinity.
#[inline]
pub(crate) fn saturate_f32(x: f64) -> f32 {
    x.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
}

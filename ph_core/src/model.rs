//! The configured voltage → pH curve, either interpolated or fitted.

use ph_config::ModelKind;

use crate::calibration::{Advisory, CalibrationPoint, CalibrationTable, Interpolator};
use crate::error::ConfigError;
use crate::fit::LinearFit;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationModel {
    Interpolate(Interpolator),
    LinearFit { fit: LinearFit, table: CalibrationTable },
}

impl CalibrationModel {
    /// Validate the points and build the requested model.
    ///
    /// Advisories come from table construction and are the same for both kinds.
    pub fn build(
        kind: ModelKind,
        points: &[CalibrationPoint],
    ) -> Result<(Self, Vec<Advisory>), ConfigError> {
        let (table, advisories) = CalibrationTable::new(points.iter().copied())?;
        let model = match kind {
            ModelKind::Interpolate => Self::Interpolate(Interpolator::from_table(table)),
            ModelKind::LinearFit => {
                let fit = LinearFit::from_table(&table)?;
                Self::LinearFit { fit, table }
            }
        };
        Ok((model, advisories))
    }

    #[inline]
    pub fn estimate(&self, voltage: f32) -> f32 {
        match self {
            Self::Interpolate(i) => i.estimate(voltage),
            Self::LinearFit { fit, .. } => fit.estimate(voltage),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Interpolate(_) => ModelKind::Interpolate,
            Self::LinearFit { .. } => ModelKind::LinearFit,
        }
    }

    pub fn table(&self) -> &CalibrationTable {
        match self {
            Self::Interpolate(i) => i.table(),
            Self::LinearFit { table, .. } => table,
        }
    }
}

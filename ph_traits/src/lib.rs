//! Hardware seams shared by the sensor core and the device backends.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Front-end attenuation of an ESP32 ADC input.
///
/// `Db11` from older configs is migrated to `Db12` before it reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attenuation {
    Db0,
    Db2_5,
    Db6,
    Db12,
}

impl Attenuation {
    /// Autorange order: widest range first.
    pub const AUTORANGE: [Attenuation; 4] = [
        Attenuation::Db12,
        Attenuation::Db6,
        Attenuation::Db2_5,
        Attenuation::Db0,
    ];

    /// Nominal full-scale input in millivolts.
    pub fn full_scale_mv(self) -> u32 {
        match self {
            Attenuation::Db0 => 950,
            Attenuation::Db2_5 => 1250,
            Attenuation::Db6 => 1750,
            Attenuation::Db12 => 2450,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Attenuation::Db0 => "0db",
            Attenuation::Db2_5 => "2.5db",
            Attenuation::Db6 => "6db",
            Attenuation::Db12 => "12db",
        }
    }
}

/// A single ADC input producing raw conversion counts.
pub trait AdcReader {
    /// Largest count the converter can return (4095 for a 12-bit ADC).
    fn max_count(&self) -> u16 {
        4095
    }

    /// Take one conversion with the given front-end attenuation.
    /// Backends without attenuation control ignore the argument.
    fn read_raw(
        &mut self,
        attenuation: Attenuation,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: AdcReader + ?Sized> AdcReader for Box<T> {
    fn max_count(&self) -> u16 {
        (**self).max_count()
    }

    fn read_raw(
        &mut self,
        attenuation: Attenuation,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_raw(attenuation)
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("adc input saturated at {0} counts")]
    Saturated(u16),
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

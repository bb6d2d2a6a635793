pub mod envelope;
pub mod epoch;
pub(crate) mod fft;
pub mod spindle_detect;
pub mod wavelet;

use crate::error::SpindleError;

pub(crate) fn check_sample_rate(sample_rate: f64) -> Result<(), SpindleError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(SpindleError::InvalidSampleRate(sample_rate))
    }
}

pub(crate) fn check_finite(signal: &[f64]) -> Result<(), SpindleError> {
    match signal.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(SpindleError::NonFiniteSample { index }),
        None => Ok(()),
    }
}

use crate::dsp::{check_finite, fft};
use crate::error::SpindleError;

/// Instantaneous amplitude of a real signal: `|x + j·H{x}|`.
///
/// The whole buffer is transformed as one block, so values within a few
/// cycles of either end carry wrap-around artefacts. An empty input gives an
/// empty envelope.
pub fn envelope(signal: &[f64]) -> Result<Vec<f64>, SpindleError> {
    check_finite(signal)?;
    analytic_envelope(signal)
}

/// [`envelope`] without the finiteness scan, for callers that already did it.
pub(crate) fn analytic_envelope(signal: &[f64]) -> Result<Vec<f64>, SpindleError> {
    let quadrature = fft::hilbert_quadrature(signal)?;
    Ok(signal
        .iter()
        .zip(quadrature.iter())
        .map(|(&re, &im)| re.hypot(im))
        .collect())
}

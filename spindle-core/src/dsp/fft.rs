use crate::error::SpindleError;
use realfft::num_complex::Complex;
use realfft::{FftError, RealFftPlanner};
use std::cell::RefCell;

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f64>> = RefCell::new(RealFftPlanner::new());
}

fn fft_error(e: FftError) -> SpindleError {
    SpindleError::Fft(e.to_string())
}

/// Forward real FFT of `samples`, zero-padded to `size` points.
///
/// Returns the `size / 2 + 1` non-negative frequency bins, unnormalised.
pub(crate) fn forward(samples: &[f64], size: usize) -> Result<Vec<Complex<f64>>, SpindleError> {
    debug_assert!(samples.len() <= size);
    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(size));
    let mut input = fft.make_input_vec();
    input[..samples.len()].copy_from_slice(samples);
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum).map_err(fft_error)?;
    Ok(spectrum)
}

/// Inverse real FFT of a half spectrum, normalised so that
/// `inverse(forward(x, n), n) == x`.
///
/// The imaginary parts of the DC bin (and of the Nyquist bin for even sizes)
/// are discarded.
pub(crate) fn inverse(mut spectrum: Vec<Complex<f64>>, size: usize) -> Result<Vec<f64>, SpindleError> {
    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_inverse(size));
    if let Some(dc) = spectrum.first_mut() {
        dc.im = 0.0;
    }
    if size % 2 == 0 {
        if let Some(nyquist) = spectrum.last_mut() {
            nyquist.im = 0.0;
        }
    }
    let mut output = fft.make_output_vec();
    fft.process(&mut spectrum, &mut output).map_err(fft_error)?;
    let norm = 1.0 / size as f64;
    for v in output.iter_mut() {
        *v *= norm;
    }
    Ok(output)
}

/// Quadrature (Hilbert-transformed) component of a finite real block.
///
/// The block is treated as one period of a periodic signal: positive
/// frequencies are rotated by -90°, DC and Nyquist carry no quadrature
/// energy. Adding `j` times this to the input gives the analytic signal.
pub(crate) fn hilbert_quadrature(samples: &[f64]) -> Result<Vec<f64>, SpindleError> {
    let n = samples.len();
    if n < 2 {
        return Ok(vec![0.0; n]);
    }

    let mut spectrum = forward(samples, n)?;
    let nyquist = if n % 2 == 0 { Some(n / 2) } else { None };
    for (k, bin) in spectrum.iter_mut().enumerate() {
        *bin = if k == 0 || Some(k) == nyquist {
            Complex::new(0.0, 0.0)
        } else {
            // -j * (re + j im) = im - j re
            Complex::new(bin.im, -bin.re)
        };
    }
    inverse(spectrum, n)
}

/// Full linear convolution of a signal (given as its spectrum at `size`
/// points) with a real kernel. Returns the first `out_len` points.
///
/// `size` must be at least `out_len`, otherwise the result wraps around.
pub(crate) fn convolve_spectrum(
    signal_spectrum: &[Complex<f64>],
    kernel: &[f64],
    size: usize,
    out_len: usize,
) -> Result<Vec<f64>, SpindleError> {
    debug_assert!(out_len <= size);
    let kernel_spectrum = forward(kernel, size)?;
    let product: Vec<Complex<f64>> = signal_spectrum
        .iter()
        .zip(kernel_spectrum.iter())
        .map(|(a, b)| a * b)
        .collect();
    let mut full = inverse(product, size)?;
    full.truncate(out_len);
    Ok(full)
}

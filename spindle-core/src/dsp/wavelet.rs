//! Band-limited continuous wavelet transform with a real Morlet wavelet.
//!
//! The transform evaluates a fixed ladder of scales `1..=127` regardless of
//! the requested band. Each scale maps to a frequency through the wavelet's
//! centre frequency (`f = fc * sample_rate / scale`), so how many scales land
//! inside the band depends on the sampling rate. At 512 Hz the alpha band
//! keeps scales 32..=52; very low or very high rates can keep none.
//!
//! Coefficients follow the integrated-wavelet scheme: the mother wavelet is
//! sampled once on its support, integrated by cumulative sum, resampled per
//! scale, convolved with the signal, and differenced. This keeps the kernel
//! exact at small scales where direct sampling would alias.

use crate::dsp::{check_finite, check_sample_rate, fft};
use crate::error::SpindleError;
use crate::types::{FrequencyBand, Scaleogram};
use realfft::num_complex::Complex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Largest scale evaluated; scales run `1..=MAX_SCALE` at unit step.
pub const MAX_SCALE: usize = 127;

/// log2 of the number of points the mother wavelet is sampled on.
const PRECISION: u32 = 10;
const SUPPORT_LOW: f64 = -8.0;
const SUPPORT_HIGH: f64 = 8.0;
/// Angular frequency of the Morlet carrier.
const OMEGA0: f64 = 5.0;

/// A real Morlet wavelet, `exp(-t²/2)·cos(5t)`, sampled on `[-8, 8]`.
pub struct Morlet {
    step: f64,
    span: f64,
    int_psi: Vec<f64>,
    center_frequency: f64,
}

impl Morlet {
    pub fn sampled() -> Result<Self, SpindleError> {
        let n = 1usize << PRECISION;
        let span = SUPPORT_HIGH - SUPPORT_LOW;
        let step = span / (n - 1) as f64;

        let psi: Vec<f64> = (0..n)
            .map(|i| {
                let t = SUPPORT_LOW + i as f64 * step;
                (-t * t / 2.0).exp() * (OMEGA0 * t).cos()
            })
            .collect();

        let mut acc = 0.0;
        let int_psi = psi
            .iter()
            .map(|&p| {
                acc += p;
                acc * step
            })
            .collect();

        let center_frequency = spectral_peak(&psi, span)?;

        Ok(Self {
            step,
            span,
            int_psi,
            center_frequency,
        })
    }

    /// Centre frequency in cycles per unit of wavelet time.
    pub fn center_frequency(&self) -> f64 {
        self.center_frequency
    }

    pub fn scale_to_frequency(&self, scale: f64, sample_rate: f64) -> f64 {
        self.center_frequency * sample_rate / scale
    }

    /// Integrated wavelet resampled at `scale`, time-reversed for convolution.
    fn kernel(&self, scale: f64) -> Vec<f64> {
        let count = (scale * self.span + 1.0).ceil() as usize;
        let mut kernel: Vec<f64> = (0..count)
            .map(|i| (i as f64 / (scale * self.step)) as usize)
            .filter(|&j| j < self.int_psi.len())
            .map(|j| self.int_psi[j])
            .collect();
        kernel.reverse();
        kernel
    }

    /// One coefficient row at `scale`, aligned with the input samples.
    ///
    /// `spectra` caches the signal's spectrum per FFT size within one
    /// transform call.
    fn transform_row(
        &self,
        signal: &[f64],
        scale: f64,
        spectra: &mut HashMap<usize, Vec<Complex<f64>>>,
    ) -> Result<Vec<f64>, SpindleError> {
        let n = signal.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let kernel = self.kernel(scale);
        let full_len = n + kernel.len() - 1;
        let size = full_len.next_power_of_two();

        let spectrum = match spectra.entry(size) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(fft::forward(signal, size)?),
        };
        let conv = fft::convolve_spectrum(spectrum, &kernel, size, full_len)?;

        // The differenced convolution is `kernel.len() - 2` points longer
        // than the signal; trim the excess evenly, extra point at the end.
        let excess = full_len - 1 - n;
        let lead = excess / 2;
        let gain = -scale.sqrt();
        Ok((lead..lead + n)
            .map(|i| gain * (conv[i + 1] - conv[i]))
            .collect())
    }
}

/// Frequency of the largest non-DC bin of `psi`'s spectrum, in cycles per
/// unit of `span`.
fn spectral_peak(psi: &[f64], span: f64) -> Result<f64, SpindleError> {
    let spectrum = fft::forward(psi, psi.len())?;
    let mut peak_bin = 1usize;
    let mut peak_mag = f64::NEG_INFINITY;
    for (k, bin) in spectrum.iter().enumerate().skip(1) {
        let mag = bin.norm();
        if mag > peak_mag {
            peak_mag = mag;
            peak_bin = k;
        }
    }
    Ok(peak_bin as f64 / span)
}

/// Continuous wavelet transform of `signal`, keeping only scales whose
/// frequency lies inside `band` (inclusive).
///
/// Rows are ordered by increasing scale, i.e. decreasing frequency. The mask
/// is computed from each scale's own frequency, so row order never matters
/// for which rows are kept.
pub fn compute_wavelet(
    signal: &[f64],
    sample_rate: f64,
    band: &FrequencyBand,
) -> Result<Scaleogram, SpindleError> {
    check_sample_rate(sample_rate)?;
    band.validate()?;
    check_finite(signal)?;

    let morlet = Morlet::sampled()?;
    let (scales, frequencies): (Vec<f64>, Vec<f64>) = (1..=MAX_SCALE)
        .map(|s| {
            let scale = s as f64;
            (scale, morlet.scale_to_frequency(scale, sample_rate))
        })
        .filter(|&(_, f)| band.contains(f))
        .unzip();

    if scales.is_empty() {
        log::warn!(
            "no wavelet scale maps into {}..={} Hz at {} Hz sampling",
            band.low_hz,
            band.high_hz,
            sample_rate
        );
    } else {
        log::debug!(
            "wavelet keeps {} scales ({}..={}) for {} samples",
            scales.len(),
            scales[0],
            scales[scales.len() - 1],
            signal.len()
        );
    }

    let mut spectra = HashMap::new();
    let coefficients = scales
        .iter()
        .map(|&scale| morlet.transform_row(signal, scale, &mut spectra))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scaleogram {
        coefficients,
        frequencies,
        scales,
        n_samples: signal.len(),
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, secs: f64) -> Vec<f64> {
        let n = (sample_rate * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_center_frequency() {
        let m = Morlet::sampled().unwrap();
        assert!((m.center_frequency() - 0.8125).abs() < 1e-12);
        assert!((m.scale_to_frequency(32.0, 512.0) - 13.0).abs() < 1e-9);
        assert!((m.scale_to_frequency(52.0, 512.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_kernel_length() {
        let m = Morlet::sampled().unwrap();
        assert_eq!(m.kernel(1.0).len(), 17);
        assert_eq!(m.kernel(40.0).len(), 641);
    }

    #[test]
    fn test_alpha_band_rows_at_512() {
        let x = sine(10.0, 512.0, 2.0);
        let s = compute_wavelet(&x, 512.0, &FrequencyBand::ALPHA).unwrap();
        assert_eq!(s.rows(), 21);
        assert_eq!(s.scales.first(), Some(&32.0));
        assert_eq!(s.scales.last(), Some(&52.0));
        assert_eq!(s.frequencies.len(), s.rows());
        for row in &s.coefficients {
            assert_eq!(row.len(), x.len());
        }
        for f in &s.frequencies {
            assert!((8.0..=13.0).contains(f), "{f} outside band");
        }
        for w in s.frequencies.windows(2) {
            assert!(w[0] > w[1], "frequencies not decreasing: {w:?}");
        }
    }

    #[test]
    fn test_peak_row_tracks_sinusoid() {
        let sample_rate = 512.0;
        let x = sine(10.0, sample_rate, 8.0);
        let s = compute_wavelet(&x, sample_rate, &FrequencyBand::ALPHA).unwrap();

        // Compare interior columns only, away from the zero-padded edges.
        let n = x.len();
        let means: Vec<f64> = s
            .coefficients
            .iter()
            .map(|row| {
                let mid = &row[n / 4..3 * n / 4];
                mid.iter().map(|c| c.abs()).sum::<f64>() / mid.len() as f64
            })
            .collect();
        let (best, _) = means
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        let peak = s.frequencies[best];
        assert!((peak - 10.0).abs() <= 0.25, "peak at {peak} Hz");
    }

    #[test]
    fn test_out_of_band_tone_is_weak() {
        let sample_rate = 512.0;
        let in_band = compute_wavelet(&sine(10.0, sample_rate, 4.0), sample_rate, &FrequencyBand::ALPHA)
            .unwrap();
        let off_band = compute_wavelet(&sine(30.0, sample_rate, 4.0), sample_rate, &FrequencyBand::ALPHA)
            .unwrap();
        assert!(off_band.max_magnitude() < 0.2 * in_band.max_magnitude());
    }

    #[test]
    fn test_atypical_rates_can_keep_no_rows() {
        let x = vec![0.5; 64];
        let high = compute_wavelet(&x, 100_000.0, &FrequencyBand::ALPHA).unwrap();
        assert_eq!(high.rows(), 0);
        assert!(high.frequencies.is_empty());

        let low = compute_wavelet(&x, 8.0, &FrequencyBand::ALPHA).unwrap();
        assert_eq!(low.rows(), 0);

        // 16 Hz sampling: only scale 1 (13 Hz) is in band.
        let one = compute_wavelet(&x, 16.0, &FrequencyBand::ALPHA).unwrap();
        assert_eq!(one.scales, vec![1.0]);
    }

    #[test]
    fn test_empty_signal_keeps_frequency_axis() {
        let s = compute_wavelet(&[], 512.0, &FrequencyBand::ALPHA).unwrap();
        assert_eq!(s.rows(), 21);
        assert!(s.is_empty());
        assert!(s.coefficients.iter().all(|row| row.is_empty()));
    }

    #[test]
    fn test_invalid_input_rejected() {
        assert!(compute_wavelet(&[1.0], -512.0, &FrequencyBand::ALPHA).is_err());
        assert!(compute_wavelet(&[f64::NAN], 512.0, &FrequencyBand::ALPHA).is_err());
        let inverted = FrequencyBand {
            low_hz: 13.0,
            high_hz: 8.0,
        };
        assert!(matches!(
            compute_wavelet(&[1.0], 512.0, &inverted),
            Err(SpindleError::InvalidBand { .. })
        ));
    }

    #[test]
    fn test_repeatable() {
        let x = sine(11.0, 512.0, 1.5);
        let a = compute_wavelet(&x, 512.0, &FrequencyBand::ALPHA).unwrap();
        let b = compute_wavelet(&x, 512.0, &FrequencyBand::ALPHA).unwrap();
        assert_eq!(a, b);
    }
}

use crate::dsp::{check_finite, check_sample_rate};
use crate::error::SpindleError;
use crate::types::Epoch;

/// Samples in one epoch: `duration_secs * sample_rate`, truncated.
pub fn samples_per_epoch(sample_rate: f64, duration_secs: f64) -> Result<usize, SpindleError> {
    check_sample_rate(sample_rate)?;
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(SpindleError::InvalidParameter {
            name: "duration_secs",
            value: duration_secs,
        });
    }
    let n = (duration_secs * sample_rate) as usize;
    if n == 0 {
        return Err(SpindleError::EmptyEpoch {
            duration_secs,
            sample_rate,
        });
    }
    Ok(n)
}

/// Split `signal` into consecutive, non-overlapping epochs of
/// `duration_secs`, starting at sample 0.
///
/// A trailing remainder shorter than one epoch is dropped, so a signal
/// shorter than one epoch yields nothing.
pub fn epochs(
    signal: &[f64],
    sample_rate: f64,
    duration_secs: f64,
) -> Result<impl ExactSizeIterator<Item = Epoch<'_>>, SpindleError> {
    let len = samples_per_epoch(sample_rate, duration_secs)?;
    check_finite(signal)?;
    Ok(signal
        .chunks_exact(len)
        .enumerate()
        .map(move |(index, samples)| Epoch {
            index,
            offset: index * len,
            samples,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_epoch_count() {
        for n in [0usize, 100, 5119, 5120, 5121, 10239, 10240, 25_000] {
            let x = ramp(n);
            let eps: Vec<_> = epochs(&x, 512.0, 10.0).unwrap().collect();
            assert_eq!(eps.len(), n / 5120, "n = {n}");
            assert!(eps.iter().all(|e| e.samples.len() == 5120));
        }
    }

    #[test]
    fn test_short_signal_has_no_epochs() {
        let x = ramp(5119);
        assert_eq!(epochs(&x, 512.0, 10.0).unwrap().len(), 0);
    }

    #[test]
    fn test_two_epochs_tile_signal() {
        let x = ramp(10240);
        let eps: Vec<_> = epochs(&x, 512.0, 10.0).unwrap().collect();
        assert_eq!(eps.len(), 2);
        assert_eq!((eps[0].index, eps[0].offset), (0, 0));
        assert_eq!((eps[1].index, eps[1].offset), (1, 5120));
        assert_eq!(eps[0].samples, &x[0..5120]);
        assert_eq!(eps[1].samples, &x[5120..10240]);
    }

    #[test]
    fn test_trailing_partial_dropped() {
        let x = ramp(5120 + 4000);
        let eps: Vec<_> = epochs(&x, 512.0, 10.0).unwrap().collect();
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].samples.last(), Some(&5119.0));
    }

    #[test]
    fn test_fractional_length_truncates() {
        // 0.5 s at 250.5 Hz = 125.25 samples -> 125
        assert_eq!(samples_per_epoch(250.5, 0.5).unwrap(), 125);
        let x = ramp(400);
        let eps: Vec<_> = epochs(&x, 250.5, 0.5).unwrap().collect();
        assert_eq!(eps.len(), 3);
        assert_eq!(eps[2].offset, 250);
    }

    #[test]
    fn test_invalid_durations() {
        assert!(matches!(
            samples_per_epoch(512.0, 0.0),
            Err(SpindleError::InvalidParameter { .. })
        ));
        assert!(samples_per_epoch(512.0, f64::NAN).is_err());
        assert_eq!(
            samples_per_epoch(512.0, 0.001),
            Err(SpindleError::EmptyEpoch {
                duration_secs: 0.001,
                sample_rate: 512.0
            })
        );
        assert!(epochs(&[1.0], -1.0, 10.0).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut x = ramp(6000);
        x[5500] = f64::NAN;
        assert_eq!(
            epochs(&x, 512.0, 10.0).err(),
            Some(SpindleError::NonFiniteSample { index: 5500 })
        );
    }
}

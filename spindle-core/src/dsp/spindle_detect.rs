use crate::dsp::envelope::analytic_envelope;
use crate::dsp::{check_finite, check_sample_rate};
use crate::error::SpindleError;
use crate::types::{SpindleEvent, SpindleParams};

/// Detect alpha spindles in one channel.
///
/// The threshold adapts to the recording: `threshold_factor` times the
/// population standard deviation of the signal's own envelope. Samples
/// strictly above it form runs; runs shorter than `min_duration_secs` are
/// discarded. A run still open at the end of the buffer is closed on the last
/// sample index.
///
/// Empty signals yield no events, and so do flat ones: a signal whose
/// envelope varies by no more than [`FLAT_TOLERANCE`] of its mean level.
/// That covers exact constants and constants carrying float-level noise
/// alike, so a 1e-9 ripple on a DC offset cannot produce a spindle.
pub fn detect_spindles(
    signal: &[f64],
    sample_rate: f64,
    params: &SpindleParams,
) -> Result<Vec<SpindleEvent>, SpindleError> {
    check_sample_rate(sample_rate)?;
    params.validate()?;
    check_finite(signal)?;

    if signal.is_empty() {
        return Ok(Vec::new());
    }

    let envelope = analytic_envelope(signal)?;
    let spread = population_std(&envelope);
    if is_flat(&envelope, spread) {
        log::debug!("flat signal of {} samples, no spindles", signal.len());
        return Ok(Vec::new());
    }
    let threshold = params.threshold_factor * spread;

    let events: Vec<SpindleEvent> = threshold_runs(&envelope, threshold)
        .into_iter()
        .filter(|&(start, end)| {
            end > start && (end - start) as f64 / sample_rate >= params.min_duration_secs
        })
        .map(|(start, end)| SpindleEvent { start, end })
        .collect();

    log::debug!(
        "{} spindles in {} samples (threshold {:.4})",
        events.len(),
        signal.len(),
        threshold
    );
    Ok(events)
}

/// Relative envelope spread at or below which a signal counts as flat.
pub const FLAT_TOLERANCE: f64 = 1e-9;

fn is_flat(envelope: &[f64], spread: f64) -> bool {
    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    spread <= FLAT_TOLERANCE * mean
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var.sqrt()
}

/// Runs of samples strictly above `threshold`, as (start, end) pairs.
///
/// `end` is the first index back below threshold, or the last index of the
/// buffer when the run never closes.
fn threshold_runs(envelope: &[f64], threshold: f64) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &env) in envelope.iter().enumerate() {
        let above = env > threshold;
        match run_start {
            None if above => run_start = Some(i),
            Some(start) if !above => {
                runs.push((start, i));
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        runs.push((start, envelope.len() - 1));
    }

    runs
}

use crate::canvas::colors::SPINDLE_SHADE;
use spindle_core::SpindleEvent;
use web_sys::CanvasRenderingContext2d;

/// Symmetric vertical range for a waveform: the largest |sample|, or 1.0 for
/// silence so flat lines sit on the centre.
pub fn amplitude_bound(samples: &[f64]) -> f64 {
    let peak = samples.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    if peak > 0.0 {
        peak
    } else {
        1.0
    }
}

/// Horizontal pixel of sample index `idx` when `len` samples span `width`.
pub fn sample_to_x(idx: usize, len: usize, width: f64) -> f64 {
    if len == 0 {
        return 0.0;
    }
    idx as f64 / len as f64 * width
}

/// Min/max of the samples that land in pixel column `px`, if any.
pub fn column_min_max(samples: &[f64], px: usize, width: usize) -> Option<(f64, f64)> {
    let i0 = px * samples.len() / width;
    let i1 = ((px + 1) * samples.len() / width).min(samples.len());
    if i0 >= i1 {
        return None;
    }
    Some(
        samples[i0..i1]
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s))),
    )
}

/// Draw one epoch's waveform with detected spindles shaded.
///
/// Spindle indices are relative to the start of `samples`. Uses a min/max
/// envelope when there are more samples than pixels.
pub fn draw_epoch(
    ctx: &CanvasRenderingContext2d,
    samples: &[f64],
    spindles: &[SpindleEvent],
    canvas_width: f64,
    canvas_height: f64,
) {
    ctx.set_fill_style_str("#0a0a0a");
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

    if samples.is_empty() || canvas_width < 1.0 {
        return;
    }

    let len = samples.len();
    for ev in spindles {
        let x0 = sample_to_x(ev.start, len, canvas_width);
        let x1 = sample_to_x(ev.end, len, canvas_width).max(x0 + 1.0);
        ctx.set_fill_style_str(SPINDLE_SHADE);
        ctx.fill_rect(x0, 0.0, x1 - x0, canvas_height);
    }

    let mid_y = canvas_height / 2.0;
    let scale = mid_y * 0.9 / amplitude_bound(samples);

    ctx.set_stroke_style_str("#333");
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(0.0, mid_y);
    ctx.line_to(canvas_width, mid_y);
    ctx.stroke();

    ctx.set_stroke_style_str("#4a9fe0");
    let width = canvas_width as usize;

    if len <= width * 2 {
        ctx.begin_path();
        for (i, &s) in samples.iter().enumerate() {
            let x = sample_to_x(i, len, canvas_width);
            let y = mid_y - s * scale;
            if i == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.stroke();
    } else {
        ctx.begin_path();
        for px in 0..width {
            if let Some((lo, hi)) = column_min_max(samples, px, width) {
                ctx.move_to(px as f64 + 0.5, mid_y - hi * scale);
                ctx.line_to(px as f64 + 0.5, mid_y - lo * scale);
            }
        }
        ctx.stroke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplitude_bound() {
        assert_eq!(amplitude_bound(&[0.5, -2.0, 1.0]), 2.0);
        assert_eq!(amplitude_bound(&[0.0, 0.0]), 1.0);
        assert_eq!(amplitude_bound(&[]), 1.0);
    }

    #[test]
    fn test_sample_to_x() {
        assert_eq!(sample_to_x(0, 5120, 800.0), 0.0);
        assert_eq!(sample_to_x(2560, 5120, 800.0), 400.0);
        assert_eq!(sample_to_x(5120, 5120, 800.0), 800.0);
        assert_eq!(sample_to_x(3, 0, 800.0), 0.0);
    }

    #[test]
    fn test_column_min_max() {
        let x: Vec<f64> = vec![1.0, -3.0, 2.0, 0.5, 4.0, -1.0];
        assert_eq!(column_min_max(&x, 0, 3), Some((-3.0, 1.0)));
        assert_eq!(column_min_max(&x, 1, 3), Some((0.5, 2.0)));
        assert_eq!(column_min_max(&x, 2, 3), Some((-1.0, 4.0)));
        // More pixels than samples leaves some columns empty.
        assert_eq!(column_min_max(&x[..2], 0, 4), None);
    }
}

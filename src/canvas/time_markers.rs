use web_sys::CanvasRenderingContext2d;

/// Nice 1-2-5 progression of tick intervals in seconds, from 10 ms to 10 min.
const TICK_INTERVALS: &[f64] = &[
    0.01, 0.02, 0.05,
    0.1, 0.2, 0.5,
    1.0, 2.0, 5.0,
    10.0, 30.0, 60.0,
    120.0, 300.0, 600.0,
];

/// Minimum spacing between labelled ticks, in pixels.
const MIN_LABEL_SPACING: f64 = 70.0;

/// Smallest nice interval keeping labels at least `MIN_LABEL_SPACING` apart.
pub fn tick_interval(duration: f64, canvas_width: f64) -> f64 {
    let last = TICK_INTERVALS[TICK_INTERVALS.len() - 1];
    if duration <= 0.0 || canvas_width <= 0.0 {
        return last;
    }
    let min_interval = MIN_LABEL_SPACING * duration / canvas_width;
    TICK_INTERVALS
        .iter()
        .copied()
        .find(|&i| i >= min_interval)
        .unwrap_or(last)
}

/// Tick positions `0, interval, 2·interval, ...` up to `duration` inclusive.
pub fn tick_times(duration: f64, interval: f64) -> Vec<f64> {
    if duration < 0.0 || interval <= 0.0 {
        return Vec::new();
    }
    let count = (duration / interval + 1e-9).floor() as usize;
    (0..=count).map(|k| k as f64 * interval).collect()
}

/// Compact label whose precision matches the tick interval.
pub fn format_time_label(seconds: f64, interval: f64) -> String {
    if interval < 0.1 {
        format!("{:.2}s", seconds)
    } else if interval < 1.0 {
        format!("{:.1}s", seconds)
    } else if interval < 60.0 || seconds < 60.0 {
        format!("{:.0}s", seconds)
    } else {
        let mins = (seconds / 60.0).floor() as u32;
        let secs = (seconds % 60.0).round() as u32;
        if secs == 0 {
            format!("{}m", mins)
        } else {
            format!("{}m{:02}s", mins, secs)
        }
    }
}

/// Draw a 0..duration time axis under a plot occupying `left..left+width`.
pub fn draw_time_axis(ctx: &CanvasRenderingContext2d, duration: f64, left: f64, width: f64, baseline: f64) {
    if duration <= 0.0 || width <= 0.0 {
        return;
    }
    let interval = tick_interval(duration, width);
    let px_per_sec = width / duration;

    ctx.set_stroke_style_str("rgba(255,255,255,0.35)");
    ctx.set_fill_style_str("rgba(255,255,255,0.7)");
    ctx.set_line_width(1.0);
    ctx.set_font("10px sans-serif");
    ctx.set_text_baseline("top");

    for t in tick_times(duration, interval) {
        let x = left + t * px_per_sec;
        ctx.begin_path();
        ctx.move_to(x, baseline);
        ctx.line_to(x, baseline + 5.0);
        ctx.stroke();

        let label = format_time_label(t, interval);
        if let Ok(metrics) = ctx.measure_text(&label) {
            let lx = (x - metrics.width() / 2.0).max(left);
            if lx + metrics.width() <= left + width + 2.0 {
                let _ = ctx.fill_text(&label, lx, baseline + 6.0);
            }
        }
    }

    ctx.set_text_baseline("alphabetic");
}

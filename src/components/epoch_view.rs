use crate::canvas::colors::ColorMap;
use crate::canvas::{context_2d, time_markers, waveform_renderer};
use crate::components::scaleogram::ScaleogramView;
use leptos::prelude::*;
use spindle_core::EpochAnalysis;

const WAVE_WIDTH: u32 = 900;
const WAVE_HEIGHT: u32 = 160;
const AXIS_HEIGHT: f64 = 18.0;

/// Heading shown above each epoch.
pub fn epoch_title(epoch: &EpochAnalysis) -> String {
    format!("Epoch {} - Spindles: {}", epoch.index + 1, epoch.spindles.len())
}

/// Waveform with shaded spindles, then its plasma scaleogram.
#[component]
pub fn EpochView(epoch: EpochAnalysis, sample_rate: f64) -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let title = epoch_title(&epoch);
    let spans: Vec<String> = epoch
        .spindles
        .iter()
        .map(|ev| format!("{:.2}-{:.2} s", ev.start_secs(sample_rate), ev.end_secs(sample_rate)))
        .collect();
    let duration = epoch.samples.len() as f64 / sample_rate;
    let EpochAnalysis {
        samples,
        spindles,
        scaleogram,
        ..
    } = epoch;

    Effect::new(move || {
        let Some(canvas) = canvas_ref.get() else { return };
        let Some(ctx) = context_2d(&canvas) else { return };
        let w = canvas.width() as f64;
        let h = canvas.height() as f64;
        let plot_h = h - AXIS_HEIGHT;
        waveform_renderer::draw_epoch(&ctx, &samples, &spindles, w, plot_h);
        ctx.set_fill_style_str("#111");
        ctx.fill_rect(0.0, plot_h, w, AXIS_HEIGHT);
        time_markers::draw_time_axis(&ctx, duration, 0.0, w, plot_h);
    });

    view! {
        <div class="epoch">
            <div class="plot-title">{title}</div>
            <canvas node_ref=canvas_ref width=WAVE_WIDTH height=WAVE_HEIGHT />
            {(!spans.is_empty()).then(|| view! {
                <div class="spindle-spans">{spans.join(", ")}</div>
            })}
            <ScaleogramView scaleogram=scaleogram colormap=ColorMap::Plasma title="Wavelet Scaleogram" height=160 />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::{Scaleogram, SpindleEvent};

    #[test]
    fn test_epoch_title_is_one_based() {
        let epoch = EpochAnalysis {
            index: 0,
            offset: 0,
            samples: vec![0.0; 4],
            spindles: vec![SpindleEvent { start: 0, end: 2 }, SpindleEvent { start: 2, end: 3 }],
            scaleogram: Scaleogram {
                coefficients: Vec::new(),
                frequencies: Vec::new(),
                scales: Vec::new(),
                n_samples: 4,
                sample_rate: 512.0,
            },
        };
        assert_eq!(epoch_title(&epoch), "Epoch 1 - Spindles: 2");
    }
}

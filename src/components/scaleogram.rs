use crate::canvas::colors::ColorMap;
use crate::canvas::scaleogram_renderer::{self, PreRendered};
use crate::canvas::{context_2d, time_markers};
use leptos::prelude::*;
use spindle_core::Scaleogram;

const CANVAS_WIDTH: u32 = 900;
const LEFT_MARGIN: f64 = 44.0;
const BOTTOM_MARGIN: f64 = 20.0;

/// `|W|` image with frequency labels on the left and a time axis below.
#[component]
pub fn ScaleogramView(
    scaleogram: Scaleogram,
    colormap: ColorMap,
    #[prop(into)] title: String,
    #[prop(default = 220)] height: u32,
) -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let rendered: PreRendered = scaleogram_renderer::pre_render(&scaleogram, colormap);
    let frequencies = scaleogram.frequencies.clone();
    let duration = scaleogram.duration_secs();
    let no_rows = scaleogram.rows() == 0;

    Effect::new(move || {
        let Some(canvas) = canvas_ref.get() else { return };
        let Some(ctx) = context_2d(&canvas) else { return };
        let w = canvas.width() as f64;
        let h = canvas.height() as f64;

        ctx.set_fill_style_str("#111");
        ctx.fill_rect(0.0, 0.0, w, h);

        let plot_w = w - LEFT_MARGIN;
        let plot_h = h - BOTTOM_MARGIN;
        if let Err(e) = scaleogram_renderer::blit(&ctx, &rendered, (LEFT_MARGIN, 0.0, plot_w, plot_h)) {
            log::error!("scaleogram blit failed: {e:?}");
        }
        scaleogram_renderer::draw_freq_labels(&ctx, &frequencies, 0.0, plot_h, LEFT_MARGIN);
        time_markers::draw_time_axis(&ctx, duration, LEFT_MARGIN, plot_w, plot_h);
    });

    view! {
        <div class="scaleogram">
            <div class="plot-title">{title}</div>
            {no_rows.then(|| view! {
                <div class="plot-note">"No wavelet scale falls inside the band at this sampling rate"</div>
            })}
            <canvas node_ref=canvas_ref width=CANVAS_WIDTH height=height />
            <div class="axis-note">"Frequency (Hz) / Time (s)"</div>
        </div>
    }
}

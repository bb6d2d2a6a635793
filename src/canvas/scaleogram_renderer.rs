use crate::canvas::colors::{magnitude_to_unit, ColorMap};
use spindle_core::Scaleogram;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Pre-rendered scaleogram image data (RGBA pixels).
pub struct PreRendered {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Most source columns kept per image; longer rows are max-pooled.
const MAX_COLUMNS: usize = 2048;

/// Render `|coefficients|` to an RGBA buffer.
///
/// Width = time columns (pooled), height = one pixel row per scale.
/// Row 0 is the first scale, which is the highest frequency, so the image
/// already has high frequencies on top.
pub fn pre_render(s: &Scaleogram, colormap: ColorMap) -> PreRendered {
    if s.rows() == 0 || s.n_samples == 0 {
        return PreRendered {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
    }

    let width = s.n_samples.min(MAX_COLUMNS);
    let height = s.rows();
    let max_mag = s.max_magnitude();

    let mut pixels = vec![0u8; width * height * 4];
    for (y, row) in s.coefficients.iter().enumerate() {
        for x in 0..width {
            let (i0, i1) = column_span(x, width, row.len());
            let mag = row[i0..i1].iter().fold(0.0f64, |m, c| m.max(c.abs()));
            let [r, g, b] = colormap.map(magnitude_to_unit(mag, max_mag));
            let idx = (y * width + x) * 4;
            pixels[idx] = r;
            pixels[idx + 1] = g;
            pixels[idx + 2] = b;
            pixels[idx + 3] = 255;
        }
    }

    PreRendered {
        width: width as u32,
        height: height as u32,
        pixels,
    }
}

/// Source sample range pooled into output column `x`. Never empty.
fn column_span(x: usize, width: usize, len: usize) -> (usize, usize) {
    let i0 = x * len / width;
    let i1 = ((x + 1) * len / width).max(i0 + 1).min(len);
    (i0, i1)
}

/// Draw the pre-rendered image stretched over `area` (x, y, w, h) of `ctx`.
pub fn blit(
    ctx: &CanvasRenderingContext2d,
    pre_rendered: &PreRendered,
    area: (f64, f64, f64, f64),
) -> Result<(), JsValue> {
    let (x, y, w, h) = area;
    ctx.set_fill_style_str("#000");
    ctx.fill_rect(x, y, w, h);

    if pre_rendered.width == 0 || pre_rendered.height == 0 {
        return Ok(());
    }

    let image_data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(&pre_rendered.pixels[..]),
        pre_rendered.width,
        pre_rendered.height,
    )?;

    // ImageData can't be scaled directly; stage it on an offscreen canvas.
    let doc = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let tmp: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into().map_err(JsValue::from)?;
    tmp.set_width(pre_rendered.width);
    tmp.set_height(pre_rendered.height);
    let tmp_ctx = crate::canvas::context_2d(&tmp).ok_or_else(|| JsValue::from_str("no 2d context"))?;
    tmp_ctx.put_image_data(&image_data, 0.0, 0.0)?;

    ctx.set_image_smoothing_enabled(false);
    ctx.draw_image_with_html_canvas_element_and_dw_and_dh(&tmp, x, y, w, h)
}

/// Pixel centre of row `row` when `rows` rows fill `height`.
pub fn row_center(row: usize, rows: usize, height: f64) -> f64 {
    (row as f64 + 0.5) * height / rows as f64
}

/// Label every few rows with its frequency, left of the image.
pub fn draw_freq_labels(ctx: &CanvasRenderingContext2d, frequencies: &[f64], top: f64, height: f64, right: f64) {
    if frequencies.is_empty() {
        return;
    }
    let rows = frequencies.len();
    // Keep labels at least 14 px apart.
    let stride = ((14.0 * rows as f64 / height).ceil() as usize).max(1);

    ctx.set_fill_style_str("rgba(220,220,220,0.85)");
    ctx.set_font("10px sans-serif");
    ctx.set_text_align("right");
    ctx.set_text_baseline("middle");
    for (row, freq) in frequencies.iter().enumerate().step_by(stride) {
        let y = top + row_center(row, rows, height);
        let _ = ctx.fill_text(&format!("{freq:.1}"), right - 4.0, y);
    }
    ctx.set_text_align("start");
    ctx.set_text_baseline("alphabetic");
}

// Live canvases for the recorder: waveform, low-band spectrum and the noise
// scatter of the last thirty seconds.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use super::analysis::{NoisePoint, Severity};

pub const WAVEFORM_CANVAS: &str = "hq-waveform";
pub const SPECTRUM_CANVAS: &str = "hq-spectrum";
pub const NOISE_CANVAS: &str = "hq-noise";
pub const NOISE_WINDOW_MS: f64 = 30_000.0;
const WAVE_COLOR: &str = "#8b5cf6";

fn canvas_2d(doc: &Document, id: &str) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
    let canvas: HtmlCanvasElement = doc.get_element_by_id(id)?.dyn_into().ok()?;
    let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
    Some((canvas, ctx))
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}

pub fn draw_all<'a>(
    doc: &Document,
    time: &[u8],
    freq: &[u8],
    points: impl IntoIterator<Item = &'a NoisePoint>,
    now: f64,
) {
    if let Some((c, ctx)) = canvas_2d(doc, WAVEFORM_CANVAS) {
        draw_waveform(&ctx, c.width() as f64, c.height() as f64, time);
    }
    if let Some((c, ctx)) = canvas_2d(doc, SPECTRUM_CANVAS) {
        draw_spectrum(&ctx, c.width() as f64, c.height() as f64, freq);
    }
    if let Some((c, ctx)) = canvas_2d(doc, NOISE_CANVAS) {
        draw_noise(&ctx, c.width() as f64, c.height() as f64, points, now);
    }
}

fn draw_waveform(ctx: &CanvasRenderingContext2d, w: f64, h: f64, time: &[u8]) {
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.8)");
    ctx.fill_rect(0.0, 0.0, w, h);

    // centre reference
    ctx.set_stroke_style_str("rgba(255, 255, 255, 0.2)");
    ctx.set_line_width(1.0);
    line(ctx, 0.0, h / 2.0, w, h / 2.0);

    if time.is_empty() {
        return;
    }
    ctx.set_stroke_style_str(WAVE_COLOR);
    ctx.set_shadow_color(WAVE_COLOR);
    ctx.set_shadow_blur(2.0);
    ctx.set_line_width(if w < 400.0 { 2.0 } else { 3.0 });
    ctx.begin_path();
    let slice = w / time.len() as f64;
    for (i, &s) in time.iter().enumerate() {
        let (x, y) = (i as f64 * slice, wave_y(s, h));
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.stroke();
    ctx.set_shadow_blur(0.0);
}

fn draw_spectrum(ctx: &CanvasRenderingContext2d, w: f64, h: f64, freq: &[u8]) {
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.1)");
    ctx.fill_rect(0.0, 0.0, w, h);
    if freq.is_empty() {
        return;
    }
    let bar_w = w / freq.len() as f64 * 2.5;
    let mut x = 0.0;
    for &v in &freq[..freq.len() / 4] {
        let intensity = v as f64 / 255.0;
        let bar_h = intensity * h;
        ctx.set_fill_style_str(bar_color(intensity));
        ctx.fill_rect(x, h - bar_h, bar_w, bar_h);
        x += bar_w + 1.0;
    }
}

fn draw_noise<'a>(
    ctx: &CanvasRenderingContext2d,
    w: f64,
    h: f64,
    points: impl IntoIterator<Item = &'a NoisePoint>,
    now: f64,
) {
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.1)");
    ctx.fill_rect(0.0, 0.0, w, h);
    for p in points {
        let Some((x, y)) = scatter_position(p, now, w, h) else {
            continue;
        };
        ctx.begin_path();
        if ctx.arc(x, y, 3.0, 0.0, std::f64::consts::TAU).is_ok() {
            ctx.set_fill_style_str(p.severity.color());
            ctx.fill();
        }
    }
}

/// Time-domain byte to canvas y; 128 sits on the centre line.
pub fn wave_y(sample: u8, h: f64) -> f64 {
    let v = (sample as f64 - 128.0) / 128.0;
    v * h / 2.0 + h / 2.0
}

/// Same thresholds as noise severity: red above 0.7, amber above 0.4.
pub fn bar_color(intensity: f64) -> &'static str {
    Severity::of(intensity).color()
}

/// Newest points sit at the right edge; older than the window are hidden.
pub fn scatter_position(p: &NoisePoint, now: f64, w: f64, h: f64) -> Option<(f64, f64)> {
    let age = now - p.timestamp;
    if !(0.0..NOISE_WINDOW_MS).contains(&age) {
        return None;
    }
    let x = w - age / NOISE_WINDOW_MS * w;
    let y = h - p.amplitude * h;
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::analysis::NoiseKind;

    fn point(ts: f64, amp: f64) -> NoisePoint {
        NoisePoint {
            timestamp: ts,
            amplitude: amp,
            kind: NoiseKind::Background,
            severity: Severity::of(amp),
        }
    }

    #[test]
    fn scatter_places_newest_at_right_edge() {
        let (x, y) = scatter_position(&point(10_000.0, 0.5), 10_000.0, 600.0, 100.0).unwrap();
        assert_eq!(x, 600.0);
        assert_eq!(y, 50.0);
        let (x, _) = scatter_position(&point(0.0, 0.5), 15_000.0, 600.0, 100.0).unwrap();
        assert_eq!(x, 300.0);
    }

    #[test]
    fn scatter_hides_stale_points() {
        assert!(scatter_position(&point(0.0, 0.5), 30_000.0, 600.0, 100.0).is_none());
    }

    #[test]
    fn wave_centre_and_extremes() {
        assert_eq!(wave_y(128, 200.0), 100.0);
        assert_eq!(wave_y(0, 200.0), 0.0);
    }

    #[test]
    fn bars_colour_by_intensity() {
        assert_eq!(bar_color(0.9), "#ef4444");
        assert_eq!(bar_color(0.5), "#f59e0b");
        assert_eq!(bar_color(0.1), "#10b981");
    }
}

//! Deterministic batch coloring.
//!
//! Batch ids map onto a rotating hue wheel so the same id always renders in
//! the same color, on screen and in the exported SVG. This is UI color
//! bucketing, not a guarantee of uniqueness: ids seven apart share a hue.

use egui::Color32;

use crate::grid::Pass;

/// Hue of batch 1 (green).
const HUE_BASE: u32 = 120;
/// Hue advance per batch id.
const HUE_STEP: u32 = 50;

/// An HSL color for one `(batch, pass)` pair.
///
/// Forward passes are darker, backward passes lighter, so the two halves of
/// a batch's lifetime stay visually paired but distinguishable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl BatchColor {
    /// CSS color string for SVG output, e.g. `hsl(120, 70%, 40%)`.
    pub fn css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }

    /// The same color as an egui color for on-screen painting.
    pub fn color32(&self) -> Color32 {
        let (r, g, b) = hsl_to_rgb(
            self.hue as f32,
            self.saturation as f32 / 100.0,
            self.lightness as f32 / 100.0,
        );
        Color32::from_rgb(r, g, b)
    }
}

/// Map a `(batch, pass)` pair to its display color. Pure and deterministic.
pub fn batch_color(batch: u32, pass: Pass) -> BatchColor {
    let hue = (HUE_BASE as u64 + u64::from(batch.saturating_sub(1)) * HUE_STEP as u64) % 360;
    BatchColor {
        hue: hue as u16,
        saturation: 70,
        lightness: match pass {
            Pass::Forward => 40,
            Pass::Backward => 60,
        },
    }
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let hue_prime = hue / 60.0;
    let x = chroma * (1.0 - (hue_prime % 2.0 - 1.0).abs());
    let (r, g, b) = match hue_prime as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Cheap, perceptual-ish luma in sRGB space.
pub fn luma(color: Color32) -> f32 {
    let r = color.r() as f32 / 255.0;
    let g = color.g() as f32 / 255.0;
    let b = color.b() as f32 / 255.0;
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Black or white, whichever reads better on the given fill.
pub fn text_color_on(background: Color32) -> Color32 {
    if luma(background) > 0.55 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

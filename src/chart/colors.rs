//! Color definitions and helpers for charts

use palette::{Mix, Srgb};

/// Common colors
pub(super) const COLOR_BACKGROUND: &str = "#000000"; // Black
pub(super) const COLOR_TEXT: &str = "#FFFFFF"; // White
pub(super) const COLOR_GRID: &str = "#555555"; // Grid lines
pub(super) const COLOR_CROSSHAIR: &str = "#FFFFFF";

/// Opacity of the filled area under profile lines
pub(super) const FILL_OPACITY: f64 = 0.45;

/// Parse any CSS color (names, hex, `rgb()`, `rgba()`, `hsl()`, ...) into RGB.
/// Alpha is dropped.
pub fn parse_color(color: &str) -> Option<[u8; 3]> {
    let [r, g, b, _] = csscolorparser::parse(color).ok()?.to_rgba8();
    Some([r, g, b])
}

fn to_srgb(color: &str) -> Option<Srgb<f32>> {
    let parsed = csscolorparser::parse(color).ok()?;
    Some(Srgb::new(parsed.r as f32, parsed.g as f32, parsed.b as f32))
}

fn to_hex(color: Srgb<f32>) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02X}{:02X}{:02X}",
        channel(color.red),
        channel(color.green),
        channel(color.blue)
    )
}

/// Blend two colors in sRGB; `None` if either cannot be parsed
pub(super) fn mix(a: &str, b: &str, t: f64) -> Option<String> {
    let (a, b) = (to_srgb(a)?, to_srgb(b)?);
    Some(to_hex(a.mix(b, t.clamp(0.0, 1.0) as f32)))
}

//! Chart rendering for roll fields and their banded profiles

mod colors;
mod roll;

pub use colors::parse_color;
pub use roll::render_roll_chart;

use crate::roll::RollField;
use crate::scale::{AxisRange, BandTraces, ColorRamp, FieldSeries, RampScale};

/// Everything drawn in one roll chart
pub struct RollChartData<'a> {
    pub title: String,
    pub subtitle: String,
    pub field: &'a RollField,
    /// Field annotated by [`ColorRamp::apply_range_to_series`]
    pub series: &'a FieldSeries,
    pub ramp: &'a ColorRamp,
    /// Profile across the roll at the selected MD index
    pub cd_profile: &'a BandTraces,
    pub cd_range: AxisRange,
    /// Profile along the roll at the selected CD index (transposed)
    pub md_profile: &'a BandTraces,
    pub md_range: AxisRange,
    /// Selected (CD, MD) indexes
    pub crosshair: (usize, usize),
}

/// Chart dimensions (2x for Retina quality)
pub(super) const CHART_WIDTH: u32 = 2000;
pub(super) const CHART_HEIGHT: u32 = 1600;

/// Format a value for axis names and labels (e.g., 15 -> "15", 15.26 -> "15.3")
pub(super) fn format_value(value: f64) -> String {
    if value == value.floor() {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Color for a value on a blended scale
///
/// Interpolates between the two stops around the value's normalized
/// position. Colors that cannot be parsed are used as-is.
pub(super) fn sample_scale(scale: &RampScale, value: f64) -> Option<String> {
    let span = scale.range_max - scale.range_min;
    let t = ((value - scale.range_min) / span).clamp(0.0, 1.0);

    let upper = scale
        .stops
        .iter()
        .position(|s| s.position >= t)
        .unwrap_or(scale.stops.len().checked_sub(1)?);
    let hi = scale.stops.get(upper)?;
    let lo = scale.stops.get(upper.saturating_sub(1))?;

    let width = hi.position - lo.position;
    if width <= 0.0 {
        return Some(hi.color.clone());
    }
    let frac = (t - lo.position) / width;
    Some(colors::mix(&lo.color, &hi.color, frac).unwrap_or_else(|| lo.color.clone()))
}

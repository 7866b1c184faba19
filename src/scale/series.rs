//! Scalar field descriptor handed to the rendering host

use super::ramp::ColorStop;

/// Kind of scalar field series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesKind {
    #[default]
    Surface,
    Heatmap,
    Contour,
}

/// A rows × columns scalar field plus its color-range annotations
///
/// Surfaces carry their color domain in `cmin`/`cmax`, every other kind in
/// `zmin`/`zmax`. `color_scale` is refilled in place by
/// [`ColorRamp::apply_range_to_series`](super::ColorRamp::apply_range_to_series)
/// so a host holding on to the vector can diff it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSeries {
    pub kind: SeriesKind,
    pub z: Vec<Vec<f64>>,
    pub cmin: Option<f64>,
    pub cmax: Option<f64>,
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
    pub auto_color_scale: bool,
    pub auto_contour: bool,
    pub color_scale: Vec<ColorStop>,
    pub show_scale: bool,
}

impl FieldSeries {
    pub fn new(kind: SeriesKind, z: Vec<Vec<f64>>) -> Self {
        Self {
            kind,
            z,
            cmin: None,
            cmax: None,
            zmin: None,
            zmax: None,
            auto_color_scale: true,
            auto_contour: true,
            color_scale: Vec::new(),
            show_scale: true,
        }
    }

    /// Color domain currently set for this kind of series
    pub fn color_range(&self) -> Option<(f64, f64)> {
        match self.kind {
            SeriesKind::Surface => self.cmin.zip(self.cmax),
            SeriesKind::Heatmap | SeriesKind::Contour => self.zmin.zip(self.zmax),
        }
    }
}

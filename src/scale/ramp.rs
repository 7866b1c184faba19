//! Banded color ramp: ordered colors, sorted boundaries and the derived scale

use std::fmt;

use log::debug;

use super::error::{Fault, ScaleError, ScaleResult};
use super::series::{FieldSeries, SeriesKind};

/// Fraction of the boundary span shown beyond the outer boundaries
pub(crate) const RANGE_PADDING: f64 = 0.1;

/// One stop of the normalized color scale
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    /// Position in the `[0, 1]` domain of the padded range
    pub position: f64,
    pub color: String,
}

impl ColorStop {
    pub fn new(position: f64, color: impl Into<String>) -> Self {
        Self {
            position,
            color: color.into(),
        }
    }
}

/// Scale derived from the ramp settings, rebuilt on every change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RampScale {
    pub stops: Vec<ColorStop>,
    pub range_min: f64,
    pub range_max: f64,
    /// Boundaries with the padded min and max added at the ends
    pub display_bounds: Vec<f64>,
}

/// Color and value interval of one band
#[derive(Debug, Clone, PartialEq)]
pub struct BandInfo {
    pub color: String,
    pub from: f64,
    pub to: f64,
}

/// Threshold line drawn at a boundary in its outer color
#[derive(Debug, Clone, PartialEq)]
pub struct LimitLine {
    pub color: String,
    pub limit: f64,
}

type DiagnosticHook = Box<dyn Fn(&Fault)>;

/// Ordered colors separated by boundary values.
///
/// `n` colors need `n - 1` boundaries. Band `i` covers
/// `[boundaries[i - 1], boundaries[i])`; the first band is open below and the
/// last one open above.
pub struct ColorRamp {
    default_colors: Vec<String>,
    colors: Vec<String>,
    boundaries: Vec<f64>,
    target: f64,
    blended: bool,
    scale: RampScale,
    rebuilds: u64,
    diagnostics: Option<DiagnosticHook>,
}

impl ColorRamp {
    /// Create a ramp. Without a target the median boundary is used.
    pub fn new<S: Into<String>>(
        colors: impl IntoIterator<Item = S>,
        boundaries: &[f64],
        target: Option<f64>,
        blended: bool,
    ) -> ScaleResult<Self> {
        let colors: Vec<String> = colors.into_iter().map(Into::into).collect();
        if colors.len() < 2 {
            return Err(ScaleError::TooFewColors(colors.len()));
        }
        let boundaries = sorted_boundaries(boundaries, colors.len())?;
        let target = match target {
            Some(t) if !t.is_finite() => return Err(ScaleError::NonFiniteTarget(t)),
            Some(t) => t,
            None => median(&boundaries),
        };

        let mut ramp = Self {
            default_colors: colors.clone(),
            colors,
            boundaries,
            target,
            blended,
            scale: RampScale::default(),
            rebuilds: 0,
            diagnostics: None,
        };
        ramp.rebuild();
        Ok(ramp)
    }

    /// Three band scale: red below, lime within tolerance, yellow above
    pub fn ndc3(boundaries: Option<&[f64]>, target: Option<f64>, blended: bool) -> ScaleResult<Self> {
        Self::new(
            ["red", "lime", "yellow"],
            boundaries.unwrap_or(&[10.0, 20.0]),
            Some(target.unwrap_or(15.0)),
            blended,
        )
    }

    /// Seven band scale from dark blue to red
    pub fn ndc7(boundaries: Option<&[f64]>, target: Option<f64>, blended: bool) -> ScaleResult<Self> {
        Self::new(
            ["darkblue", "blue", "cyan", "lime", "yellow", "orange", "red"],
            boundaries.unwrap_or(&[10.0, 12.0, 14.0, 16.0, 18.0, 20.0]),
            Some(target.unwrap_or(15.0)),
            blended,
        )
    }

    /// Replace the active colors, or restore the construction-time colors
    /// with `None`. Returns whether anything changed.
    pub fn set_colors<S: AsRef<str>>(&mut self, colors: Option<&[S]>) -> ScaleResult<bool> {
        let candidate: Vec<String> = match colors {
            Some(colors) => colors.iter().map(|c| c.as_ref().to_string()).collect(),
            None => self.default_colors.clone(),
        };
        if candidate.len() != self.default_colors.len() {
            return Err(ScaleError::ColorCountMismatch {
                expected: self.default_colors.len(),
                actual: candidate.len(),
            });
        }
        if candidate == self.colors {
            return Ok(false);
        }

        self.colors = candidate;
        self.rebuild();
        Ok(true)
    }

    /// Restore the construction-time colors
    pub fn reset_colors(&mut self) -> bool {
        // Defaults always have the right length
        self.set_colors::<&str>(None).unwrap_or(false)
    }

    /// Set boundary values in any order. Returns whether they changed.
    pub fn set_boundaries(&mut self, boundaries: &[f64]) -> ScaleResult<bool> {
        let sorted = sorted_boundaries(boundaries, self.colors.len())?;
        if sorted == self.boundaries {
            return Ok(false);
        }

        self.boundaries = sorted;
        self.rebuild();
        Ok(true)
    }

    pub fn set_blended(&mut self, blended: bool) -> bool {
        if self.blended == blended {
            return false;
        }
        self.blended = blended;
        self.rebuild();
        true
    }

    pub fn blended(&self) -> bool {
        self.blended
    }

    /// Set the value fills are drawn towards. Returns whether it changed.
    pub fn set_target(&mut self, target: f64) -> bool {
        if self.target == target || !target.is_finite() {
            return false;
        }
        self.target = target;
        // Only the blended scale places a stop at the target
        if self.blended {
            self.rebuild();
        }
        true
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Sorted copy of the boundaries
    pub fn boundaries(&self) -> Vec<f64> {
        self.boundaries.clone()
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn band_count(&self) -> usize {
        self.colors.len()
    }

    pub fn scale(&self) -> &RampScale {
        &self.scale
    }

    pub fn range_min(&self) -> f64 {
        self.scale.range_min
    }

    pub fn range_max(&self) -> f64 {
        self.scale.range_max
    }

    /// Number of times the derived scale has been rebuilt
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Install a callback that observes degraded lookups
    pub fn set_diagnostic_hook(&mut self, hook: impl Fn(&Fault) + 'static) {
        self.diagnostics = Some(Box::new(hook));
    }

    pub fn clear_diagnostic_hook(&mut self) {
        self.diagnostics = None;
    }

    /// Color and padded value interval of band `index`
    pub fn band_info(&self, index: usize) -> Option<BandInfo> {
        let color = self.colors.get(index)?;
        Some(BandInfo {
            color: color.clone(),
            from: self.scale.display_bounds[index],
            to: self.scale.display_bounds[index + 1],
        })
    }

    /// Number of limit lines; a true middle boundary is not a limit
    pub fn limit_line_count(&self) -> usize {
        let count = self.boundaries.len();
        if count % 2 != 0 { count - 1 } else { count }
    }

    /// Limit line `index`, colored with the color on its outer side.
    ///
    /// With 6 boundaries the colors used are 0, 1, 2, 4, 5, 6. With 5
    /// boundaries they are 0, 1, 4, 5 and the middle boundary is skipped.
    pub fn limit_line_info(&self, index: usize) -> Option<LimitLine> {
        let count = self.limit_line_count();
        if index >= count {
            return None;
        }
        let odd = self.boundaries.len() % 2 != 0;

        let mut color_index = index;
        let mut limit_index = index;
        if index >= count / 2 {
            color_index += 1;
            if odd {
                color_index += 1;
                limit_index += 1;
            }
        }

        Some(LimitLine {
            color: self.colors[color_index].clone(),
            limit: self.boundaries[limit_index],
        })
    }

    /// Stamp the ramp's range and stops onto a field series.
    ///
    /// Returns `false` when there is no series.
    pub fn apply_range_to_series(&self, series: Option<&mut FieldSeries>) -> bool {
        let Some(series) = series else {
            return false;
        };

        series.auto_color_scale = false;
        match series.kind {
            SeriesKind::Surface => {
                series.cmin = Some(self.scale.range_min);
                series.cmax = Some(self.scale.range_max);
            }
            SeriesKind::Heatmap | SeriesKind::Contour => {
                series.zmin = Some(self.scale.range_min);
                series.zmax = Some(self.scale.range_max);
            }
        }
        series.auto_contour = false;

        // Refill the existing vector so the host sees the same container
        series.color_scale.clear();
        series.color_scale.extend(self.scale.stops.iter().cloned());
        true
    }

    /// Band index for a value: the first band whose upper boundary exceeds
    /// it, else the last band. NaN falls back to band 0.
    pub fn color_index_for(&self, value: f64) -> usize {
        if value.is_nan() {
            self.report(Fault::NonComparableValue {
                value,
                fallback_band: 0,
            });
            return 0;
        }
        self.boundaries
            .iter()
            .position(|&boundary| value < boundary)
            .unwrap_or(self.boundaries.len())
    }

    fn report(&self, fault: Fault) {
        debug!("color lookup degraded: {:?}", fault);
        if let Some(hook) = &self.diagnostics {
            hook(&fault);
        }
    }

    fn rebuild(&mut self) {
        let count = self.colors.len();
        let low = self.boundaries[0];
        let high = self.boundaries[count - 2];

        let delta = padding_span(low, high) * RANGE_PADDING;
        let min = low - delta;
        let max = high + delta;
        let range = max - min;

        // Boundaries scaled 0 to 1 with the padded edges at each end
        let mut positions = Vec::with_capacity(count + 1);
        positions.push(0.0);
        positions.extend(self.boundaries.iter().map(|b| (b - min) / range));
        positions.push(1.0);

        let mut display_bounds = Vec::with_capacity(count + 1);
        display_bounds.push(min);
        display_bounds.extend_from_slice(&self.boundaries);
        display_bounds.push(max);

        let stops = if self.blended {
            let target = if (min..=max).contains(&self.target) {
                self.target
            } else {
                (min + max) / 2.0
            };
            blended_stops(&positions, &self.colors, (target - min) / range)
        } else {
            discrete_stops(&positions, &self.colors)
        };

        self.scale = RampScale {
            stops,
            range_min: min,
            range_max: max,
            display_bounds,
        };
        self.rebuilds += 1;
        debug!(
            "rebuilt {} ramp: {} stops over [{}, {}]",
            if self.blended { "blended" } else { "discrete" },
            self.scale.stops.len(),
            min,
            max
        );
    }
}

impl fmt::Debug for ColorRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorRamp")
            .field("colors", &self.colors)
            .field("boundaries", &self.boundaries)
            .field("target", &self.target)
            .field("blended", &self.blended)
            .field("scale", &self.scale)
            .field("rebuilds", &self.rebuilds)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

/// Validate and sort a boundary list for a ramp with `color_count` colors
fn sorted_boundaries(boundaries: &[f64], color_count: usize) -> ScaleResult<Vec<f64>> {
    if boundaries.len() != color_count - 1 {
        return Err(ScaleError::BoundaryCountMismatch {
            expected: color_count - 1,
            actual: boundaries.len(),
        });
    }
    if boundaries.iter().any(|b| !b.is_finite()) {
        return Err(ScaleError::NonFiniteBoundary);
    }

    let mut sorted = boundaries.to_vec();
    sorted.sort_by(f64::total_cmp);

    if sorted.len() > 1 {
        let span = sorted[sorted.len() - 1] - sorted[0];
        if span <= 0.0 {
            return Err(ScaleError::NonPositiveSpan(span));
        }
    }
    Ok(sorted)
}

/// Span the padding is taken from. A single boundary has no span of its
/// own, so its magnitude (at least 1) stands in.
fn padding_span(low: f64, high: f64) -> f64 {
    let span = high - low;
    if span > 0.0 { span } else { low.abs().max(1.0) }
}

/// Middle boundary, or the mean of the two middle ones for an even count
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Two stops per color at its band edges
fn discrete_stops(positions: &[f64], colors: &[String]) -> Vec<ColorStop> {
    colors
        .iter()
        .enumerate()
        .flat_map(|(i, color)| {
            [
                ColorStop::new(positions[i], color.clone()),
                ColorStop::new(positions[i + 1], color.clone()),
            ]
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Anchor {
    Edge,
    Boundary,
    Target,
}

/// Interpolating stops anchored at the target.
///
/// Every anchor takes the color of the band before it, so colors blend
/// from one boundary through the target to the next. Interior boundaries
/// appear twice with the same color.
fn blended_stops(positions: &[f64], colors: &[String], target: f64) -> Vec<ColorStop> {
    let last = positions.len() - 1;
    let mut anchors: Vec<(f64, Anchor)> = positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let kind = if i == 0 || i == last {
                Anchor::Edge
            } else {
                Anchor::Boundary
            };
            (p, kind)
        })
        .collect();
    anchors.push((target, Anchor::Target));
    // Stable: a target equal to a boundary stays after it
    anchors.sort_by(|a, b| a.0.total_cmp(&b.0));

    let last_color = colors.len() - 1;
    let mut stops = Vec::with_capacity(anchors.len() + colors.len());
    for (rank, (position, kind)) in anchors.into_iter().enumerate() {
        let color = &colors[rank.saturating_sub(1).min(last_color)];
        stops.push(ColorStop::new(position, color.clone()));
        if kind == Anchor::Boundary {
            stops.push(ColorStop::new(position, color.clone()));
        }
    }
    stops
}

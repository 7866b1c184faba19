//! Multi-color profile traces
//!
//! A profile line is split into one offset/data segment pair per color band.
//! The offset segment is an invisible fill-to-zero shape that sets the lower
//! edge of the fill; the data segment carries the band color and fills from
//! the offset line to the data. Overlaid, the pairs render as a single line
//! that changes color as it crosses boundaries.

use std::borrow::Cow;
use std::str::FromStr;

use log::{debug, warn};

use super::error::{ScaleError, ScaleResult};
use super::ramp::ColorRamp;

/// Name given to new traces when the input has none
pub const DEFAULT_TRACE_NAME: &str = "Trace X";

/// Fill color of offset segments (fully transparent)
pub const OFFSET_FILL_COLOR: &str = "rgba(1,1,1,0)";

/// What the colored area of a profile is filled towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    ToTarget,
    ToAverage,
    ToZero,
    /// No fill; the data segments are drawn as plain lines
    None,
}

impl FromStr for FillMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "totarget" => Ok(FillMode::ToTarget),
            "toaverage" => Ok(FillMode::ToAverage),
            "tozero" => Ok(FillMode::ToZero),
            "none" => Ok(FillMode::None),
            other => Err(format!(
                "unknown fill mode '{}' (expected totarget, toaverage, tozero or none)",
                other
            )),
        }
    }
}

/// A coordinate in a segment, or a break in the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TracePoint {
    Point { x: f64, y: f64 },
    Break,
}

impl TracePoint {
    pub fn coords(&self) -> Option<(f64, f64)> {
        match *self {
            TracePoint::Point { x, y } => Some((x, y)),
            TracePoint::Break => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, TracePoint::Break)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    Offset,
    Data,
}

/// Area fill of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    None,
    ToZeroX,
    ToZeroY,
    /// Fill towards the previously drawn segment along X
    ToNextX,
    /// Fill towards the previously drawn segment along Y
    ToNextY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    None,
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub role: SegmentRole,
    pub points: Vec<TracePoint>,
    pub fill: Fill,
    pub fill_color: String,
    pub line_color: Option<String>,
    pub mode: DrawMode,
    pub orientation: Orientation,
    pub name: Option<String>,
    pub hover: bool,
}

impl Segment {
    fn offset(name: &str) -> Self {
        Self {
            role: SegmentRole::Offset,
            points: Vec::new(),
            fill: Fill::ToZeroY,
            fill_color: OFFSET_FILL_COLOR.to_string(),
            line_color: None,
            mode: DrawMode::None,
            orientation: Orientation::Horizontal,
            name: Some(name.to_string()),
            hover: false,
        }
    }

    fn data(name: &str, color: &str) -> Self {
        Self {
            role: SegmentRole::Data,
            points: Vec::new(),
            fill: Fill::ToNextY,
            fill_color: color.to_string(),
            line_color: Some(color.to_string()),
            mode: DrawMode::None,
            orientation: Orientation::Horizontal,
            name: Some(name.to_string()),
            hover: true,
        }
    }

    /// Points excluding breaks
    pub fn coords(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().filter_map(TracePoint::coords)
    }
}

/// Segment pairs for every band, ordered offset, data, offset, data, ...
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandTraces {
    segments: Vec<Segment>,
}

impl BandTraces {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn band_count(&self) -> usize {
        self.segments.len() / 2
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn offset(&self, band: usize) -> Option<&Segment> {
        self.segments.get(2 * band)
    }

    pub fn data(&self, band: usize) -> Option<&Segment> {
        self.segments.get(2 * band + 1)
    }

    /// `(offset, data)` per band
    pub fn pairs(&self) -> impl Iterator<Item = (&Segment, &Segment)> {
        self.segments.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    fn pairs_mut(&mut self) -> impl Iterator<Item = (&mut Segment, &mut Segment)> {
        self.segments.chunks_exact_mut(2).map(|pair| {
            let (offset, data) = pair.split_at_mut(1);
            (&mut offset[0], &mut data[0])
        })
    }

    fn pair_mut(&mut self, band: usize) -> (&mut Segment, &mut Segment) {
        let (offset, data) = self.segments[2 * band..2 * band + 2].split_at_mut(1);
        (&mut offset[0], &mut data[0])
    }
}

/// Axis range suggested for a profile chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Settings for one profile trace.
///
/// `range` is written by every successful build so the caller can set the
/// value axis of the companion chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceInput {
    /// Positions along the profile; `0..n` when absent or empty
    pub x: Option<Vec<f64>>,
    /// Values, also used to pick each point's band
    pub y: Option<Vec<f64>>,
    pub fill_mode: FillMode,
    /// Draw vertically: values along X, positions along Y
    pub transpose: bool,
    pub name: Option<String>,
    pub range: Option<AxisRange>,
}

impl TraceInput {
    pub fn new(y: Vec<f64>) -> Self {
        Self {
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn with_x(mut self, x: Vec<f64>) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    pub fn transposed(mut self, transpose: bool) -> Self {
        self.transpose = transpose;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Validated view of a [`TraceInput`] ready to scan
struct Plan<'a> {
    xs: Cow<'a, [f64]>,
    ys: &'a [f64],
    fill_to: f64,
    do_fill: bool,
    mode: DrawMode,
    transpose: bool,
    range: AxisRange,
}

impl Plan<'_> {
    /// Map a (position, value) pair onto chart coordinates
    fn point(&self, position: f64, value: f64) -> TracePoint {
        if self.transpose {
            TracePoint::Point {
                x: value,
                y: position,
            }
        } else {
            TracePoint::Point {
                x: position,
                y: value,
            }
        }
    }
}

/// Builds [`BandTraces`] for a series using the bands of a [`ColorRamp`]
pub struct BandedTraceBuilder<'a> {
    ramp: &'a ColorRamp,
}

impl<'a> BandedTraceBuilder<'a> {
    pub fn new(ramp: &'a ColorRamp) -> Self {
        Self { ramp }
    }

    /// Build a new set of traces
    pub fn build(&self, input: &mut TraceInput) -> ScaleResult<BandTraces> {
        let name = input.name.as_deref().unwrap_or(DEFAULT_TRACE_NAME);
        let mut traces = BandTraces {
            segments: self
                .ramp
                .colors()
                .iter()
                .flat_map(|color| [Segment::offset(name), Segment::data(name, color)])
                .collect(),
        };

        let range = {
            let plan = self.plan(input)?;
            self.style(&mut traces, &plan, None);
            self.scan(&mut traces, &plan);
            plan.range
        };
        input.range = Some(range);
        Ok(traces)
    }

    /// Refill existing traces in place, keeping segment order and identity.
    ///
    /// Fails without touching `traces` or `input` when the traces were built
    /// for a ramp with a different band count or the input is invalid.
    pub fn rebuild(&self, input: &mut TraceInput, traces: &mut BandTraces) -> ScaleResult<()> {
        let expected = 2 * self.ramp.band_count();
        if traces.len() != expected {
            warn!(
                "existing traces not compatible with this ramp ({} segments, expected {})",
                traces.len(),
                expected
            );
            return Err(ScaleError::IncompatibleSegments {
                expected,
                actual: traces.len(),
            });
        }
        let range = {
            let plan = self.plan(input)?;
            for segment in &mut traces.segments {
                segment.points.clear();
            }
            self.style(traces, &plan, input.name.as_deref());
            self.scan(traces, &plan);
            plan.range
        };
        input.range = Some(range);
        Ok(())
    }

    fn plan<'i>(&self, input: &'i TraceInput) -> ScaleResult<Plan<'i>> {
        let target = self.ramp.target();
        let ys: &[f64] = input.y.as_deref().unwrap_or(&[]);

        let xs: Cow<'i, [f64]> = match (&input.y, input.x.as_deref()) {
            (None, _) => Cow::Borrowed(&[][..]),
            (Some(y), _) if y.is_empty() => Cow::Borrowed(&[][..]),
            (Some(y), Some(x)) if !x.is_empty() => {
                if x.len() != y.len() {
                    warn!(
                        "x and y series must have the same length ({} vs {})",
                        x.len(),
                        y.len()
                    );
                    return Err(ScaleError::LengthMismatch {
                        x: x.len(),
                        y: y.len(),
                    });
                }
                Cow::Borrowed(x)
            }
            (Some(y), _) => Cow::Owned((0..y.len()).map(|i| i as f64).collect()),
        };

        let (fill_to, do_fill, mode) = match (&input.y, input.fill_mode) {
            (None, _) => (0.0, false, DrawMode::None),
            (Some(_), FillMode::None) => (0.0, false, DrawMode::Lines),
            (Some(_), FillMode::ToZero) => (0.0, true, DrawMode::None),
            (Some(y), FillMode::ToAverage) if !y.is_empty() => {
                (y.iter().sum::<f64>() / y.len() as f64, true, DrawMode::None)
            }
            (Some(_), FillMode::ToAverage | FillMode::ToTarget) => (target, true, DrawMode::None),
        };

        Ok(Plan {
            xs,
            ys,
            fill_to,
            do_fill,
            mode,
            transpose: input.transpose,
            range: value_range(ys, target),
        })
    }

    fn style(&self, traces: &mut BandTraces, plan: &Plan<'_>, name: Option<&str>) {
        let (orientation, offset_fill, data_fill) = if plan.transpose {
            (Orientation::Vertical, Fill::ToZeroX, Fill::ToNextX)
        } else {
            (Orientation::Horizontal, Fill::ToZeroY, Fill::ToNextY)
        };
        let data_fill = if plan.do_fill { data_fill } else { Fill::None };

        let colors = self.ramp.colors();
        for ((offset, data), color) in traces.pairs_mut().zip(colors) {
            if let Some(name) = name {
                offset.name = Some(name.to_string());
                data.name = Some(name.to_string());
            }
            data.mode = plan.mode;
            data.fill = data_fill;
            data.orientation = orientation;
            data.fill_color.clone_from(color);
            data.line_color = Some(color.clone());

            offset.fill = offset_fill;
            offset.orientation = orientation;
        }
    }

    /// Single forward pass distributing points over the band segments
    fn scan(&self, traces: &mut BandTraces, plan: &Plan<'_>) {
        let fill_to = plan.fill_to;
        let mut active: Option<usize> = None;

        for (&x, &y) in plan.xs.iter().zip(plan.ys) {
            let band = self.ramp.color_index_for(y);

            if active != Some(band) {
                // Close the previous band at this x so adjacent bands meet
                if let Some(previous) = active {
                    let (offset, data) = traces.pair_mut(previous);
                    offset.points.push(plan.point(x, fill_to));
                    data.points.push(plan.point(x, y));
                    if plan.do_fill {
                        data.points.push(plan.point(x, fill_to));
                        offset.points.push(plan.point(x, fill_to));
                    }
                }
                active = Some(band);

                // A band seen earlier gets a break so the runs stay disconnected
                let (offset, data) = traces.pair_mut(band);
                if !offset.points.is_empty() {
                    data.points.push(TracePoint::Break);
                    offset.points.push(TracePoint::Break);
                    if plan.do_fill {
                        data.points.push(plan.point(x, fill_to));
                        offset.points.push(plan.point(x, fill_to));
                    }
                }
            }

            let (offset, data) = traces.pair_mut(band);
            offset.points.push(plan.point(x, fill_to));
            data.points.push(plan.point(x, y));
        }

        debug!(
            "built {} band traces from {} points",
            traces.band_count(),
            plan.ys.len()
        );
    }
}

/// Value axis range covering the data and the target, padded by a tenth
fn value_range(ys: &[f64], target: f64) -> AxisRange {
    let (min, max) = ys
        .iter()
        .fold((target, target), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let delta = (max - min) / 10.0;
    let min = if min < delta && min >= 0.0 {
        0.0
    } else {
        min - delta
    };
    AxisRange {
        min,
        max: max + delta,
    }
}

//! Banded color scale engine

mod error;
mod ramp;
mod series;
mod trace;

pub use error::{ErrorKind, Fault, ScaleError, ScaleResult};
pub use ramp::{BandInfo, ColorRamp, ColorStop, LimitLine, RampScale};
pub use series::{FieldSeries, SeriesKind};
pub use trace::{
    AxisRange, BandTraces, BandedTraceBuilder, DEFAULT_TRACE_NAME, DrawMode, Fill, FillMode,
    OFFSET_FILL_COLOR, Orientation, Segment, SegmentRole, TraceInput, TracePoint,
};

#[cfg(test)]
mod tests;

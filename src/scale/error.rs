//! Error and fault types for the color scale engine

use thiserror::Error;

/// Broad category of a [`ScaleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wiring mistake at construction or setter time
    Configuration,
    /// Bad per-call input; prior state is left untouched
    Validation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("color ramp needs at least 2 colors, got {0}")]
    TooFewColors(usize),

    #[error("invalid colors array: expected {expected} colors, got {actual}")]
    ColorCountMismatch { expected: usize, actual: usize },

    #[error("expected {expected} boundaries (one fewer than colors), got {actual}")]
    BoundaryCountMismatch { expected: usize, actual: usize },

    #[error("boundary values must be finite numbers")]
    NonFiniteBoundary,

    #[error("target must be a finite number, got {0}")]
    NonFiniteTarget(f64),

    #[error("boundaries must span a range greater than 0, got {0}")]
    NonPositiveSpan(f64),

    #[error("x and y series must have the same length ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("existing traces not compatible with this ramp: expected {expected} segments, got {actual}")]
    IncompatibleSegments { expected: usize, actual: usize },
}

impl ScaleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScaleError::LengthMismatch { .. } | ScaleError::IncompatibleSegments { .. } => {
                ErrorKind::Validation
            }
            _ => ErrorKind::Configuration,
        }
    }
}

pub type ScaleResult<T> = Result<T, ScaleError>;

/// A lookup that fell back to a safe default instead of failing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    /// Value could not be ordered against the boundaries (NaN)
    NonComparableValue { value: f64, fallback_band: usize },
}

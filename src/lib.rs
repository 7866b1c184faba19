//! Banded color scales for roll measurement charts.
//!
//! [`scale::ColorRamp`] turns colors and boundary values into a normalized
//! color ramp; [`scale::BandedTraceBuilder`] splits a profile into one
//! segment pair per band so it renders as a single multi-colored line.
//! [`roll`] supplies fields and profiles, [`chart`] draws them.

pub mod chart;
pub mod roll;
pub mod scale;

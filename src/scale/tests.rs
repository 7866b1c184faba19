//! Unit tests for the color scale engine

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use super::*;

const EPS: f64 = 1e-9;

fn blue_red() -> ColorRamp {
    ColorRamp::new(["blue", "red"], &[15.0], None, false).unwrap()
}

fn two_band(boundary: f64) -> ColorRamp {
    ColorRamp::new(["A", "B"], &[boundary], None, false).unwrap()
}

fn data_points(traces: &BandTraces, band: usize) -> Vec<TracePoint> {
    traces.data(band).unwrap().points.clone()
}

fn offset_points(traces: &BandTraces, band: usize) -> Vec<TracePoint> {
    traces.offset(band).unwrap().points.clone()
}

fn p(x: f64, y: f64) -> TracePoint {
    TracePoint::Point { x, y }
}

// =============================================================================
// ColorRamp construction and setters
// =============================================================================

#[test]
fn test_boundaries_are_sorted_copy() {
    let ramp = ColorRamp::new(["a", "b", "c", "d"], &[20.0, 10.0, 15.0], None, false).unwrap();
    assert_eq!(ramp.boundaries(), vec![10.0, 15.0, 20.0]);

    let mut copy = ramp.boundaries();
    copy[0] = -100.0;
    assert_eq!(ramp.boundaries()[0], 10.0, "Returned boundaries must be a copy");
}

#[test]
fn test_range_is_padded_by_ten_percent() {
    let ramp = ColorRamp::new(["a", "b", "c", "d"], &[20.0, 10.0, 15.0], None, false).unwrap();
    assert!((ramp.range_min() - 9.0).abs() < EPS);
    assert!((ramp.range_max() - 21.0).abs() < EPS);
    assert_eq!(ramp.scale().display_bounds, vec![9.0, 10.0, 15.0, 20.0, 21.0]);
}

#[test]
fn test_default_target_is_median_boundary() {
    let odd = ColorRamp::new(["a", "b", "c", "d"], &[20.0, 10.0, 15.0], None, false).unwrap();
    assert_eq!(odd.target(), 15.0);

    let even =
        ColorRamp::new(["a", "b", "c", "d", "e"], &[10.0, 12.0, 14.0, 16.0], None, false).unwrap();
    assert_eq!(even.target(), 13.0);

    let explicit = ColorRamp::new(["a", "b", "c"], &[10.0, 20.0], Some(11.0), false).unwrap();
    assert_eq!(explicit.target(), 11.0);
}

#[test]
fn test_too_few_colors_is_configuration_error() {
    let err = ColorRamp::new(["only"], &[], None, false).unwrap_err();
    assert_eq!(err, ScaleError::TooFewColors(1));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_boundary_count_mismatch() {
    let err = ColorRamp::new(["a", "b", "c"], &[10.0], None, false).unwrap_err();
    assert_eq!(
        err,
        ScaleError::BoundaryCountMismatch {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn test_zero_span_rejected() {
    let err = ColorRamp::new(["a", "b", "c"], &[5.0, 5.0], None, false).unwrap_err();
    assert!(matches!(err, ScaleError::NonPositiveSpan(span) if span == 0.0));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_non_finite_boundary_rejected() {
    let err = ColorRamp::new(["a", "b", "c"], &[5.0, f64::NAN], None, false).unwrap_err();
    assert_eq!(err, ScaleError::NonFiniteBoundary);
}

#[test]
fn test_non_finite_target_rejected() {
    let err = ColorRamp::new(["a", "b", "c"], &[10.0, 20.0], Some(f64::NAN), true).unwrap_err();
    assert!(matches!(err, ScaleError::NonFiniteTarget(t) if t.is_nan()));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = ColorRamp::ndc3(None, Some(f64::INFINITY), false).unwrap_err();
    assert_eq!(err, ScaleError::NonFiniteTarget(f64::INFINITY));
}

#[test]
fn test_single_boundary_padding_uses_magnitude() {
    let ramp = blue_red();
    assert!((ramp.range_min() - 13.5).abs() < EPS);
    assert!((ramp.range_max() - 16.5).abs() < EPS);
    assert!(ramp.range_max() > ramp.range_min());

    let zero = two_band(0.0);
    assert!((zero.range_min() + 0.1).abs() < EPS);
    assert!((zero.range_max() - 0.1).abs() < EPS);
}

#[test]
fn test_set_boundaries_twice_is_noop() {
    let mut ramp = two_band(10.0);
    assert!(ramp.set_boundaries(&[15.0]).unwrap());
    let rebuilds = ramp.rebuild_count();
    let stops_before = ramp.scale().stops.clone();

    assert!(!ramp.set_boundaries(&[15.0]).unwrap());
    assert_eq!(ramp.rebuild_count(), rebuilds, "Unchanged boundaries must not rebuild");
    assert_eq!(ramp.scale().stops, stops_before);
}

#[test]
fn test_set_boundaries_unsorted_equal_is_noop() {
    let mut ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let rebuilds = ramp.rebuild_count();
    assert!(!ramp.set_boundaries(&[20.0, 10.0]).unwrap());
    assert_eq!(ramp.rebuild_count(), rebuilds);
}

#[test]
fn test_invalid_boundaries_leave_state_untouched() {
    let mut ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let rebuilds = ramp.rebuild_count();

    assert!(ramp.set_boundaries(&[5.0, 5.0]).is_err());
    assert!(ramp.set_boundaries(&[1.0, 2.0, 3.0]).is_err());
    assert_eq!(ramp.boundaries(), vec![10.0, 20.0]);
    assert_eq!(ramp.rebuild_count(), rebuilds);
}

#[test]
fn test_set_colors() {
    let mut ramp = ColorRamp::ndc3(None, None, false).unwrap();

    let err = ramp.set_colors(Some(&["a", "b"][..])).unwrap_err();
    assert_eq!(
        err,
        ScaleError::ColorCountMismatch {
            expected: 3,
            actual: 2
        }
    );

    assert!(!ramp.set_colors(Some(&["red", "lime", "yellow"][..])).unwrap());
    assert!(ramp.set_colors(Some(&["a", "b", "c"][..])).unwrap());
    assert_eq!(ramp.colors(), &["a", "b", "c"]);
    assert_eq!(ramp.scale().stops[0].color, "a");

    assert!(ramp.reset_colors());
    assert_eq!(ramp.colors(), &["red", "lime", "yellow"]);
    assert!(!ramp.reset_colors());
}

#[test]
fn test_set_blended_toggles_and_rebuilds() {
    let mut ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let rebuilds = ramp.rebuild_count();

    assert!(!ramp.set_blended(false));
    assert_eq!(ramp.rebuild_count(), rebuilds);

    assert!(ramp.set_blended(true));
    assert!(ramp.blended());
    assert_eq!(ramp.rebuild_count(), rebuilds + 1);
    assert_eq!(ramp.scale().stops.len(), 7);
}

#[test]
fn test_set_target() {
    let mut ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let rebuilds = ramp.rebuild_count();

    assert!(!ramp.set_target(15.0));
    assert!(ramp.set_target(12.0));
    assert_eq!(ramp.target(), 12.0);
    assert_eq!(ramp.rebuild_count(), rebuilds, "Discrete scale ignores the target");

    ramp.set_blended(true);
    let rebuilds = ramp.rebuild_count();
    assert!(ramp.set_target(18.0));
    assert_eq!(ramp.rebuild_count(), rebuilds + 1);
    assert!(!ramp.set_target(f64::NAN));
    assert!(!ramp.set_target(f64::INFINITY));
}

// =============================================================================
// Derived scale
// =============================================================================

#[test]
fn test_discrete_scale_steps() {
    let ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let stops = &ramp.scale().stops;
    let expected = [
        (0.0, "red"),
        (1.0 / 12.0, "red"),
        (1.0 / 12.0, "lime"),
        (11.0 / 12.0, "lime"),
        (11.0 / 12.0, "yellow"),
        (1.0, "yellow"),
    ];

    assert_eq!(stops.len(), 6);
    for (stop, (position, color)) in stops.iter().zip(expected) {
        assert!(
            (stop.position - position).abs() < EPS,
            "Expected stop at {}, got {}",
            position,
            stop.position
        );
        assert_eq!(stop.color, color);
    }
}

#[test]
fn test_blended_scale_anchored_at_target() {
    let ramp = ColorRamp::ndc3(None, None, true).unwrap();
    let stops = &ramp.scale().stops;
    let expected = [
        (0.0, "red"),
        (1.0 / 12.0, "red"),
        (1.0 / 12.0, "red"),
        (0.5, "lime"),
        (11.0 / 12.0, "yellow"),
        (11.0 / 12.0, "yellow"),
        (1.0, "yellow"),
    ];

    assert_eq!(stops.len(), 7);
    for (stop, (position, color)) in stops.iter().zip(expected) {
        assert!((stop.position - position).abs() < EPS);
        assert_eq!(stop.color, color);
    }
}

#[test]
fn test_blended_target_outside_range_uses_midpoint() {
    let ramp = ColorRamp::ndc3(None, Some(100.0), true).unwrap();
    let target_stop = ramp
        .scale()
        .stops
        .iter()
        .find(|s| s.color == "lime")
        .unwrap();
    assert!((target_stop.position - 0.5).abs() < EPS);
}

#[test]
fn test_blended_ndc7_has_no_color_steps() {
    let ramp = ColorRamp::ndc7(None, None, true).unwrap();
    let stops = &ramp.scale().stops;
    assert_eq!(stops.len(), 15);
    for pair in stops.windows(2) {
        if pair[0].position == pair[1].position {
            assert_eq!(pair[0].color, pair[1].color, "Blended stops must not step");
        }
    }
}

#[test]
fn test_band_info() {
    let ramp = ColorRamp::ndc3(None, None, false).unwrap();

    let first = ramp.band_info(0).unwrap();
    assert_eq!(first.color, "red");
    assert!((first.from - 9.0).abs() < EPS);
    assert_eq!(first.to, 10.0);

    let last = ramp.band_info(2).unwrap();
    assert_eq!(last.color, "yellow");
    assert_eq!(last.from, 20.0);
    assert!((last.to - 21.0).abs() < EPS);

    assert!(ramp.band_info(3).is_none());
}

#[test]
fn test_limit_lines_skip_middle_boundary() {
    let colors = ["c0", "c1", "c2", "c3", "c4", "c5"];
    let ramp = ColorRamp::new(colors, &[1.0, 2.0, 3.0, 4.0, 5.0], None, false).unwrap();

    assert_eq!(ramp.limit_line_count(), 4);
    let lines: Vec<LimitLine> = (0..4).map(|i| ramp.limit_line_info(i).unwrap()).collect();
    let expected = [("c0", 1.0), ("c1", 2.0), ("c4", 4.0), ("c5", 5.0)];
    for (line, (color, limit)) in lines.iter().zip(expected) {
        assert_eq!(line.color, color);
        assert_eq!(line.limit, limit);
    }
    assert!(lines.iter().all(|l| l.limit != 3.0));
    assert!(ramp.limit_line_info(4).is_none());
}

#[test]
fn test_limit_lines_even_boundaries() {
    let ramp = ColorRamp::ndc7(None, None, false).unwrap();
    assert_eq!(ramp.limit_line_count(), 6);

    let colors: Vec<String> = (0..6)
        .map(|i| ramp.limit_line_info(i).unwrap().color)
        .collect();
    assert_eq!(colors, ["darkblue", "blue", "cyan", "yellow", "orange", "red"]);
    assert_eq!(ramp.limit_line_info(3).unwrap().limit, 16.0);
    assert!(ramp.limit_line_info(6).is_none());
}

#[test]
fn test_apply_range_to_surface() {
    let ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let mut series = FieldSeries::new(SeriesKind::Surface, vec![vec![1.0, 2.0]]);
    series.color_scale.reserve(32);
    let container = series.color_scale.as_ptr();

    assert!(ramp.apply_range_to_series(Some(&mut series)));
    assert!(!series.auto_color_scale);
    assert!(!series.auto_contour);
    assert_eq!(series.cmin, Some(ramp.range_min()));
    assert_eq!(series.cmax, Some(ramp.range_max()));
    assert_eq!(series.zmin, None);
    assert_eq!(series.color_scale, ramp.scale().stops);
    assert_eq!(
        series.color_scale.as_ptr(),
        container,
        "Color scale must be refilled in place"
    );

    // Applying again replaces rather than appends
    assert!(ramp.apply_range_to_series(Some(&mut series)));
    assert_eq!(series.color_scale.len(), 6);
}

#[test]
fn test_apply_range_to_heatmap_and_none() {
    let ramp = ColorRamp::ndc3(None, None, true).unwrap();
    let mut series = FieldSeries::new(SeriesKind::Heatmap, Vec::new());

    assert!(ramp.apply_range_to_series(Some(&mut series)));
    assert_eq!(series.cmin, None);
    assert_eq!(
        series.color_range(),
        Some((ramp.range_min(), ramp.range_max()))
    );
    assert_eq!(series.color_scale.len(), 7);

    assert!(!ramp.apply_range_to_series(None));
}

#[test]
fn test_color_index_for() {
    let ramp = ColorRamp::ndc3(None, None, false).unwrap();
    assert_eq!(ramp.color_index_for(9.99), 0);
    assert_eq!(ramp.color_index_for(10.0), 1);
    assert_eq!(ramp.color_index_for(19.99), 1);
    assert_eq!(ramp.color_index_for(20.0), 2);
    assert_eq!(ramp.color_index_for(f64::INFINITY), 2);
    assert_eq!(ramp.color_index_for(f64::NEG_INFINITY), 0);
}

#[test]
fn test_color_index_nan_falls_back_and_reports() {
    let mut ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let faults = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&faults);
    ramp.set_diagnostic_hook(move |fault| sink.borrow_mut().push(*fault));

    assert_eq!(ramp.color_index_for(f64::NAN), 0);
    assert_eq!(faults.borrow().len(), 1);
    assert!(matches!(
        faults.borrow()[0],
        Fault::NonComparableValue {
            fallback_band: 0,
            ..
        }
    ));

    ramp.clear_diagnostic_hook();
    assert_eq!(ramp.color_index_for(f64::NAN), 0);
    assert_eq!(faults.borrow().len(), 1);
}

// =============================================================================
// Banded traces
// =============================================================================

#[test]
fn test_build_tozero_scenario() {
    let ramp = blue_red();
    let mut input = TraceInput::new(vec![10.0, 12.0, 20.0, 18.0]).with_fill_mode(FillMode::ToZero);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    assert_eq!(traces.len(), 4);
    assert_eq!(
        data_points(&traces, 0),
        vec![p(0.0, 10.0), p(1.0, 12.0), p(2.0, 20.0), p(2.0, 0.0)]
    );
    assert_eq!(data_points(&traces, 1), vec![p(2.0, 20.0), p(3.0, 18.0)]);

    for band in 0..2 {
        let offset = traces.offset(band).unwrap();
        assert!(offset.coords().all(|(_, y)| y == 0.0), "Offsets fill to zero");
        assert_eq!(offset.points.len(), data_points(&traces, band).len());
    }
}

#[test]
fn test_single_bridge_at_crossing_without_fill() {
    let ramp = two_band(10.0);
    let mut input = TraceInput::new(vec![5.0, 8.0, 12.0, 15.0]).with_fill_mode(FillMode::None);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    // Band 0: its own points plus exactly one bridge at the crossing x
    assert_eq!(
        data_points(&traces, 0),
        vec![p(0.0, 5.0), p(1.0, 8.0), p(2.0, 12.0)]
    );
    // Band 1 starts at the same crossing point
    assert_eq!(data_points(&traces, 1), vec![p(2.0, 12.0), p(3.0, 15.0)]);
    assert!(traces.segments().iter().all(|s| !s.points.iter().any(TracePoint::is_break)));
}

#[test]
fn test_revisited_band_is_broken() {
    let ramp = two_band(10.0);
    let mut input = TraceInput::new(vec![5.0, 12.0, 6.0]).with_fill_mode(FillMode::None);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    assert_eq!(
        data_points(&traces, 0),
        vec![p(0.0, 5.0), p(1.0, 12.0), TracePoint::Break, p(2.0, 6.0)]
    );
    assert_eq!(
        offset_points(&traces, 0),
        vec![p(0.0, 0.0), p(1.0, 0.0), TracePoint::Break, p(2.0, 0.0)]
    );
    assert_eq!(data_points(&traces, 1), vec![p(1.0, 12.0), p(2.0, 6.0)]);
}

#[test]
fn test_revisited_band_restarts_at_fill_level() {
    let ramp = two_band(10.0);
    let mut input = TraceInput::new(vec![5.0, 12.0, 6.0]);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    assert_eq!(
        data_points(&traces, 0),
        vec![
            p(0.0, 5.0),
            p(1.0, 12.0),
            p(1.0, 10.0),
            TracePoint::Break,
            p(2.0, 10.0),
            p(2.0, 6.0)
        ]
    );
    assert_eq!(
        offset_points(&traces, 0),
        vec![
            p(0.0, 10.0),
            p(1.0, 10.0),
            p(1.0, 10.0),
            TracePoint::Break,
            p(2.0, 10.0),
            p(2.0, 10.0)
        ]
    );
}

#[test]
fn test_break_restart_consistent_for_every_fill_mode() {
    let ramp = ColorRamp::ndc3(None, None, false).unwrap();
    let y = vec![5.0, 15.0, 25.0, 15.0, 5.0, 15.0, 25.0, 3.0];
    let mean = y.iter().sum::<f64>() / y.len() as f64;

    for (mode, fill_to) in [
        (FillMode::ToTarget, 15.0),
        (FillMode::ToAverage, mean),
        (FillMode::ToZero, 0.0),
        (FillMode::None, 0.0),
    ] {
        let mut input = TraceInput::new(y.clone()).with_fill_mode(mode);
        let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

        for (offset, data) in traces.pairs() {
            assert!(offset.coords().all(|(_, v)| v == fill_to), "{:?}", mode);
            assert_eq!(offset.points.len(), data.points.len(), "{:?}", mode);

            for (i, point) in data.points.iter().enumerate() {
                if !point.is_break() {
                    continue;
                }
                assert!(offset.points[i].is_break(), "{:?}: breaks line up", mode);
                let restart = data.points[i + 1].coords().unwrap();
                if mode != FillMode::None {
                    // The run restarts at fill level, at the x of its first point
                    let first = data.points[i + 2].coords().unwrap();
                    assert_eq!(restart, (first.0, fill_to), "{:?}", mode);
                    assert_eq!(offset.points[i + 1].coords(), Some((first.0, fill_to)));
                }
            }
        }
    }
}

#[test]
fn test_range_written_back() {
    let ramp = blue_red();
    let mut input = TraceInput::new(vec![10.0, 12.0, 20.0, 18.0]);
    BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    let range = input.range.unwrap();
    assert!((range.min - 9.0).abs() < EPS);
    assert!((range.max - 21.0).abs() < EPS);
}

#[test]
fn test_range_includes_target_and_snaps_to_zero() {
    let ramp = two_band(5.0);
    let mut input = TraceInput::new(vec![0.5, 10.0]);
    BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    let range = input.range.unwrap();
    assert_eq!(range.min, 0.0);
    assert!((range.max - 10.95).abs() < EPS);

    let mut input = TraceInput::new(vec![7.0, 8.0]);
    BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    let range = input.range.unwrap();
    assert!((range.min - 4.7).abs() < EPS, "Target widens the range down to 5");
    assert!((range.max - 8.3).abs() < EPS);

    let ramp = two_band(0.0);
    let mut input = TraceInput::new(vec![-5.0, 5.0]);
    BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    let range = input.range.unwrap();
    assert!((range.min + 6.0).abs() < EPS, "Negative minimum is not snapped");
    assert!((range.max - 6.0).abs() < EPS);
}

#[test]
fn test_fill_modes_set_segment_styles() {
    let ramp = blue_red();

    let mut input = TraceInput::new(vec![10.0, 20.0]);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    let (offset, data) = traces.pairs().next().unwrap();
    assert_eq!(offset.fill, Fill::ToZeroY);
    assert_eq!(offset.fill_color, OFFSET_FILL_COLOR);
    assert!(!offset.hover);
    assert_eq!(data.fill, Fill::ToNextY);
    assert_eq!(data.mode, DrawMode::None);
    assert_eq!(data.fill_color, "blue");
    assert_eq!(data.line_color.as_deref(), Some("blue"));
    assert_eq!(data.name.as_deref(), Some(DEFAULT_TRACE_NAME));

    let mut input = TraceInput::new(vec![10.0, 20.0]).with_fill_mode(FillMode::None);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    let data = traces.data(1).unwrap();
    assert_eq!(data.fill, Fill::None);
    assert_eq!(data.mode, DrawMode::Lines);
    assert_eq!(data.line_color.as_deref(), Some("red"));
}

#[test]
fn test_average_fill() {
    let ramp = blue_red();
    let mut input = TraceInput::new(vec![10.0, 20.0, 30.0]).with_fill_mode(FillMode::ToAverage);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    assert!(
        traces
            .segments()
            .iter()
            .filter(|s| s.role == SegmentRole::Offset)
            .flat_map(|s| s.coords())
            .all(|(_, y)| y == 20.0)
    );
}

#[test]
fn test_transpose_swaps_axes() {
    let ramp = blue_red();
    let mut input = TraceInput::new(vec![10.0, 20.0])
        .with_x(vec![0.0, 100.0])
        .transposed(true);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    assert_eq!(
        data_points(&traces, 0),
        vec![p(10.0, 0.0), p(20.0, 100.0), p(15.0, 100.0)]
    );
    assert_eq!(data_points(&traces, 1), vec![p(20.0, 100.0)]);
    assert_eq!(
        offset_points(&traces, 1),
        vec![p(15.0, 100.0)],
        "Fill level runs along X when transposed"
    );

    for (offset, data) in traces.pairs() {
        assert_eq!(offset.orientation, Orientation::Vertical);
        assert_eq!(offset.fill, Fill::ToZeroX);
        assert_eq!(data.orientation, Orientation::Vertical);
        assert_eq!(data.fill, Fill::ToNextX);
    }
}

#[test]
fn test_synthesized_positions_when_x_empty() {
    let ramp = blue_red();
    let mut input = TraceInput::new(vec![1.0, 2.0, 3.0]).with_x(Vec::new());
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    let xs: Vec<f64> = traces.data(0).unwrap().coords().map(|(x, _)| x).collect();
    assert_eq!(xs, vec![0.0, 1.0, 2.0]);
}

#[test]
fn test_missing_values_give_empty_placeholder() {
    let ramp = blue_red();
    let mut input = TraceInput {
        x: Some(vec![1.0, 2.0]),
        ..Default::default()
    };
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    assert_eq!(traces.len(), 4);
    assert!(traces.segments().iter().all(|s| s.points.is_empty()));
    assert!(
        traces
            .segments()
            .iter()
            .filter(|s| s.role == SegmentRole::Data)
            .all(|s| s.fill == Fill::None && s.mode == DrawMode::None)
    );
    let range = input.range.unwrap();
    assert_eq!((range.min, range.max), (15.0, 15.0));
}

#[test]
fn test_length_mismatch_is_rejected() {
    let ramp = blue_red();
    let builder = BandedTraceBuilder::new(&ramp);

    let mut input = TraceInput::new(vec![1.0, 2.0, 3.0]).with_x(vec![0.0, 1.0]);
    let err = builder.build(&mut input).unwrap_err();
    assert_eq!(err, ScaleError::LengthMismatch { x: 2, y: 3 });
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(input.range.is_none(), "Input must be left unchanged");

    let mut good = TraceInput::new(vec![10.0, 20.0]);
    let mut traces = builder.build(&mut good).unwrap();
    let before = traces.clone();
    assert!(builder.rebuild(&mut input, &mut traces).is_err());
    assert_eq!(traces, before, "Existing traces must be left unchanged");
}

#[test]
fn test_incompatible_traces_are_rejected() {
    let two = blue_red();
    let three = ColorRamp::ndc3(None, None, false).unwrap();

    let mut input = TraceInput::new(vec![10.0, 20.0]);
    let mut traces = BandedTraceBuilder::new(&two).build(&mut input).unwrap();
    let before = traces.clone();
    input.range = None;

    let err = BandedTraceBuilder::new(&three)
        .rebuild(&mut input, &mut traces)
        .unwrap_err();
    assert_eq!(
        err,
        ScaleError::IncompatibleSegments {
            expected: 6,
            actual: 4
        }
    );
    assert_eq!(traces, before);
    assert!(input.range.is_none());
}

#[test]
fn test_rebuild_refreshes_in_place() {
    let mut ramp = blue_red();
    let mut input = TraceInput::new(vec![10.0, 20.0, 10.0]).with_name("CD profile");
    let mut traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();
    let storage = traces.segments().as_ptr();

    ramp.set_colors(Some(&["navy", "orange"][..])).unwrap();
    let mut input = TraceInput::new(vec![20.0, 21.0]).with_name("MD profile");
    BandedTraceBuilder::new(&ramp)
        .rebuild(&mut input, &mut traces)
        .unwrap();

    assert_eq!(traces.segments().as_ptr(), storage, "Segments are reused");
    assert_eq!(traces.len(), 4);
    assert!(traces.data(0).unwrap().points.is_empty());
    assert_eq!(data_points(&traces, 1), vec![p(0.0, 20.0), p(1.0, 21.0)]);
    assert_eq!(traces.data(1).unwrap().fill_color, "orange");
    assert!(
        traces
            .segments()
            .iter()
            .all(|s| s.name.as_deref() == Some("MD profile"))
    );
    let roles: Vec<SegmentRole> = traces.segments().iter().map(|s| s.role).collect();
    assert_eq!(
        roles,
        [
            SegmentRole::Offset,
            SegmentRole::Data,
            SegmentRole::Offset,
            SegmentRole::Data
        ]
    );
}

#[test]
fn test_nan_values_degrade_to_first_band() {
    let mut ramp = blue_red();
    let faults = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&faults);
    ramp.set_diagnostic_hook(move |_| *sink.borrow_mut() += 1);

    let mut input = TraceInput::new(vec![20.0, f64::NAN, 20.0]).with_fill_mode(FillMode::None);
    let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

    assert_eq!(*faults.borrow(), 1);
    assert_eq!(traces.data(0).unwrap().points.len(), 2);
    let range = input.range.unwrap();
    assert!(range.min.is_finite() && range.max.is_finite());
}

#[test]
fn test_fill_mode_from_str() {
    assert_eq!("totarget".parse::<FillMode>(), Ok(FillMode::ToTarget));
    assert_eq!("ToAverage".parse::<FillMode>(), Ok(FillMode::ToAverage));
    assert_eq!("tozero".parse::<FillMode>(), Ok(FillMode::ToZero));
    assert_eq!("none".parse::<FillMode>(), Ok(FillMode::None));
    assert!("sideways".parse::<FillMode>().is_err());
}

// =============================================================================
// Properties
// =============================================================================

fn boundary_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0f64..1000.0, 2..8)
}

proptest! {
    #[test]
    fn boundaries_sorted_and_range_padded(bounds in boundary_strategy()) {
        let colors: Vec<String> = (0..=bounds.len()).map(|i| format!("c{}", i)).collect();
        let mut sorted = bounds.clone();
        sorted.sort_by(f64::total_cmp);
        let span = sorted[sorted.len() - 1] - sorted[0];
        prop_assume!(span > 1e-6);

        let ramp = ColorRamp::new(colors, &bounds, None, false).unwrap();
        prop_assert_eq!(ramp.boundaries(), sorted);
        let padded = ramp.range_max() - ramp.range_min();
        prop_assert!((padded - span * 1.2).abs() < 1e-6 * span.max(1.0));
    }

    #[test]
    fn color_index_monotonic_and_in_range(
        bounds in boundary_strategy(),
        a in -2000.0f64..2000.0,
        b in -2000.0f64..2000.0,
    ) {
        let colors: Vec<String> = (0..=bounds.len()).map(|i| format!("c{}", i)).collect();
        let ramp = match ColorRamp::new(colors, &bounds, None, false) {
            Ok(ramp) => ramp,
            Err(_) => return Ok(()),
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (ilo, ihi) = (ramp.color_index_for(lo), ramp.color_index_for(hi));
        prop_assert!(ilo <= ihi);
        prop_assert!(ihi < ramp.band_count());
    }

    #[test]
    fn stop_counts_and_order(bounds in boundary_strategy(), blended in any::<bool>(), target in -1500.0f64..1500.0) {
        let colors: Vec<String> = (0..=bounds.len()).map(|i| format!("c{}", i)).collect();
        let n = colors.len();
        let ramp = match ColorRamp::new(colors, &bounds, Some(target), blended) {
            Ok(ramp) => ramp,
            Err(_) => return Ok(()),
        };
        let stops = &ramp.scale().stops;
        let expected = if blended { 2 * n + 1 } else { 2 * n };
        prop_assert_eq!(stops.len(), expected);
        prop_assert!(stops.windows(2).all(|w| w[0].position <= w[1].position));
        prop_assert!(stops.iter().all(|s| (0.0..=1.0).contains(&s.position)));
    }

    #[test]
    fn every_point_lands_in_its_band(
        ys in prop::collection::vec(0.0f64..30.0, 0..60),
    ) {
        let ramp = ColorRamp::ndc3(None, None, false).unwrap();
        let mut input = TraceInput::new(ys.clone()).with_fill_mode(FillMode::None);
        let traces = BandedTraceBuilder::new(&ramp).build(&mut input).unwrap();

        let bands: Vec<usize> = ys.iter().map(|&y| ramp.color_index_for(y)).collect();
        let transitions = bands.windows(2).filter(|w| w[0] != w[1]).count();
        let data_count: usize = traces.pairs().map(|(_, d)| d.coords().count()).sum();
        prop_assert_eq!(data_count, ys.len() + transitions);

        for (i, (&y, &band)) in ys.iter().zip(&bands).enumerate() {
            let data = traces.data(band).unwrap();
            prop_assert!(data.coords().any(|(x, v)| x == i as f64 && v == y));
        }
    }
}

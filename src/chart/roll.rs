//! Roll chart: banded field with linked CD and MD profiles

use std::collections::BTreeMap;

use charming::{
    Chart, ImageRenderer,
    component::{Axis, Grid, Title},
    element::{
        AreaStyle, AxisLabel, AxisType, Color, ItemStyle, LineStyle, LineStyleType, SplitLine,
        Symbol, TextStyle,
    },
    renderer::ImageFormat,
    series::{Line, Scatter},
};

use super::colors::{COLOR_BACKGROUND, COLOR_CROSSHAIR, COLOR_GRID, COLOR_TEXT, FILL_OPACITY};
use super::{CHART_HEIGHT, CHART_WIDTH, RollChartData, format_value, sample_scale};
use crate::scale::{BandTraces, DrawMode, Fill, Segment};

/// Number of color levels used to draw a blended field
const BLENDED_LEVELS: usize = 48;

/// Grid indexes
const FIELD_GRID: i32 = 0;
const CD_GRID: i32 = 1;
const MD_GRID: i32 = 2;

/// Render the field and both profiles to a PNG file
pub fn render_roll_chart(data: &RollChartData, output_path: &str) -> Result<(), String> {
    let (min, max) = data
        .series
        .color_range()
        .ok_or_else(|| "Color range has not been applied to the field".to_string())?;
    let field = data.field;
    let (cd_index, md_index) = data.crosshair;
    let cd_at = *field
        .cd_positions()
        .get(cd_index)
        .ok_or_else(|| format!("CD index {} out of range", cd_index))?;
    let md_at = *field
        .md_positions()
        .get(md_index)
        .ok_or_else(|| format!("MD index {} out of range", md_index))?;

    let cd_last = field.cd_positions().last().copied().unwrap_or(0.0);
    let md_last = field.md_positions().last().copied().unwrap_or(0.0);

    let mut chart = Chart::new()
        .background_color(Color::Value(COLOR_BACKGROUND.to_string()))
        .title(
            Title::new()
                .text(&data.title)
                .subtext(&data.subtitle)
                .left("center")
                .top("1%")
                .text_style(TextStyle::new().color(COLOR_TEXT).font_size(32))
                .subtext_style(TextStyle::new().color(COLOR_TEXT).font_size(20)),
        )
        // Field
        .grid(Grid::new().left("7%").right("24%").top("28%").bottom("7%"))
        // CD profile above the field
        .grid(Grid::new().left("7%").right("24%").top("7%").bottom("76%"))
        // MD profile right of the field
        .grid(Grid::new().left("80%").right("3%").top("28%").bottom("7%"));

    chart = chart
        .x_axis(position_axis("CD Position", FIELD_GRID, cd_last))
        .y_axis(position_axis("MD Distance", FIELD_GRID, md_last))
        .x_axis(position_axis("", CD_GRID, cd_last))
        .y_axis(value_axis("Thickness", CD_GRID, data.cd_range.min, data.cd_range.max))
        .x_axis(value_axis("Thickness", MD_GRID, data.md_range.min, data.md_range.max))
        .y_axis(position_axis("", MD_GRID, md_last));

    // Field cells, one series per color
    let cell_size = cell_size(field.width(), field.height());
    for (color, cells) in field_cells(data, min, max) {
        chart = chart.series(
            Scatter::new()
                .symbol(Symbol::Rect)
                .symbol_size(cell_size)
                .item_style(ItemStyle::new().color(Color::Value(color)))
                .data(cells),
        );
    }

    // Crosshair at the selected position
    chart = chart
        .series(guide_line(
            vec![vec![cd_at, 0.0], vec![cd_at, md_last]],
            COLOR_CROSSHAIR,
            FIELD_GRID,
        ))
        .series(guide_line(
            vec![vec![0.0, md_at], vec![cd_last, md_at]],
            COLOR_CROSSHAIR,
            FIELD_GRID,
        ));

    // Limit lines across the CD profile
    for i in 0..data.ramp.limit_line_count() {
        if let Some(line) = data.ramp.limit_line_info(i) {
            chart = chart.series(guide_line(
                vec![vec![0.0, line.limit], vec![cd_last, line.limit]],
                &line.color,
                CD_GRID,
            ));
        }
    }

    let row_height = CHART_HEIGHT as f64 * 0.65 / field.height().max(1) as f64;
    for line in profile_lines(data.cd_profile, CD_GRID, row_height) {
        chart = chart.series(line);
    }
    for line in profile_lines(data.md_profile, MD_GRID, row_height) {
        chart = chart.series(line);
    }

    // Render to PNG
    let mut renderer = ImageRenderer::new(CHART_WIDTH, CHART_HEIGHT);
    renderer
        .save_format(ImageFormat::Png, &chart, output_path)
        .map_err(|e| format!("Failed to save chart: {}", e))?;

    Ok(())
}

fn position_axis(name: &str, grid: i32, max: f64) -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .grid_index(grid)
        .name(name)
        .min(0)
        .max(max)
        .name_text_style(TextStyle::new().color(COLOR_TEXT).font_size(18))
        .axis_label(AxisLabel::new().color(COLOR_TEXT).font_size(14))
        .split_line(SplitLine::new().show(false))
}

fn value_axis(name: &str, grid: i32, min: f64, max: f64) -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .grid_index(grid)
        .name(name)
        .min(min)
        .max(max)
        .name_text_style(TextStyle::new().color(COLOR_TEXT).font_size(18))
        .axis_label(AxisLabel::new().color(COLOR_TEXT).font_size(14))
        .split_line(SplitLine::new().line_style(LineStyle::new().width(0.5).color(COLOR_GRID)))
}

/// Symbol size in pixels that makes neighbouring cells touch
fn cell_size(width: usize, height: usize) -> f64 {
    let grid_width = CHART_WIDTH as f64 * 0.69;
    let grid_height = CHART_HEIGHT as f64 * 0.65;
    let w = grid_width / width.max(1) as f64;
    let h = grid_height / height.max(1) as f64;
    w.max(h).ceil()
}

/// Group field cells by display color
///
/// A discrete scale draws each cell in its band color; a blended scale
/// samples the stops at a fixed number of levels.
fn field_cells(data: &RollChartData, min: f64, max: f64) -> BTreeMap<String, Vec<Vec<f64>>> {
    let field = data.field;
    let ramp = data.ramp;
    let mut cells: BTreeMap<String, Vec<Vec<f64>>> = BTreeMap::new();

    let level_colors: Vec<String> = if ramp.blended() {
        (0..BLENDED_LEVELS)
            .filter_map(|level| {
                let value = min + (max - min) * (level as f64 + 0.5) / BLENDED_LEVELS as f64;
                sample_scale(ramp.scale(), value)
            })
            .collect()
    } else {
        Vec::new()
    };

    for (row, md) in data.series.z.iter().zip(field.md_positions()) {
        for (&value, &cd) in row.iter().zip(field.cd_positions()) {
            if !value.is_finite() {
                continue;
            }
            let color = if level_colors.is_empty() {
                ramp.colors()[ramp.color_index_for(value)].clone()
            } else {
                let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
                let level = ((t * BLENDED_LEVELS as f64) as usize).min(level_colors.len() - 1);
                level_colors[level].clone()
            };
            cells.entry(color).or_default().push(vec![cd, *md]);
        }
    }
    cells
}

fn guide_line(points: Vec<Vec<f64>>, color: &str, grid: i32) -> Line {
    Line::new()
        .data(points)
        .symbol(Symbol::None)
        .x_axis_index(grid)
        .y_axis_index(grid)
        .line_style(
            LineStyle::new()
                .width(2.0)
                .type_(LineStyleType::Dashed)
                .color(Color::Value(color.to_string())),
        )
}

/// What a band segment pair draws
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    /// Plain line through the data
    Stroke {
        color: String,
        points: Vec<Vec<f64>>,
    },
    /// Horizontal fill between the offset and the data, as a transparent
    /// base with the difference stacked on top
    Area {
        color: String,
        base: Vec<Vec<f64>>,
        extent: Vec<Vec<f64>>,
    },
    /// One row of a vertical fill, from the offset out to the data
    Span {
        color: String,
        from: [f64; 2],
        to: [f64; 2],
    },
}

/// Offset and data points of a band side by side, split at their breaks
fn paired_runs(offset: &Segment, data: &Segment) -> Vec<Vec<((f64, f64), (f64, f64))>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (o, d) in offset.points.iter().zip(&data.points) {
        match (o.coords(), d.coords()) {
            (Some(o), Some(d)) => current.push((o, d)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Shapes for the visible parts of a profile
///
/// Offset segments are fully transparent and only bound the fill, so they
/// are never drawn themselves. Data segments are stroked only in
/// [`DrawMode::Lines`].
fn profile_shapes(traces: &BandTraces) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for (offset, data) in traces.pairs() {
        let color = data
            .line_color
            .clone()
            .unwrap_or_else(|| data.fill_color.clone());

        for run in paired_runs(offset, data) {
            if data.mode == DrawMode::Lines {
                shapes.push(Shape::Stroke {
                    color: color.clone(),
                    points: run.iter().map(|&(_, (x, y))| vec![x, y]).collect(),
                });
            }
            match data.fill {
                Fill::ToNextY => shapes.push(Shape::Area {
                    color: data.fill_color.clone(),
                    base: run.iter().map(|&((x, oy), (_, y))| vec![x, oy.min(y)]).collect(),
                    extent: run
                        .iter()
                        .map(|&((x, oy), (_, y))| vec![x, (y - oy).abs()])
                        .collect(),
                }),
                Fill::ToNextX => {
                    for &((ox, oy), (x, y)) in &run {
                        if ox != x {
                            shapes.push(Shape::Span {
                                color: data.fill_color.clone(),
                                from: [ox, oy],
                                to: [x, y],
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }
    shapes
}

/// Line series for a profile
///
/// `span_width` is the pixel height of one row of a vertical profile.
fn profile_lines(traces: &BandTraces, grid: i32, span_width: f64) -> Vec<Line> {
    let name = traces
        .data(0)
        .and_then(|segment| segment.name.clone())
        .unwrap_or_default();
    let hidden = || LineStyle::new().width(0.0).opacity(0.0);
    let series = |points: Vec<Vec<f64>>| {
        Line::new()
            .name(&name)
            .data(points)
            .symbol(Symbol::None)
            .x_axis_index(grid)
            .y_axis_index(grid)
    };

    let mut lines = Vec::new();
    for (i, shape) in profile_shapes(traces).into_iter().enumerate() {
        match shape {
            Shape::Stroke { color, points } => lines.push(
                series(points).line_style(LineStyle::new().width(3.0).color(Color::Value(color))),
            ),
            Shape::Area {
                color,
                base,
                extent,
            } => {
                let stack = format!("profile-{}-{}", grid, i);
                lines.push(series(base).stack(&stack).line_style(hidden()));
                lines.push(
                    series(extent)
                        .stack(&stack)
                        .line_style(hidden())
                        .area_style(
                            AreaStyle::new()
                                .color(Color::Value(color))
                                .opacity(FILL_OPACITY),
                        ),
                );
            }
            Shape::Span { color, from, to } => lines.push(
                series(vec![from.to_vec(), to.to_vec()]).line_style(
                    LineStyle::new()
                        .width(span_width)
                        .opacity(FILL_OPACITY)
                        .color(Color::Value(color)),
                ),
            ),
        }
    }
    lines
}

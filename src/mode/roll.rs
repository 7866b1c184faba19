//! Roll mode: banded profiles through a thickness field

use rollscale::chart::{self, RollChartData};
use rollscale::roll::RollField;
use rollscale::scale::{ColorRamp, FieldSeries, FillMode, SeriesKind};

use crate::output::{
    get_display_name, print_band_table, print_error, print_field_info, print_legend,
    print_limit_lines, print_occupancy, print_occupancy_header, print_ramp, print_separator,
    print_warning,
};

use super::{FieldSource, build_profiles, load_field};

/// Analyze one roll and optionally render its chart
pub fn run_roll(
    source: &FieldSource,
    ramp: &ColorRamp,
    fill_mode: FillMode,
    at: Option<(f64, f64)>,
    quiet: bool,
    image_path: Option<&str>,
) {
    let field = load_field(source).unwrap_or_else(|e| {
        print_error(&e);
        std::process::exit(1);
    });

    let name = match source {
        FieldSource::File(path) => get_display_name(path).to_string(),
        FieldSource::Synthetic { height, width, seed } => {
            format!("synthetic {}x{} (seed {})", height, width, seed)
        }
    };

    if let Some((x, y)) = at {
        let cd_last = field.cd_positions().last().copied().unwrap_or(0.0);
        let md_last = field.md_positions().last().copied().unwrap_or(0.0);
        if x > cd_last || y > md_last {
            print_warning(&format!(
                "--at {},{} is outside the roll, using the nearest edge",
                x, y
            ));
        }
    }

    let profiles = build_profiles(&field, ramp, fill_mode, at).unwrap_or_else(|e| {
        print_error(&e);
        std::process::exit(1);
    });

    if !quiet {
        print_field_info(&name, &field);
        print_ramp(ramp);
        print_band_table(ramp);
        print_limit_lines(ramp);
    }

    let (cd_index, md_index) = profiles.crosshair;
    println!(
        "[Band Occupancy] CD {} / MD {}",
        field.cd_positions()[cd_index],
        field.md_positions()[md_index]
    );
    print_occupancy_header(ramp, "          ");
    print_separator(10 + 6 * ramp.band_count());
    print_occupancy("CD profile", profiles.cd.values(), profiles.cd.range(), ramp);
    print_occupancy("MD profile", profiles.md.values(), profiles.md.range(), ramp);

    if !quiet {
        println!();
        print_legend();
    }

    if let Some(path) = image_path {
        let series = field_series(&field, ramp);
        let data = RollChartData {
            title: "Roll Thickness".to_string(),
            subtitle: name,
            field: &field,
            series: &series,
            ramp,
            cd_profile: &profiles.cd.traces,
            cd_range: profiles.cd.range(),
            md_profile: &profiles.md.traces,
            md_range: profiles.md.range(),
            crosshair: profiles.crosshair,
        };

        if let Err(e) = chart::render_roll_chart(&data, path) {
            print_error(&e);
        } else {
            eprintln!("Chart saved to: {}", path);
        }
    }
}

/// Heatmap series for the field, annotated with the ramp's range
fn field_series(field: &RollField, ramp: &ColorRamp) -> FieldSeries {
    let mut series = FieldSeries::new(SeriesKind::Heatmap, field.rows().to_vec());
    ramp.apply_range_to_series(Some(&mut series));
    series
}

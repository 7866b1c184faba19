use colored::*;
use rollscale::chart::parse_color;
use rollscale::roll::RollField;
use rollscale::scale::{AxisRange, ColorRamp};

fn style_label(label: &str) -> ColoredString {
    label.bold()
}

pub(crate) fn print_error(msg: &str) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

pub(crate) fn print_warning(msg: &str) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

/// Colored block for a band color, or the plain name if it can't be parsed
fn swatch(color: &str) -> ColoredString {
    match parse_color(color) {
        Some([r, g, b]) => "  ".on_truecolor(r, g, b),
        None => "  ".normal(),
    }
}

pub(crate) fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:>7.2}", value)
    } else {
        "      -".to_string()
    }
}

pub(crate) fn get_display_name(filename: &str) -> &str {
    std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
}

pub(crate) fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

pub(crate) fn print_field_info(display_name: &str, field: &RollField) {
    println!("Roll: {}", display_name);
    println!(
        "Size: {} MD x {} CD positions",
        field.height(),
        field.width()
    );
    if let Some((min, max)) = field.min_max() {
        println!("Values: {:.2} to {:.2}", min, max);
    }
    println!();
}

pub(crate) fn print_ramp(ramp: &ColorRamp) {
    println!(
        "Scale: {} bands, target {}, {}",
        ramp.band_count(),
        ramp.target(),
        if ramp.blended() { "blended" } else { "discrete" }
    );
    println!(
        "Color range: {} to {}",
        format_value(ramp.range_min()).trim(),
        format_value(ramp.range_max()).trim()
    );
    println!();
}

pub(crate) fn print_band_table(ramp: &ColorRamp) {
    println!("[Bands]");
    println!("BAND       FROM      TO  COLOR");
    print_separator(32);
    for i in 0..ramp.band_count() {
        if let Some(band) = ramp.band_info(i) {
            println!(
                "{:>4} {} {} {} {}",
                style_label(&i.to_string()),
                format_value(band.from),
                format_value(band.to),
                swatch(&band.color),
                band.color
            );
        }
    }
    println!();
}

pub(crate) fn print_limit_lines(ramp: &ColorRamp) {
    println!("[Limit Lines]");
    for i in 0..ramp.limit_line_count() {
        if let Some(line) = ramp.limit_line_info(i) {
            println!(
                "{:>4} {} {} {}",
                style_label(&i.to_string()),
                format_value(line.limit),
                swatch(&line.color),
                line.color
            );
        }
    }
    println!();
}

/// Points per band for a profile
pub(crate) fn print_occupancy(label: &str, values: &[f64], range: AxisRange, ramp: &ColorRamp) {
    let mut counts = vec![0usize; ramp.band_count()];
    for &v in values {
        counts[ramp.color_index_for(v)] += 1;
    }

    print!("{}", style_label(label));
    for count in &counts {
        print!(" {:>5}", count);
    }
    println!(
        "   axis {}..{}",
        format_value(range.min).trim(),
        format_value(range.max).trim()
    );
}

pub(crate) fn print_occupancy_header(ramp: &ColorRamp, prefix: &str) {
    print!("{}", prefix);
    for i in 0..ramp.band_count() {
        print!(" {:>5}", format!("B{}", i));
    }
    println!();
}

pub(crate) fn print_legend() {
    println!("Bands are half-open [FROM, TO); the outer bands extend past the padded range.");
    println!("Limit lines use the color outside each boundary; a middle boundary is not a limit.");
}

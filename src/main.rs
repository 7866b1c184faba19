mod mode;
mod output;

use std::str::FromStr;

use clap::Parser;

use mode::{FieldSource, Preset, ScaleOptions};
use output::print_error;
use rollscale::scale::FillMode;

#[derive(Parser)]
#[command(
    name = "rollscale",
    version,
    about = "Banded color scales and multi-color profiles for roll thickness data",
    after_help = "Examples:
  rollscale                                          Show the default 7-band scale
  rollscale roll.csv                                 Band occupancy of a measured roll
  rollscale --synthetic 40x120 --image roll.png      Chart a generated roll
  rollscale roll.csv --preset ndc3 --target 14       3-band scale with a custom target
  rollscale roll.csv --colors red,lime --boundaries 15 --fill tozero
  rollscale roll.csv --at 350,1200 --blended         Profiles through a point, blended scale"
)]
struct Args {
    /// Roll data file (CSV: one row per MD position, one column per CD position)
    input: Option<String>,

    /// Generate a synthetic roll instead of reading a file
    #[arg(long, value_name = "ROWSxCOLS", conflicts_with = "input")]
    synthetic: Option<String>,

    /// Seed for --synthetic
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Built-in scale (ndc3, ndc7)
    #[arg(short, long, value_name = "NAME")]
    preset: Option<String>,

    /// Band colors, lowest band first (comma separated)
    #[arg(short, long, value_delimiter = ',', value_name = "COLORS")]
    colors: Option<Vec<String>>,

    /// Band boundaries (comma separated, one fewer than colors)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        value_name = "VALUES"
    )]
    boundaries: Option<Vec<f64>>,

    /// Target value (defaults to the middle boundary)
    #[arg(short, long, allow_hyphen_values = true)]
    target: Option<f64>,

    /// Blend colors smoothly through the target instead of hard bands
    #[arg(long)]
    blended: bool,

    /// Profile fill (totarget, toaverage, tozero, none)
    #[arg(short, long, default_value = "totarget", value_name = "MODE")]
    fill: String,

    /// Crosshair position as CD,MD coordinates
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
    at: Option<String>,

    /// Output roll chart as PNG image
    #[arg(long, value_name = "PATH")]
    image: Option<String>,

    /// Suppress explanations (show data only)
    #[arg(short, long)]
    quiet: bool,

    /// Log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn fail(msg: &str) -> ! {
    print_error(msg);
    std::process::exit(1);
}

/// Parse `ROWSxCOLS`
fn parse_size(text: &str) -> Option<(usize, usize)> {
    let (rows, cols) = text.to_ascii_lowercase().split_once('x').map(|(r, c)| {
        (r.trim().parse::<usize>().ok(), c.trim().parse::<usize>().ok())
    })?;
    match (rows?, cols?) {
        (0, _) | (_, 0) => None,
        size => Some(size),
    }
}

/// Parse `X,Y`
fn parse_point(text: &str) -> Option<(f64, f64)> {
    let (x, y) = text.split_once(',')?;
    let x = x.trim().parse::<f64>().ok()?;
    let y = y.trim().parse::<f64>().ok()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

fn main() {
    let args = Args::parse();

    // Handle --no-color
    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = stderrlog::new()
        .module(module_path!())
        .quiet(args.quiet)
        .verbosity(args.verbose as usize)
        .init()
    {
        eprintln!("Logger setup failed: {}", e);
    }

    // Validate scale options
    let preset = args.preset.as_deref().map(|name| {
        Preset::parse(name).unwrap_or_else(|| fail(&format!("Unknown preset: {}", name)))
    });

    let fill_mode = FillMode::from_str(&args.fill).unwrap_or_else(|e| fail(&e));

    if let Some(target) = args.target
        && !target.is_finite()
    {
        fail("Target must be a finite number");
    }

    let scale = ScaleOptions {
        preset,
        colors: args.colors,
        boundaries: args.boundaries,
        target: args.target,
        blended: args.blended,
    };

    let ramp = mode::build_ramp(&scale).unwrap_or_else(|e| fail(&e));

    // Validate roll options
    let source = match (args.input, args.synthetic) {
        (Some(path), _) => Some(FieldSource::File(path)),
        (None, Some(size)) => {
            let (height, width) = parse_size(&size).unwrap_or_else(|| {
                fail(&format!("Invalid --synthetic size '{}' (expected ROWSxCOLS)", size))
            });
            Some(FieldSource::Synthetic {
                height,
                width,
                seed: args.seed,
            })
        }
        (None, None) => None,
    };

    let at = args.at.as_deref().map(|text| {
        parse_point(text)
            .unwrap_or_else(|| fail(&format!("Invalid --at '{}' (expected X,Y)", text)))
    });

    if source.is_none() && (at.is_some() || args.image.is_some()) {
        fail("--at and --image need a roll (INPUT or --synthetic)");
    }

    if source.is_none() && fill_mode != FillMode::default() {
        fail("--fill needs a roll (INPUT or --synthetic)");
    }

    // Validate image output path
    if let Some(ref path) = args.image {
        use std::path::Path;
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fail(&format!("Directory does not exist: {}", parent.display()));
        }
    }

    // Dispatch to appropriate mode
    match source {
        Some(source) => mode::run_roll(
            &source,
            &ramp,
            fill_mode,
            at,
            args.quiet,
            args.image.as_deref(),
        ),
        None => mode::run_bands(&ramp, args.quiet),
    }
}

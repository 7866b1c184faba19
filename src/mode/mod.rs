//! CLI mode implementations

mod bands;
mod roll;

pub use bands::run_bands;
pub use roll::run_roll;

use rollscale::roll::RollField;
use rollscale::scale::{
    AxisRange, BandTraces, BandedTraceBuilder, ColorRamp, FillMode, ScaleResult, TraceInput,
};

/// Built-in color scales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Ndc3,
    Ndc7,
}

impl Preset {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ndc3" => Some(Self::Ndc3),
            "ndc7" => Some(Self::Ndc7),
            _ => None,
        }
    }
}

/// Scale options collected from the command line
pub struct ScaleOptions {
    pub preset: Option<Preset>,
    pub colors: Option<Vec<String>>,
    pub boundaries: Option<Vec<f64>>,
    pub target: Option<f64>,
    pub blended: bool,
}

/// Where the roll field comes from
pub enum FieldSource {
    File(String),
    Synthetic {
        height: usize,
        width: usize,
        seed: u64,
    },
}

/// Build the color ramp
///
/// Custom colors without a preset need explicit boundaries; with a preset
/// they replace the preset colors. No options at all means the 7-band preset.
pub fn build_ramp(options: &ScaleOptions) -> Result<ColorRamp, String> {
    let boundaries = options.boundaries.as_deref();

    let ramp = match (options.preset, &options.colors) {
        (None, Some(colors)) => {
            let boundaries =
                boundaries.ok_or_else(|| "--colors requires --boundaries or --preset".to_string())?;
            ColorRamp::new(colors.iter().cloned(), boundaries, options.target, options.blended)
        }
        (Some(Preset::Ndc3), colors) => {
            ColorRamp::ndc3(boundaries, options.target, options.blended)
                .and_then(|ramp| with_colors(ramp, colors.as_deref()))
        }
        (Some(Preset::Ndc7) | None, colors) => {
            ColorRamp::ndc7(boundaries, options.target, options.blended)
                .and_then(|ramp| with_colors(ramp, colors.as_deref()))
        }
    };

    ramp.map_err(|e| format!("Invalid color scale: {}", e))
}

fn with_colors(mut ramp: ColorRamp, colors: Option<&[String]>) -> ScaleResult<ColorRamp> {
    if colors.is_some() {
        ramp.set_colors(colors)?;
    }
    Ok(ramp)
}

pub fn load_field(source: &FieldSource) -> Result<RollField, String> {
    match source {
        FieldSource::File(path) => RollField::load_csv(path),
        FieldSource::Synthetic {
            height,
            width,
            seed,
        } => RollField::synthetic(*height, *width, *seed),
    }
}

/// One banded profile and the input it was built from
pub struct Profile {
    pub input: TraceInput,
    pub traces: BandTraces,
}

impl Profile {
    pub fn values(&self) -> &[f64] {
        self.input.y.as_deref().unwrap_or(&[])
    }

    pub fn range(&self) -> AxisRange {
        self.input.range.unwrap_or(AxisRange { min: 0.0, max: 0.0 })
    }
}

/// CD and MD profiles through the crosshair
pub struct Profiles {
    pub cd: Profile,
    pub md: Profile,
    pub crosshair: (usize, usize),
}

/// Build both profiles at the field origin, then move them to the crosshair
///
/// Moving reuses the trace containers, the same way an interactive view
/// updates its profiles when the pointer moves.
pub fn build_profiles(
    field: &RollField,
    ramp: &ColorRamp,
    fill_mode: FillMode,
    at: Option<(f64, f64)>,
) -> Result<Profiles, String> {
    let builder = BandedTraceBuilder::new(ramp);

    let mut cd = profile_input(field, 0, 0, fill_mode, false)?;
    let mut md = profile_input(field, 0, 0, fill_mode, true)?;
    let mut cd_traces = builder.build(&mut cd).map_err(|e| e.to_string())?;
    let mut md_traces = builder.build(&mut md).map_err(|e| e.to_string())?;

    let mut crosshair = (0, 0);
    if let Some((x, y)) = at {
        crosshair = (field.cd_index_at(x), field.md_index_at(y));
        log::debug!("Crosshair at CD index {}, MD index {}", crosshair.0, crosshair.1);

        cd = profile_input(field, crosshair.0, crosshair.1, fill_mode, false)?;
        md = profile_input(field, crosshair.0, crosshair.1, fill_mode, true)?;
        builder
            .rebuild(&mut cd, &mut cd_traces)
            .map_err(|e| e.to_string())?;
        builder
            .rebuild(&mut md, &mut md_traces)
            .map_err(|e| e.to_string())?;
    }

    Ok(Profiles {
        cd: Profile {
            input: cd,
            traces: cd_traces,
        },
        md: Profile {
            input: md,
            traces: md_traces,
        },
        crosshair,
    })
}

fn profile_input(
    field: &RollField,
    cd_index: usize,
    md_index: usize,
    fill_mode: FillMode,
    along: bool,
) -> Result<TraceInput, String> {
    let input = if along {
        let values = field
            .column(cd_index)
            .ok_or_else(|| format!("CD index {} out of range", cd_index))?;
        TraceInput::new(values)
            .with_x(field.md_positions().to_vec())
            .transposed(true)
            .with_name("MD profile")
    } else {
        let values = field
            .row(md_index)
            .ok_or_else(|| format!("MD index {} out of range", md_index))?;
        TraceInput::new(values.to_vec())
            .with_x(field.cd_positions().to_vec())
            .with_name("CD profile")
    };
    Ok(input.with_fill_mode(fill_mode))
}

//! Roll measurement fields: loading, synthesis and profile extraction

use std::fs::File;
use std::io;
use std::path::Path;

/// Spacing of cross-direction positions when none are given
pub const CD_SPACING: f64 = 10.0;
/// Spacing of machine-direction positions when none are given
pub const MD_SPACING: f64 = 100.0;

/// Rectangular scalar field, one row per machine-direction position
#[derive(Debug, Clone, PartialEq)]
pub struct RollField {
    rows: Vec<Vec<f64>>,
    cd_positions: Vec<f64>,
    md_positions: Vec<f64>,
}

impl RollField {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, String> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err("Roll data is empty".to_string());
        }
        if let Some(i) = rows.iter().position(|r| r.len() != width) {
            return Err(format!(
                "Row {} has {} values, expected {}",
                i + 1,
                rows[i].len(),
                width
            ));
        }

        let cd_positions = (0..width).map(|i| i as f64 * CD_SPACING).collect();
        let md_positions = (0..rows.len()).map(|i| i as f64 * MD_SPACING).collect();
        Ok(Self {
            rows,
            cd_positions,
            md_positions,
        })
    }

    /// Deterministic thickness field around 15 with CD waviness, MD drift
    /// and a little noise
    pub fn synthetic(height: usize, width: usize, seed: u64) -> Result<Self, String> {
        let rows = (0..height)
            .map(|row| {
                let drift = 3.0 * (row as f64 / height.max(1) as f64 - 0.5);
                (0..width)
                    .map(|col| {
                        let t = col as f64 / width.max(1) as f64;
                        let wave = 4.0 * (t * std::f64::consts::TAU * 2.0).sin();
                        let edge = if t < 0.05 || t > 0.95 { -6.0 } else { 0.0 };
                        let noise = cell_noise(seed, row, col) - 0.5;
                        15.0 + wave + drift + edge + noise
                    })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// Load a field from a CSV file: one row per MD position, no header.
    /// Lines starting with `#` are comments; fields may be quoted.
    pub fn load_csv(path: &str) -> Result<Self, String> {
        let file = File::open(path).map_err(|e| format!("Error opening file: {}", e))?;
        Self::read_csv(file)
    }

    pub fn parse_csv(text: &str) -> Result<Self, String> {
        Self::read_csv(text.as_bytes())
    }

    fn read_csv<R: io::Read>(source: R) -> Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| format!("Invalid CSV: {}", e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row = record
                .iter()
                .map(|field| {
                    field
                        .parse::<f64>()
                        .map_err(|_| format!("Line {}: invalid number '{}'", line, field))
                })
                .collect::<Result<Vec<f64>, String>>()?;
            rows.push(row);
        }
        Self::new(rows)
    }

    /// Write the field as CSV, three decimals per value
    pub fn write_csv<W: io::Write>(&self, sink: W) -> Result<(), String> {
        let mut writer = csv::Writer::from_writer(sink);
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|v| format!("{:.3}", v)))
                .map_err(|e| format!("Failed to write CSV: {}", e))?;
        }
        writer
            .flush()
            .map_err(|e| format!("Failed to write CSV: {}", e))
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), String> {
        let file = File::create(path)
            .map_err(|e| format!("Error creating {}: {}", path.display(), e))?;
        self.write_csv(file)
    }

    pub fn width(&self) -> usize {
        self.cd_positions.len()
    }

    pub fn height(&self) -> usize {
        self.md_positions.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn cd_positions(&self) -> &[f64] {
        &self.cd_positions
    }

    pub fn md_positions(&self) -> &[f64] {
        &self.md_positions
    }

    /// CD profile at machine-direction index `md`
    pub fn row(&self, md: usize) -> Option<&[f64]> {
        self.rows.get(md).map(Vec::as_slice)
    }

    /// MD profile at cross-direction index `cd`
    pub fn column(&self, cd: usize) -> Option<Vec<f64>> {
        if cd >= self.width() {
            return None;
        }
        Some(self.rows.iter().map(|r| r[cd]).collect())
    }

    /// Field with rows and columns swapped
    pub fn transposed(&self) -> Vec<Vec<f64>> {
        (0..self.width())
            .map(|cd| self.rows.iter().map(|r| r[cd]).collect())
            .collect()
    }

    /// Smallest and largest finite value
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Index of the first CD position at or past `x`
    pub fn cd_index_at(&self, x: f64) -> usize {
        index_at(&self.cd_positions, x)
    }

    /// Index of the first MD position at or past `y`
    pub fn md_index_at(&self, y: f64) -> usize {
        index_at(&self.md_positions, y)
    }
}

fn index_at(positions: &[f64], value: f64) -> usize {
    positions
        .iter()
        .position(|&p| p >= value)
        .unwrap_or(positions.len().saturating_sub(1))
}

/// Uniform value in `[0, 1)` for one cell, hashed from the seed and position
fn cell_noise(seed: u64, row: usize, col: usize) -> f64 {
    let mut z = seed
        .wrapping_add((row as u64) << 32 | col as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

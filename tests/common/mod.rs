//! Common test utilities

use std::path::Path;

use rollscale::roll::RollField;

/// Roll with every value equal
pub fn generate_flat(height: usize, width: usize, value: f64) -> Vec<Vec<f64>> {
    vec![vec![value; width]; height]
}

/// Roll whose CD profile steps through the given values, same on every row
pub fn generate_stripes(height: usize, values: &[f64]) -> Vec<Vec<f64>> {
    vec![values.to_vec(); height]
}

/// Wavy, noisy roll around 15
pub fn generate_wavy(height: usize, width: usize, seed: u64) -> Vec<Vec<f64>> {
    RollField::synthetic(height, width, seed)
        .map(|field| field.rows().to_vec())
        .unwrap_or_default()
}

/// Write rows as a CSV file with every field quoted
pub fn write_csv(path: &Path, rows: &[Vec<f64>]) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .flexible(true)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

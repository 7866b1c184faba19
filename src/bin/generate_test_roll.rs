use std::fs;
use std::path::Path;

use rollscale::roll::RollField;

/// Flat roll at one thickness
fn flat(height: usize, width: usize, value: f64) -> Vec<Vec<f64>> {
    vec![vec![value; width]; height]
}

/// One band per CD stripe of the 7-band preset (9 to 21 in steps of 2)
fn stripes(height: usize) -> Vec<Vec<f64>> {
    let row: Vec<f64> = (0..7).map(|band| 9.0 + 2.0 * band as f64).collect();
    vec![row; height]
}

/// Thickness ramping along MD from 8 to 22
fn md_ramp(height: usize, width: usize) -> Vec<Vec<f64>> {
    (0..height)
        .map(|row| {
            let value = 8.0 + 14.0 * row as f64 / (height.max(2) - 1) as f64;
            vec![value; width]
        })
        .collect()
}

fn write(dir: &Path, name: &str, rows: Vec<Vec<f64>>) -> Result<(), String> {
    RollField::new(rows)?.save_csv(&dir.join(name))
}

fn main() -> Result<(), String> {
    let dir = Path::new("test_data");
    fs::create_dir_all(dir).map_err(|e| e.to_string())?;

    // Every value on target: all points in the middle band of ndc3
    write(dir, "flat_15.csv", flat(5, 20, 15.0))?;

    // Each CD position in a different ndc7 band
    write(dir, "stripes.csv", stripes(4))?;

    // MD profile crosses every boundary once
    write(dir, "md_ramp.csv", md_ramp(15, 6))?;

    // Realistic roll with waviness, drift and noise
    let wavy = RollField::synthetic(40, 120, 42)?;
    wavy.save_csv(&dir.join("wavy.csv"))?;

    println!("Generated: flat_15.csv, stripes.csv, md_ramp.csv, wavy.csv");
    Ok(())
}

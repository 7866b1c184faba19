//! Scale-only mode: describe the color bands without a roll

use rollscale::scale::ColorRamp;

use crate::output::{print_band_table, print_legend, print_limit_lines, print_ramp};

/// Print the band layout of a color scale
pub fn run_bands(ramp: &ColorRamp, quiet: bool) {
    if !quiet {
        println!("Color Scale");
        print_ramp(ramp);
    }

    print_band_table(ramp);
    print_limit_lines(ramp);

    if !quiet {
        print_legend();
    }
}

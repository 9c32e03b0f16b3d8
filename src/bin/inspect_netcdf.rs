//! Print the dimensions, variables and attributes of a NetCDF file.
//!
//! Handy for eyeballing interpolated outputs and the inputs they came from.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use wrfinterp::interpolation::FILL_VALUE;

#[derive(Parser, Debug)]
#[command(name = "inspect_netcdf", about = "Describe a NetCDF file")]
struct Args {
    /// File to inspect
    path: PathBuf,

    /// Also print the range of every numeric variable
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let file = netcdf::open(&args.path)
        .with_context(|| format!("Opening {}", args.path.display()))?;

    println!("Inspecting NetCDF file: {}", args.path.display());

    println!("\nDimensions:");
    for dim in file.dimensions() {
        println!(
            "  {} = {} {}",
            dim.name(),
            dim.len(),
            if dim.is_unlimited() { "(unlimited)" } else { "" }
        );
    }

    println!("\nVariables:");
    for var in file.variables() {
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| format!("{} = {}", d.name(), d.len()))
            .collect();
        println!("  {} ({:?}) [{}]", var.name(), var.vartype(), dims.join(", "));

        for attr in var.attributes() {
            match attr.value() {
                Ok(val) => println!("    {}: {:?}", attr.name(), val),
                Err(e) => println!("    {}: error reading value: {}", attr.name(), e),
            }
        }

        if args.stats {
            match var.get_values::<f64, _>(..) {
                Ok(values) => {
                    let present: Vec<f64> = values
                        .into_iter()
                        .filter(|v| v.is_finite() && *v != FILL_VALUE)
                        .collect();
                    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    if present.is_empty() {
                        println!("    no present values");
                    } else {
                        println!("    {} present values in [{}, {}]", present.len(), min, max);
                    }
                }
                Err(_) => println!("    not numeric"),
            }
        }
    }

    println!("\nGlobal Attributes:");
    for attr in file.attributes() {
        match attr.value() {
            Ok(val) => println!("  {}: {:?}", attr.name(), val),
            Err(e) => println!("  {}: error reading value: {}", attr.name(), e),
        }
    }

    Ok(())
}

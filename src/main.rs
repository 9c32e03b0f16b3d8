//! wrfinterp - interpolate RAP and GridRad analyses onto WRF grids
//!
//! Command-line entry point; each subcommand runs one library job.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use wrfinterp::config::{Cli, Command};
use wrfinterp::gridrad::{horiz_interp_and_store_gridrad, reflectivity_to_event_grid};
use wrfinterp::gridrad::ReflectivityStore;
use wrfinterp::plotting::{plot_interp_refl_rbox, plot_rap_interp};
use wrfinterp::rap::{interp_rap_to_wrf, AnalysisSource, LocalAnalysis, RemoteRapSource};
use wrfinterp::{init_tracing, log_error, log_timed_operation, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli).context("Failed to load configuration")?;
    init_tracing(&config.log_level);

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!("Starting wrfinterp v{}", env!("CARGO_PKG_VERSION"));

    let operation = command_name(&cli.command);
    if let Err(e) = log_timed_operation(operation, || run(cli.command, &config)) {
        if let Some(inner) = e.downcast_ref::<wrfinterp::WrfInterpError>() {
            log_error(inner, "command failed");
        }
        return Err(e);
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Rap { .. } => "rap",
        Command::PlotRap { .. } => "plot-rap",
        Command::Gridrad { .. } => "gridrad",
        Command::EventGrid { .. } => "event-grid",
        Command::PlotRefl { .. } => "plot-refl",
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    let output_dir = &config.output.directory;

    match command {
        Command::Rap {
            time,
            wrfref,
            local,
        } => {
            let source: Box<dyn AnalysisSource> = match local {
                Some(path) => Box::new(LocalAnalysis::new(path)),
                None => Box::new(RemoteRapSource::new(&config.rap)?),
            };
            let path = interp_rap_to_wrf(source.as_ref(), time, &wrfref, output_dir)
                .with_context(|| format!("RAP interpolation for {} failed", time))?;
            info!("Wrote {}", path.display());
        }
        Command::PlotRap { rapfile, var } => {
            let path = plot_rap_interp(&rapfile, &var, output_dir, &config.plot)
                .with_context(|| format!("Plotting {} from {} failed", var, rapfile.display()))?;
            info!("Wrote {}", path.display());
        }
        Command::Gridrad {
            gridrad_file,
            interpto_file,
            out_file,
            zlev,
        } => {
            let summary =
                horiz_interp_and_store_gridrad(&gridrad_file, &interpto_file, &out_file, zlev)
                    .with_context(|| {
                        format!("GridRad interpolation of {} failed", gridrad_file.display())
                    })?;
            info!(
                index = summary.index,
                valid = %summary.valid,
                "Appended to {}",
                out_file.display()
            );
        }
        Command::EventGrid {
            init,
            rtime,
            six_hour,
            threshold,
            out_file,
            files,
        } => {
            let grid = ReflectivityStore::read_entries(&files[0])
                .with_context(|| format!("Reading grid from {}", files[0].display()))?
                .grid;
            let events =
                reflectivity_to_event_grid(&files, init, six_hour, rtime, threshold, grid.shape())?;
            events
                .write(&out_file, &grid)
                .with_context(|| format!("Writing {}", out_file.display()))?;
            info!(
                hits = events.hit_count(),
                "Wrote event grid to {}",
                out_file.display()
            );
        }
        Command::PlotRefl {
            gridrad_interpfile,
            rboxpath,
            analysis_time,
        } => {
            let paths = plot_interp_refl_rbox(
                &gridrad_interpfile,
                &rboxpath,
                analysis_time,
                output_dir,
                &config.plot,
            )
            .with_context(|| format!("Plotting {} failed", gridrad_interpfile.display()))?;
            info!("Wrote {} images", paths.len());
        }
    }
    Ok(())
}

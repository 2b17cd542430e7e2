/////////////////////////////////////////////////////////////////////////////////////////////
//
// Command-line entry point converting bed probing logs into RepRapFirmware heightmaps.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Converts probing records from irregular x/y coordinate locations into a
//! heightmap.csv file that RepRapFirmware can use. The primary use is moving
//! probing points away from magnets in magnetic beds: an RBF surface is
//! fitted through the probed points and sampled on the regular grid the
//! firmware expects.

use bedmesh_rbf::progress::{closure_sink, ProgressMsg};
use bedmesh_rbf::{aggregate, select_resolution, GridSpec, InterpolationError, RbfInterpolator};
use chrono::Local;
use clap::Parser;
use std::{error::Error, fmt, io, process::ExitCode};

mod dsf;
mod heightmap;
mod probe_log;

#[derive(Parser, Debug)]
#[command(
    name = "mesh-level",
    about = "Process a bed probing log and generate a heightmap.csv"
)]
struct Args {
    /// Minimum and maximum X coordinates of the final reported grid,
    /// separated by ':'. E.g. -X -10:200. This is required.
    #[arg(short = 'X', long, value_name = "X_EXTENTS", allow_hyphen_values = true, value_parser = parse_colon_pair)]
    x_extents: (i64, i64),

    /// Minimum and maximum Y coordinates of the final reported grid,
    /// separated by ':'. E.g. -Y 3:305. This is required.
    #[arg(short = 'Y', long, value_name = "Y_EXTENTS", allow_hyphen_values = true, value_parser = parse_colon_pair)]
    y_extents: (i64, i64),

    /// The path to the probed points log file.
    #[arg(
        short = 'L',
        long,
        value_name = "POINTS_FILE",
        default_value = "meshbedprobe.log"
    )]
    probe_log_file: String,

    /// The path to save the heightmap.
    #[arg(
        short = 'H',
        long,
        value_name = "MESH_FILE",
        default_value = "heightmap.csv"
    )]
    heightmap_file: String,

    /// Number of evenly spaced points to sample in the X and Y axis
    /// directions, separated by ':'. E.g. -P 21:21. Optional, --max-points is
    /// used if this is omitted.
    #[arg(short = 'P', long, value_name = "NUM_POINTS", value_parser = parse_colon_pair)]
    num_points: Option<(i64, i64)>,

    /// The maximum number of points that can be sampled in the heightmap
    /// file. The optimal sample point spacing is determined from this value
    /// if --num-points is omitted.
    #[arg(short = 'M', long, value_name = "MAX_POINTS", default_value_t = 441)]
    max_points: usize,

    /// Enable DSF path compatibility mode. Treats file paths as M98 would in
    /// RRF, assuming the working directory is the root of the virtual SD card.
    #[arg(long, alias = "dsf")]
    dsf_path_mode: bool,
}

/// Parses a `min:max` pair of integers, e.g. `-10:200`.
fn parse_colon_pair(arg: &str) -> Result<(i64, i64), String> {
    let invalid = || format!("expected two integers separated by ':', got '{arg}'");

    let (first, second) = arg.split_once(':').ok_or_else(invalid)?;

    let first = first.parse::<i64>().map_err(|_| invalid())?;
    let second = second.parse::<i64>().map_err(|_| invalid())?;

    Ok((first, second))
}

/// Errors fatal to a conversion run. This is a one-shot batch tool: nothing
/// is retried, and every failure is reported to the invoker.
#[derive(Debug)]
enum CliError {
    /// Arguments parsed but describe an unusable configuration.
    Config { message: String },

    /// The probe log is missing or unreadable.
    Input { path: String, source: io::Error },

    /// The probed data cannot support a surface fit.
    Interpolation(InterpolationError),

    /// The heightmap destination is not writable.
    Output { path: String, source: io::Error },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config { message } => write!(f, "invalid configuration: {message}"),
            CliError::Input { path, source } => {
                write!(f, "cannot read probe log '{path}': {source}")
            }
            CliError::Interpolation(err) => write!(f, "{err}"),
            CliError::Output { path, source } => {
                write!(f, "cannot write heightmap '{path}': {source}")
            }
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Input { source, .. } | CliError::Output { source, .. } => Some(source),
            CliError::Interpolation(err) => Some(err),
            CliError::Config { .. } => None,
        }
    }
}

impl From<InterpolationError> for CliError {
    fn from(err: InterpolationError) -> Self {
        CliError::Interpolation(err)
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let (x_min, x_max) = args.x_extents;
    let (y_min, y_max) = args.y_extents;

    // If the number of points was unspecified, select the optimal values
    // from the point budget.
    let (x_count, y_count) = match args.num_points {
        Some((x, y)) => {
            let as_count = |value: i64| {
                usize::try_from(value).map_err(|_| CliError::Config {
                    message: format!("point counts must be non-negative, got {x}:{y}"),
                })
            };

            (as_count(x)?, as_count(y)?)
        }
        None => select_resolution(
            (x_max - x_min) as f64,
            (y_max - y_min) as f64,
            args.max_points,
        ),
    };

    let grid = GridSpec::new(
        x_min as f64,
        x_max as f64,
        y_min as f64,
        y_max as f64,
        x_count,
        y_count,
    )
    .map_err(|err| CliError::Config {
        message: err.to_string(),
    })?;

    let probe_log_path = dsf::dsf_path(&args.probe_log_file, args.dsf_path_mode);
    let heightmap_path = dsf::dsf_path(&args.heightmap_file, args.dsf_path_mode);

    let samples = probe_log::read_probe_log(&probe_log_path).map_err(|source| CliError::Input {
        path: probe_log_path.clone(),
        source,
    })?;

    let points = aggregate(&samples);

    let (sink, listener) = closure_sink(64, |msg: ProgressMsg| match msg {
        ProgressMsg::DuplicatesMerged { num_merged } => {
            eprintln!("merged {num_merged} repeated probe(s) of already probed coordinates")
        }
        ProgressMsg::IllConditionedSystem { rank, size } => eprintln!(
            "warning: probe layout gives an ill-conditioned system \
             (rank {rank} of {size}); falling back to a least-squares fit"
        ),
        ProgressMsg::Message { message } => eprintln!("{message}"),
    });

    let num_merged = samples.len() - points.len();
    if num_merged > 0 {
        sink.emit(ProgressMsg::DuplicatesMerged { num_merged });
    }

    let surface = RbfInterpolator::builder(points.coords(), points.heights())
        .progress_callback(sink.clone())
        .build()?;

    let heights = surface.evaluate_grid(&grid);

    // Close the progress channel and drain any pending warnings before the
    // output is produced.
    drop(surface);
    drop(sink);
    let _ = listener.join();

    let rendered = heightmap::render(&heights, Local::now().naive_local());

    heightmap::write_heightmap(&heightmap_path, &rendered).map_err(|source| CliError::Output {
        path: heightmap_path.clone(),
        source,
    })?;

    // Echo the generated file so the invoker sees what was written.
    print!("{rendered}");

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mesh-level: {err}");
            ExitCode::FAILURE
        }
    }
}

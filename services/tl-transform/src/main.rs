//! Tidally-locked coordinate transform.
//!
//! Reads a lat/lon state document, regrids it so the substellar point is the
//! north pole, prints global means in both frames and writes the result.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use grid_processor::TransformConfig;
use tl_common::MeanMode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tl_transform::{format_means, run, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "tl-transform")]
#[command(about = "Regrid a lat/lon state into tidally-locked coordinates")]
struct Args {
    /// Input state document (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output state document (JSON)
    #[arg(short, long)]
    output: PathBuf,

    /// Target latitude count (default: source resolution)
    #[arg(long, env = "TL_NLAT")]
    nlat: Option<usize>,

    /// Target longitude count (default: source resolution)
    #[arg(long, env = "TL_NLON")]
    nlon: Option<usize>,

    /// Substellar longitude in degrees
    #[arg(long, env = "TL_LON_SS", allow_negative_numbers = true)]
    lon_ss: Option<f64>,

    /// Comma-separated variables to transform (default: all)
    #[arg(long, value_delimiter = ',')]
    vars: Option<Vec<String>>,

    /// Skip the wind pair
    #[arg(long)]
    no_vel: bool,

    /// Average over the last N time steps before regridding
    #[arg(long)]
    time_mean_last: Option<usize>,

    /// Reduction for tidally-locked global means (strict, nan_aware)
    #[arg(long, env = "TL_MEAN_MODE")]
    mean_mode: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Environment first, then command-line overrides
    let mut config = TransformConfig::from_env();
    if let Some(lon_ss) = args.lon_ss {
        config.lon_ss = lon_ss;
    }
    if args.nlat.is_some() {
        config.nlat = args.nlat;
    }
    if args.nlon.is_some() {
        config.nlon = args.nlon;
    }
    if args.no_vel {
        config.do_vel = false;
    }
    if let Some(mode) = &args.mean_mode {
        config.tl_mean_mode = MeanMode::from_str(mode);
    }

    info!(?config, "Starting tidally-locked transform");

    let report = run(&RunOptions {
        input: args.input,
        output: args.output,
        vars: args.vars,
        time_mean_last: args.time_mean_last,
        config,
    })?;

    print!("{}", format_means(&report.means));
    info!(
        output = %report.output.display(),
        target_shape = ?report.target_shape,
        "Transform complete"
    );

    Ok(())
}

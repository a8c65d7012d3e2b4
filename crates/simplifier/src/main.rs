use std::io;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser, ValueHint};
use gpx_simplifier::{
    OutputFormat, SimplifyConfig, config::DEFAULT_OUTPUT, resampler::DEFAULT_INTERVAL_M, run,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(
    name = "gpx-simplifier",
    version,
    about = "Resample a GPS track into fixed-distance rows with pace"
)]
struct Cli {
    /// GPX, TCX, or FIT file to read
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output path (`-` for stdout)
    #[arg(
        short,
        long = "out",
        visible_alias = "output",
        env = "GPX_SIMPLIFIER_OUT",
        default_value = DEFAULT_OUTPUT,
        value_hint = ValueHint::FilePath
    )]
    out: PathBuf,

    /// Distance interval in meters between output rows
    #[arg(
        long,
        env = "GPX_SIMPLIFIER_INTERVAL",
        default_value_t = DEFAULT_INTERVAL_M,
        value_parser = parse_interval
    )]
    interval: f64,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn parse_interval(s: &str) -> Result<f64, String> {
    let meters: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if !meters.is_finite() || meters <= 0.0 {
        return Err(format!("interval must be a positive number of meters, got {s}"));
    }
    Ok(meters)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SimplifyConfig::new(&cli.input)
        .with_output(&cli.out)
        .with_interval(cli.interval)
        .with_format(cli.format);

    run(&config).with_context(|| format!("failed to simplify {}", cli.input.display()))?;

    if config.output != PathBuf::from("-") {
        println!("Output written to {}", config.output.display());
    }
    Ok(())
}

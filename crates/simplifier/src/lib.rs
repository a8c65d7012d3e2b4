//! Distance-sampled summaries of recorded GPS activities.
//!
//! A run reads a track file, walks its points through a [`Resampler`] that
//! emits one row per fixed distance travelled, and writes those rows to a
//! report sink:
//!
//! ```rust,ignore
//! use gpx_simplifier::{SimplifyConfig, run};
//!
//! let config = SimplifyConfig::new("morning_run.gpx").with_interval(500.0);
//! let outcome = run(&config)?;
//! println!("{} rows", outcome.records_written);
//! ```

pub mod config;
pub mod errors;
pub mod file_parsers;
pub mod geodistance;
pub mod models;
pub mod report;
pub mod resampler;
pub mod summary;

use tracing::info;

pub use crate::{
    config::SimplifyConfig,
    errors::{AppError, ConfigError},
    models::{OutputRecord, Track, TrackPoint, TrackSegment},
    report::{OutputFormat, ReportSink},
    resampler::{ResampleExt, Resampler},
    summary::TrackSummary,
};

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub records_written: usize,
    pub total_distance_m: f64,
    pub summary: TrackSummary,
}

/// Resamples `track` into `sink`, returning the number of records written
/// and the cumulative distance of the whole track.
pub fn simplify_track(
    track: &Track,
    interval_m: f64,
    sink: &mut dyn ReportSink,
) -> Result<(usize, f64), AppError> {
    let mut records = track.points().resample(Resampler::new(interval_m)?);
    let mut written = 0;

    for record in records.by_ref() {
        sink.write_record(&record)?;
        written += 1;
    }
    sink.finish()?;

    Ok((written, records.resampler().total_distance()))
}

/// Runs the whole pipeline described by `config`.
///
/// The input is fully parsed before the output is created, so a bad input
/// leaves no report behind.
pub fn run(config: &SimplifyConfig) -> Result<RunOutcome, AppError> {
    config.validate()?;

    let track = file_parsers::read_track(&config.input)?;
    let summary = summary::summarize(&track);
    info!(
        input = %config.input.display(),
        segments = summary.segments,
        points = summary.points,
        "Loaded track"
    );

    let mut sink = report::create_sink(&config.output, config.format)?;
    let (records_written, total_distance_m) =
        simplify_track(&track, config.interval_m, sink.as_mut())?;

    info!(
        records = records_written,
        distance_m = total_distance_m,
        duration_s = summary.duration_s,
        elevation_gain_m = summary.elevation_gain_m,
        avg_heart_rate = ?summary.avg_heart_rate,
        max_heart_rate = ?summary.max_heart_rate,
        "Track simplified"
    );

    Ok(RunOutcome {
        records_written,
        total_distance_m,
        summary,
    })
}

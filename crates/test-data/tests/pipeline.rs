//! End-to-end tests: synthetic GPX on disk through to the written report.
//!
//! Each test writes into its own file names under the system temp directory
//! and removes them afterwards.

use std::path::PathBuf;

use gpx_simplifier::{
    AppError, OutputFormat, ResampleExt, Resampler, SimplifyConfig, file_parsers, run,
};
use test_data::prelude::*;
use time::{Duration, macros::datetime};

struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    fn new(test_id: &str, names: &[&str]) -> Self {
        let paths = names
            .iter()
            .map(|name| std::env::temp_dir().join(format!("gpx-simplifier-{test_id}-{name}")))
            .collect::<Vec<_>>();
        for path in &paths {
            let _ = std::fs::remove_file(path);
        }
        Self { paths }
    }

    fn path(&self, i: usize) -> &PathBuf {
        &self.paths[i]
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn read_csv(path: &PathBuf) -> (Vec<String>, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open report");
    let header = reader
        .headers()
        .expect("Missing header")
        .iter()
        .map(String::from)
        .collect();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("Malformed report row");
    (header, rows)
}

#[test]
fn test_runner_track_to_csv() {
    let files = TempFiles::new("runner", &["track.gpx", "report.csv"]);
    let track = ProceduralGenerator::new(2024)
        .with_distance(5000.0)
        .with_segments(3)
        .generate(&RunnerProfile::default());
    write_gpx_file(files.path(0), &track, "Tempo Run").unwrap();

    let config = SimplifyConfig::new(files.path(0)).with_output(files.path(1));
    let outcome = run(&config).unwrap();

    let (header, rows) = read_csv(files.path(1));
    assert_eq!(
        header,
        vec!["distance_m", "timestamp", "ele", "hr", "pace_min_per_km"]
    );
    assert_eq!(rows.len(), outcome.records_written);
    assert_eq!(outcome.summary.segments, 3);
    assert_eq!(outcome.summary.points, track.point_count());

    // GPS jitter lengthens the measured path
    assert!(outcome.total_distance_m > 5000.0);
    let expected_rows = (outcome.total_distance_m / 200.0).floor() as usize;
    assert!(
        rows.len() <= expected_rows && rows.len() + 3 >= expected_rows,
        "{} rows for {:.1} m",
        rows.len(),
        outcome.total_distance_m
    );

    let mut previous = 0.0;
    for row in &rows {
        let distance: f64 = row[0].parse().unwrap();
        assert!(distance - previous >= 199.85, "{previous} -> {distance}");
        previous = distance;

        time::OffsetDateTime::parse(&row[1], &time::format_description::well_known::Rfc3339)
            .unwrap();
        assert_eq!(row[2].split('.').nth(1).map(str::len), Some(1));

        let hr: u32 = row[3].parse().unwrap();
        assert!(hr > 55 && hr < 190, "{hr}");

        let pace: f64 = row[4].parse().unwrap();
        assert_eq!(row[4].split('.').nth(1).map(str::len), Some(2));
        assert!(pace.is_finite() && pace > 0.0);
    }

    // Climbs and segment pauses show up as slower rows
    let paces: Vec<f64> = rows.iter().map(|r| r[4].parse().unwrap()).collect();
    let fastest = paces.iter().cloned().fold(f64::INFINITY, f64::min);
    let slowest = paces.iter().cloned().fold(0.0, f64::max);
    assert!(fastest > 2.0 && fastest < 8.0, "{fastest}");
    assert!(slowest > fastest + 1.0, "{slowest}");
}

#[test]
fn test_file_report_matches_in_memory_resampling() {
    let files = TempFiles::new("in-memory", &["track.gpx", "report.csv"]);
    let track = ProceduralGenerator::new(11)
        .with_distance(3000.0)
        .generate(&HikerProfile::default());
    write_gpx_file(files.path(0), &track, "Ridge Walk").unwrap();

    let config = SimplifyConfig::new(files.path(0))
        .with_output(files.path(1))
        .with_interval(250.0);
    run(&config).unwrap();

    // The GPX round trip rounds coordinates, so compare what was parsed
    let parsed = file_parsers::read_track(files.path(0)).unwrap();
    let expected: Vec<_> = parsed
        .points()
        .resample(Resampler::new(250.0).unwrap())
        .collect();

    let (_, rows) = read_csv(files.path(1));
    assert_eq!(rows.len(), expected.len());
    for (row, record) in rows.iter().zip(&expected) {
        assert_eq!(&row[0], format!("{:.1}", record.distance_m));
        assert_eq!(&row[3], record.heart_rate.to_string());
        assert_eq!(&row[4], format!("{:.2}", record.pace_min_per_km));
    }
}

#[test]
fn test_json_report() {
    let files = TempFiles::new("json", &["track.gpx", "report.json"]);
    let track = ProceduralGenerator::for_region(Region::NULL_ISLAND, 5)
        .with_distance(1500.0)
        .with_hills(0.0)
        .without_heart_rate()
        .generate(&RunnerProfile::default().steady());
    write_gpx_file(files.path(0), &track, "Intervals").unwrap();

    let config = SimplifyConfig::new(files.path(0))
        .with_output(files.path(1))
        .with_interval(500.0)
        .with_format(OutputFormat::Json);
    let outcome = run(&config).unwrap();

    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(files.path(1)).unwrap()).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), outcome.records_written);
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row["hr"], 0);
        let pace = row["pace_min_per_km"].as_f64().unwrap();
        assert!(pace > 3.0 && pace < 7.0, "{pace}");
    }
}

#[test]
fn test_single_point_track_writes_header_only() {
    let files = TempFiles::new("single", &["track.gpx", "report.csv"]);
    let track = Track::from_points(vec![TrackPoint::new(
        40.0,
        -105.3,
        1650.0,
        datetime!(2024-05-01 08:00 UTC),
    )]);
    write_gpx_file(files.path(0), &track, "Just Started").unwrap();

    let outcome = run(&SimplifyConfig::new(files.path(0)).with_output(files.path(1))).unwrap();
    assert_eq!(outcome.records_written, 0);
    assert_eq!(outcome.total_distance_m, 0.0);

    let (header, rows) = read_csv(files.path(1));
    assert_eq!(header.len(), 5);
    assert!(rows.is_empty());
}

#[test]
fn test_duplicate_timestamps_do_not_break_report() {
    let files = TempFiles::new("duplicate", &["track.gpx", "report.csv"]);
    let t0 = datetime!(2024-05-01 08:00 UTC);
    let track = Track::from_points(vec![
        TrackPoint::new(0.0, 0.0, 0.0, t0),
        TrackPoint::new(0.0, 0.002, 0.0, t0 + Duration::seconds(60)),
        TrackPoint::new(0.0, 0.004, 0.0, t0 + Duration::seconds(60)),
    ]);
    write_gpx_file(files.path(0), &track, "Glitch").unwrap();

    run(&SimplifyConfig::new(files.path(0)).with_output(files.path(1))).unwrap();

    let (_, rows) = read_csv(files.path(1));
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][4], "4.50");
    assert_eq!(&rows[1][4], "0.00");
}

#[test]
fn test_missing_input_is_fatal_and_writes_nothing() {
    let files = TempFiles::new("missing", &["absent.gpx", "report.csv"]);

    let err = run(&SimplifyConfig::new(files.path(0)).with_output(files.path(1))).unwrap_err();
    assert!(matches!(err, AppError::Source(_)));
    assert!(!files.path(1).exists());
}

#[test]
fn test_malformed_input_is_fatal_and_writes_nothing() {
    let files = TempFiles::new("malformed", &["broken.gpx", "report.csv"]);
    std::fs::write(files.path(0), "<gpx version=\"1.1\"><trk><trkseg><trkpt lat=").unwrap();

    let err = run(&SimplifyConfig::new(files.path(0)).with_output(files.path(1))).unwrap_err();
    assert!(matches!(err, AppError::Source(_)));
    assert!(!files.path(1).exists());
}

#[test]
fn test_invalid_interval_is_rejected_before_reading() {
    let files = TempFiles::new("interval", &["absent.gpx", "report.csv"]);

    let config = SimplifyConfig::new(files.path(0))
        .with_output(files.path(1))
        .with_interval(0.0);
    let err = run(&config).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

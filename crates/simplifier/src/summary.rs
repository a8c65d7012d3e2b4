use serde::Serialize;
use time::OffsetDateTime;

use crate::models::{Track, TrackPoint};

pub trait TrackMetric {
    type Score;
    fn next_point(&mut self, point: &TrackPoint);
    fn finish(&mut self) -> Self::Score;
}

/// Whole-track figures reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackSummary {
    pub segments: usize,
    pub points: usize,
    pub duration_s: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub avg_heart_rate: Option<f64>,
    pub max_heart_rate: Option<u32>,
}

pub fn summarize(track: &Track) -> TrackSummary {
    let mut acc = Metrics::default();

    for point in track.points() {
        acc.next_point(point);
    }

    let mut summary = acc.finish();
    summary.segments = track.segments.len();
    summary
}

#[derive(Debug, Clone, Default)]
struct Metrics {
    points: usize,
    duration: DurationMetric,
    elevation: ElevationMetric,
    heart_rate: HeartRateMetric,
}

impl TrackMetric for Metrics {
    type Score = TrackSummary;
    fn next_point(&mut self, point: &TrackPoint) {
        self.points += 1;
        self.duration.next_point(point);
        self.elevation.next_point(point);
        self.heart_rate.next_point(point);
    }

    fn finish(&mut self) -> TrackSummary {
        let (elevation_gain_m, elevation_loss_m) = self.elevation.finish();
        let (avg_heart_rate, max_heart_rate) = self.heart_rate.finish();
        TrackSummary {
            segments: 0,
            points: self.points,
            duration_s: self.duration.finish(),
            elevation_gain_m,
            elevation_loss_m,
            avg_heart_rate,
            max_heart_rate,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DurationMetric {
    start_time: Option<OffsetDateTime>,
    end_time: Option<OffsetDateTime>,
}

impl TrackMetric for DurationMetric {
    type Score = f64;
    fn next_point(&mut self, point: &TrackPoint) {
        if self.start_time.is_none() {
            self.start_time = Some(point.timestamp);
        }
        self.end_time = Some(point.timestamp);
    }

    fn finish(&mut self) -> f64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).as_seconds_f64(),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ElevationMetric {
    total_gain: f64,
    total_loss: f64,
    last_elevation: Option<f64>,
}

impl TrackMetric for ElevationMetric {
    type Score = (f64, f64);
    fn next_point(&mut self, point: &TrackPoint) {
        if let Some(last_elev) = self.last_elevation {
            let diff = point.elevation - last_elev;
            if diff > 0.0 {
                self.total_gain += diff;
            } else {
                self.total_loss -= diff;
            }
        }
        self.last_elevation = Some(point.elevation);
    }

    fn finish(&mut self) -> (f64, f64) {
        (self.total_gain, self.total_loss)
    }
}

#[derive(Debug, Clone, Default)]
struct HeartRateMetric {
    sum: u64,
    count: u64,
    max: Option<u32>,
}

impl TrackMetric for HeartRateMetric {
    type Score = (Option<f64>, Option<u32>);
    fn next_point(&mut self, point: &TrackPoint) {
        if !point.has_heart_rate() {
            return;
        }
        self.sum += u64::from(point.heart_rate);
        self.count += 1;
        self.max = self.max.max(Some(point.heart_rate));
    }

    fn finish(&mut self) -> (Option<f64>, Option<u32>) {
        let avg = (self.count > 0).then(|| self.sum as f64 / self.count as f64);
        (avg, self.max)
    }
}

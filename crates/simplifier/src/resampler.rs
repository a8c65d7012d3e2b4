//! Distance-based resampling of a track into report rows.
//!
//! [`Resampler`] is a fold over the raw points: every point adds its 3D
//! distance from the previous raw point to a running total, and a record is
//! emitted whenever the total has grown by at least the configured interval
//! since the last emission. Pace for a record covers the whole span since the
//! previous emission, which may include many raw points.

use std::borrow::Borrow;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{
    errors::ConfigError,
    geodistance::spatial_distance,
    models::{OutputRecord, TrackPoint},
};

pub const DEFAULT_INTERVAL_M: f64 = 200.0;

/// Elapsed time substituted when two emissions share a timestamp.
pub const MIN_ELAPSED_MINUTES: f64 = 0.0001;

#[derive(Debug, Clone, Default)]
enum ResamplerState {
    #[default]
    Uninitialized,
    Accumulating {
        reference: TrackPoint,
        total_m: f64,
        last_emitted_m: f64,
        last_emitted_at: OffsetDateTime,
    },
}

/// Stateful accumulator turning track points into [`OutputRecord`]s.
///
/// One instance covers one pass over one track. Segment boundaries are not
/// visible here; callers feed the concatenated points.
#[derive(Debug, Clone)]
pub struct Resampler {
    interval_m: f64,
    state: ResamplerState,
}

impl Resampler {
    pub fn new(interval_m: f64) -> Result<Self, ConfigError> {
        if !interval_m.is_finite() || interval_m <= 0.0 {
            return Err(ConfigError::InvalidInterval(interval_m));
        }
        Ok(Self {
            interval_m,
            state: ResamplerState::Uninitialized,
        })
    }

    pub fn interval(&self) -> f64 {
        self.interval_m
    }

    /// Cumulative distance consumed so far, whether or not it was emitted.
    pub fn total_distance(&self) -> f64 {
        match &self.state {
            ResamplerState::Uninitialized => 0.0,
            ResamplerState::Accumulating { total_m, .. } => *total_m,
        }
    }

    /// Feeds one point, returning a record if the interval was reached.
    pub fn next_point(&mut self, point: &TrackPoint) -> Option<OutputRecord> {
        let ResamplerState::Accumulating {
            reference,
            total_m,
            last_emitted_m,
            last_emitted_at,
        } = &mut self.state
        else {
            self.state = ResamplerState::Accumulating {
                reference: point.clone(),
                total_m: 0.0,
                last_emitted_m: 0.0,
                last_emitted_at: point.timestamp,
            };
            return None;
        };

        *total_m += spatial_distance(reference, point);

        let mut record = None;
        let covered_m = *total_m - *last_emitted_m;
        if covered_m >= self.interval_m {
            let pace = pace_min_per_km(covered_m, point.timestamp - *last_emitted_at);
            debug!(
                distance_m = *total_m,
                pace_min_per_km = pace,
                "Interval reached"
            );
            record = Some(OutputRecord {
                distance_m: *total_m,
                timestamp: point.timestamp,
                elevation: point.elevation,
                heart_rate: point.heart_rate,
                pace_min_per_km: pace,
            });
            *last_emitted_m = *total_m;
            *last_emitted_at = point.timestamp;
        }

        *reference = point.clone();
        record
    }
}

/// Minutes per kilometer for `distance_m` covered in `elapsed`.
///
/// A zero elapsed time is replaced by [`MIN_ELAPSED_MINUTES`]. The result is
/// not clamped; slow spans produce arbitrarily large paces.
fn pace_min_per_km(distance_m: f64, elapsed: time::Duration) -> f64 {
    let mut elapsed_min = elapsed.as_seconds_f64() / 60.0;
    if elapsed_min == 0.0 {
        warn!(
            distance_m,
            "Zero elapsed time between emissions, substituting epsilon"
        );
        elapsed_min = MIN_ELAPSED_MINUTES;
    }
    let km_per_min = distance_m / (elapsed_min * 1000.0);
    1.0 / km_per_min
}

/// Lazy iterator adapter yielding records as points are pulled through a
/// [`Resampler`].
#[derive(Debug)]
pub struct Resample<I> {
    points: I,
    resampler: Resampler,
}

impl<I> Resample<I> {
    pub fn new(points: I, resampler: Resampler) -> Self {
        Self { points, resampler }
    }

    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }
}

impl<I> Iterator for Resample<I>
where
    I: Iterator,
    I::Item: Borrow<TrackPoint>,
{
    type Item = OutputRecord;

    fn next(&mut self) -> Option<OutputRecord> {
        for point in self.points.by_ref() {
            if let Some(record) = self.resampler.next_point(point.borrow()) {
                return Some(record);
            }
        }
        None
    }
}

pub trait ResampleExt: Iterator + Sized
where
    Self::Item: Borrow<TrackPoint>,
{
    fn resample(self, resampler: Resampler) -> Resample<Self> {
        Resample::new(self, resampler)
    }
}

impl<I> ResampleExt for I
where
    I: Iterator,
    I::Item: Borrow<TrackPoint>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Track, TrackSegment};
    use time::{Duration, macros::datetime};

    const T0: OffsetDateTime = datetime!(2024-05-01 08:00 UTC);

    fn at(lon: f64, seconds: i64) -> TrackPoint {
        TrackPoint::new(0.0, lon, 0.0, T0 + Duration::seconds(seconds))
    }

    fn run(points: &[TrackPoint], interval_m: f64) -> Vec<OutputRecord> {
        points
            .iter()
            .resample(Resampler::new(interval_m).unwrap())
            .collect()
    }

    #[test]
    fn test_three_point_track() {
        let points = vec![at(0.0, 0), at(0.002, 60), at(0.004, 120)];
        let records = run(&points, 200.0);

        assert_eq!(records.len(), 2);
        assert!((records[0].distance_m - 222.39).abs() < 0.1, "{records:?}");
        assert!((records[1].distance_m - 444.78).abs() < 0.2, "{records:?}");
        assert_eq!(records[0].timestamp, points[1].timestamp);
        assert_eq!(records[1].timestamp, points[2].timestamp);

        // 222.39 m in one minute
        assert!((records[0].pace_min_per_km - 4.4966).abs() < 0.001);
        assert!((records[1].pace_min_per_km - 4.4966).abs() < 0.001);
    }

    #[test]
    fn test_empty_and_single_point_emit_nothing() {
        assert!(run(&[], 200.0).is_empty());
        assert!(run(&[at(0.0, 0)], 200.0).is_empty());
    }

    #[test]
    fn test_first_point_never_emits_even_for_tiny_interval() {
        let mut resampler = Resampler::new(0.001).unwrap();
        assert!(resampler.next_point(&at(0.0, 0)).is_none());
        assert!(resampler.next_point(&at(0.001, 10)).is_some());
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        assert_eq!(
            Resampler::new(0.0).unwrap_err(),
            ConfigError::InvalidInterval(0.0)
        );
        assert!(Resampler::new(-5.0).is_err());
        assert!(Resampler::new(f64::NAN).is_err());
        assert!(Resampler::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_duplicate_timestamps_use_epsilon() {
        let points = vec![at(0.0, 0), at(0.002, 0)];
        let records = run(&points, 200.0);

        assert_eq!(records.len(), 1);
        let pace = records[0].pace_min_per_km;
        assert!(pace.is_finite() && !pace.is_nan());
        let expected = MIN_ELAPSED_MINUTES * 1000.0 / records[0].distance_m;
        assert!((pace - expected).abs() < 1e-12);
    }

    #[test]
    fn test_slow_span_gives_large_finite_pace() {
        // 222 m over ten hours
        let points = vec![at(0.0, 0), at(0.002, 36_000)];
        let records = run(&points, 200.0);

        assert_eq!(records.len(), 1);
        let pace = records[0].pace_min_per_km;
        assert!(pace.is_finite());
        assert!(pace > 2000.0, "{pace}");
    }

    #[test]
    fn test_pace_spans_all_points_since_last_emission() {
        // 0.0005 deg of longitude is ~55.6 m; four hops to pass 200 m
        let points: Vec<TrackPoint> = (0..=4)
            .map(|i| at(i as f64 * 0.0005, i * 15))
            .collect();
        let records = run(&points, 200.0);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, points[4].timestamp);
        // 222.39 m over 60 s measured from the first point
        assert!((records[0].pace_min_per_km - 4.4966).abs() < 0.001);
    }

    #[test]
    fn test_distance_accumulates_between_raw_samples() {
        // Out and back: the straight-line distance is zero but the path is not
        let points = vec![at(0.0, 0), at(0.001, 30), at(0.0, 60)];
        let records = run(&points, 200.0);

        assert_eq!(records.len(), 1);
        assert!((records[0].distance_m - 222.39).abs() < 0.1);
    }

    #[test]
    fn test_elevation_contributes_to_distance() {
        let mut resampler = Resampler::new(50.0).unwrap();
        let base = TrackPoint::new(46.5, 7.9, 1000.0, T0);
        let up = TrackPoint::new(46.5, 7.9, 1060.0, T0 + Duration::minutes(1));

        assert!(resampler.next_point(&base).is_none());
        let record = resampler.next_point(&up).unwrap();
        assert!((record.distance_m - 60.0).abs() < 1e-9);
        assert_eq!(record.elevation, 1060.0);
    }

    #[test]
    fn test_emission_gaps_respect_interval() {
        let points: Vec<TrackPoint> = (0..200)
            .map(|i| {
                let wobble = if i % 3 == 0 { 0.00005 } else { 0.0 };
                let t = T0 + Duration::seconds(i * 7);
                TrackPoint::new(wobble, i as f64 * 0.0003, (i % 7) as f64, t)
                    .with_heart_rate(120 + (i % 40) as u32)
            })
            .collect();
        let records = run(&points, 150.0);

        assert!(records.len() > 5);
        assert!(records[0].distance_m >= 150.0);
        for pair in records.windows(2) {
            assert!(pair[1].distance_m >= pair[0].distance_m);
            assert!(pair[1].distance_m - pair[0].distance_m >= 150.0);
        }
        for record in &records {
            assert!(record.heart_rate >= 120);
            assert!(record.pace_min_per_km.is_finite());
        }
    }

    #[test]
    fn test_segments_are_concatenated() {
        let track = Track::new(vec![
            TrackSegment::new(vec![at(0.0, 0), at(0.0012, 30)]),
            TrackSegment::new(vec![at(0.0024, 60), at(0.0036, 90), at(0.0048, 120)]),
        ]);
        let records: Vec<_> = track
            .points()
            .resample(Resampler::new(200.0).unwrap())
            .collect();

        // ~133 m per hop: the hop across the boundary is counted
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, T0 + Duration::seconds(60));
        assert_eq!(records[1].timestamp, T0 + Duration::seconds(120));
        assert!((records[0].distance_m - 266.87).abs() < 0.2);
    }

    #[test]
    fn test_heart_rate_and_elevation_from_triggering_point() {
        let points = vec![
            at(0.0, 0).with_heart_rate(100),
            TrackPoint::new(0.0, 0.002, 12.5, T0 + Duration::seconds(60)).with_heart_rate(151),
        ];
        let records = run(&points, 200.0);

        assert_eq!(records[0].heart_rate, 151);
        assert_eq!(records[0].elevation, 12.5);
    }

    #[test]
    fn test_total_distance_tracks_unemitted_tail() {
        let mut resampler = Resampler::new(200.0).unwrap();
        assert_eq!(resampler.total_distance(), 0.0);
        for p in [at(0.0, 0), at(0.002, 60), at(0.0025, 75)] {
            resampler.next_point(&p);
        }
        assert!((resampler.total_distance() - 277.99).abs() < 0.1);
        assert_eq!(resampler.interval(), 200.0);
    }

    #[test]
    fn test_backwards_timestamp_gives_negative_pace() {
        let points = vec![at(0.0, 60), at(0.002, 0)];
        let records = run(&points, 200.0);
        assert!(records[0].pace_min_per_km < 0.0);
    }
}

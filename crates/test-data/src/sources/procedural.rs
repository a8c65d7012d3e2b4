//! Procedural track generation.

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use time::{Duration, OffsetDateTime, macros::datetime};
use tracing::debug;

use crate::config::{BoundingBox, Region};
use crate::profiles::{self, AthleteProfile};
use crate::{Track, TrackPoint, TrackSegment};

/// Configuration for procedural track generation.
#[derive(Debug, Clone)]
pub struct TrackConfig {
    /// Target distance in meters.
    pub distance_meters: f64,
    /// Starting point (lat, lon). If None, the center of `bounds`.
    pub start_point: Option<(f64, f64)>,
    /// Geographic bounds for the track.
    pub bounds: BoundingBox,
    /// Timestamp of the first point.
    pub start_time: OffsetDateTime,
    /// GPS position jitter standard deviation in meters.
    pub gps_jitter_m: f64,
    /// Approximate distance between track points in meters.
    pub point_spacing_m: f64,
    /// Elevation at the start in meters.
    pub base_elevation_m: f64,
    /// Amplitude of the rolling hills in meters; 0 for flat terrain.
    pub hill_amplitude_m: f64,
    /// Distance between hill crests in meters.
    pub hill_wavelength_m: f64,
    /// Number of segments the points are split into.
    pub segments: usize,
    /// Paused time between consecutive segments in seconds.
    pub segment_gap_s: f64,
    /// Whether points carry heart-rate readings.
    pub heart_rate: bool,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            distance_meters: 5000.0,
            start_point: None,
            bounds: Region::BOULDER,
            start_time: datetime!(2024-05-01 07:30 UTC),
            gps_jitter_m: 3.0,
            point_spacing_m: 10.0,
            base_elevation_m: 1650.0,
            hill_amplitude_m: 25.0,
            hill_wavelength_m: 1200.0,
            segments: 1,
            segment_gap_s: 120.0,
            heart_rate: true,
        }
    }
}

/// Generates synthetic GPS tracks with realistic characteristics.
///
/// Generation is deterministic for a given seed and configuration.
pub struct ProceduralGenerator {
    config: TrackConfig,
    seed: u64,
}

impl ProceduralGenerator {
    /// Creates a new procedural generator with default configuration.
    pub fn new(seed: u64) -> Self {
        Self {
            config: TrackConfig::default(),
            seed,
        }
    }

    /// Creates a generator for a specific region.
    pub fn for_region(bounds: BoundingBox, seed: u64) -> Self {
        Self {
            config: TrackConfig {
                bounds,
                ..Default::default()
            },
            seed,
        }
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// Sets the target distance.
    pub fn with_distance(mut self, meters: f64) -> Self {
        self.config.distance_meters = meters;
        self
    }

    /// Sets the starting point.
    pub fn with_start(mut self, lat: f64, lon: f64) -> Self {
        self.config.start_point = Some((lat, lon));
        self
    }

    /// Sets GPS jitter amount.
    pub fn with_gps_jitter(mut self, meters: f64) -> Self {
        self.config.gps_jitter_m = meters;
        self
    }

    /// Sets point spacing.
    pub fn with_point_spacing(mut self, meters: f64) -> Self {
        self.config.point_spacing_m = meters;
        self
    }

    /// Sets the rolling-hill amplitude; zero gives flat terrain.
    pub fn with_hills(mut self, amplitude_m: f64) -> Self {
        self.config.hill_amplitude_m = amplitude_m;
        self
    }

    /// Splits the track into `count` segments separated by a pause.
    pub fn with_segments(mut self, count: usize) -> Self {
        self.config.segments = count.max(1);
        self
    }

    /// Disables heart-rate readings.
    pub fn without_heart_rate(mut self) -> Self {
        self.config.heart_rate = false;
        self
    }

    /// Generates a track using the specified athletic profile.
    ///
    /// The profile determines speed and heart rate from the terrain grade.
    pub fn generate(&self, profile: &dyn AthleteProfile) -> Track {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let start = self.config.start_point.unwrap_or_else(|| self.config.bounds.center());

        let path = self.generate_path(start, &mut rng);
        let points = self.apply_timing(&path, profile, &mut rng);
        let track = self.split_segments(points);

        debug!(
            points = track.point_count(),
            segments = track.segments.len(),
            "Generated procedural track"
        );
        track
    }

    /// Generates the ideal path as (lat, lon, distance along path) triples.
    fn generate_path(&self, start: (f64, f64), rng: &mut impl Rng) -> Vec<(f64, f64, f64)> {
        let mut path = vec![(start.0, start.1, 0.0)];
        let mut current = start;
        let mut total_distance = 0.0;

        // Random walk with some momentum to create natural-looking paths
        let mut heading = rng.gen_range(0.0..std::f64::consts::TAU);

        while total_distance < self.config.distance_meters {
            heading += rng.gen_range(-0.3..0.3);

            let step = self.config.point_spacing_m * rng.gen_range(0.8..1.2);

            // Rough approximation: 1 degree lat ~ 111km, lon varies by latitude
            let lat_delta = (step * heading.cos()) / 111_000.0;
            let lon_delta = (step * heading.sin()) / (111_000.0 * current.0.to_radians().cos());

            let (next_lat, next_lon, bounced_heading) =
                self.apply_bounds(current.0 + lat_delta, current.1 + lon_delta, heading);
            heading = bounced_heading;

            current = (next_lat, next_lon);
            total_distance += step;
            path.push((next_lat, next_lon, total_distance));
        }

        path
    }

    /// Applies bounds checking with heading reversal.
    fn apply_bounds(&self, lat: f64, lon: f64, heading: f64) -> (f64, f64, f64) {
        let b = &self.config.bounds;
        let mut new_heading = heading;

        let lat = if lat < b.min_lat {
            new_heading = std::f64::consts::PI - heading;
            b.min_lat + (b.min_lat - lat).min(0.001)
        } else if lat > b.max_lat {
            new_heading = std::f64::consts::PI - heading;
            b.max_lat - (lat - b.max_lat).min(0.001)
        } else {
            lat
        };

        let lon = if lon < b.min_lon {
            new_heading = -heading;
            b.min_lon + (b.min_lon - lon).min(0.001)
        } else if lon > b.max_lon {
            new_heading = -heading;
            b.max_lon - (lon - b.max_lon).min(0.001)
        } else {
            lon
        };

        (lat, lon, new_heading)
    }

    fn elevation_at(&self, distance: f64) -> f64 {
        let phase = distance / self.config.hill_wavelength_m * std::f64::consts::TAU;
        self.config.base_elevation_m + self.config.hill_amplitude_m * phase.sin()
    }

    /// Applies timing, elevation and heart rate to a path.
    fn apply_timing(
        &self,
        path: &[(f64, f64, f64)],
        profile: &dyn AthleteProfile,
        rng: &mut impl Rng,
    ) -> Vec<TrackPoint> {
        let jitter_deg = (self.config.gps_jitter_m / 111_000.0).max(0.0);
        let jitter = Normal::new(0.0, jitter_deg).ok().filter(|_| jitter_deg > 0.0);

        let mut result = Vec::with_capacity(path.len());
        let mut timestamp = self.config.start_time;
        let mut previous: Option<(f64, f64)> = None;

        for &(lat, lon, distance) in path {
            let elevation = self.elevation_at(distance);
            let grade = match previous {
                Some((prev_distance, prev_elevation)) if distance > prev_distance => {
                    (elevation - prev_elevation) / (distance - prev_distance)
                }
                _ => 0.0,
            };

            if let Some((prev_distance, _)) = previous {
                let variance = profiles::sample_variance(profile, rng);
                let speed = profiles::speed_at_grade(profile, grade, variance);
                timestamp += Duration::seconds_f64((distance - prev_distance) / speed);
            }
            previous = Some((distance, elevation));

            let (lat, lon) = match &jitter {
                Some(normal) => (lat + normal.sample(rng), lon + normal.sample(rng)),
                None => (lat, lon),
            };
            let mut point = TrackPoint::new(lat, lon, elevation, timestamp);
            if self.config.heart_rate {
                point.heart_rate = profile.heart_rate_at_grade(grade);
            }
            result.push(point);
        }

        result
    }

    /// Splits points into equally sized segments, shifting later segments
    /// by the configured pause.
    fn split_segments(&self, points: Vec<TrackPoint>) -> Track {
        let count = self.config.segments.max(1);
        let per_segment = points.len().div_ceil(count).max(1);
        let gap = Duration::seconds_f64(self.config.segment_gap_s);

        let segments = points
            .chunks(per_segment)
            .enumerate()
            .map(|(i, chunk)| {
                let offset = gap * i as u32;
                TrackSegment::new(
                    chunk
                        .iter()
                        .cloned()
                        .map(|mut p| {
                            p.timestamp += offset;
                            p
                        })
                        .collect(),
                )
            })
            .collect();

        Track::new(segments)
    }
}

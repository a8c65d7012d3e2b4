use time::OffsetDateTime;

/// One raw GPS sample as produced by a track source.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Meters; sources store 0.0 when the file carries no elevation.
    pub elevation: f64,
    pub timestamp: OffsetDateTime,
    /// Beats per minute; 0 when no heart-rate sensor was recorded.
    pub heart_rate: u32,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64, elevation: f64, timestamp: OffsetDateTime) -> Self {
        Self {
            lat,
            lon,
            elevation,
            timestamp,
            heart_rate: 0,
        }
    }

    pub fn with_heart_rate(mut self, heart_rate: u32) -> Self {
        self.heart_rate = heart_rate;
        self
    }

    pub fn has_heart_rate(&self) -> bool {
        self.heart_rate > 0
    }
}

/// A contiguous run of points within a track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

impl TrackSegment {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }
}

/// A recorded activity: one or more segments processed as a single logical
/// sequence of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub segments: Vec<TrackSegment>,
}

impl Track {
    pub fn new(segments: Vec<TrackSegment>) -> Self {
        Self { segments }
    }

    pub fn from_points(points: Vec<TrackPoint>) -> Self {
        Self {
            segments: vec![TrackSegment::new(points)],
        }
    }

    /// Iterates every point of every segment in recorded order.
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.segments.iter().flat_map(|seg| seg.points.iter())
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|seg| seg.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

/// One row of the simplified report.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    /// Cumulative 3D distance from the start of the track, in meters.
    pub distance_m: f64,
    pub timestamp: OffsetDateTime,
    pub elevation: f64,
    pub heart_rate: u32,
    /// Minutes per kilometer since the previous record.
    pub pace_min_per_km: f64,
}

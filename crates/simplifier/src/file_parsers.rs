//! Track file parsers for GPX, TCX, and FIT formats.
//!
//! Every parser produces a [`Track`] whose segments keep the file's point
//! order exactly. Points are never reordered, deduplicated, or filtered for
//! noise; a point without a timestamp fails the whole parse.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bytes::{Buf as _, Bytes};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing::{debug, warn};

use crate::models::{Track, TrackPoint, TrackSegment};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse GPX file: {0}")]
    Gpx(String),
    #[error("Failed to parse TCX file: {0}")]
    Tcx(String),
    #[error("Failed to parse FIT file: {0}")]
    Fit(String),
    #[error("Track point {index} of segment {segment} has no timestamp")]
    MissingTimestamp { segment: usize, index: usize },
    #[error("Unsupported file type: {0:?}")]
    UnsupportedFileType(FileType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Gpx,
    Tcx,
    Fit,
    Other,
}

impl FileType {
    /// Guesses the type from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("gpx") => FileType::Gpx,
            Some("tcx") => FileType::Tcx,
            Some("fit") => FileType::Fit,
            _ => FileType::Other,
        }
    }

    /// Sniffs the type from file contents.
    ///
    /// FIT files carry `.FIT` at byte offset 8 of their header; the XML
    /// formats are told apart by their root element.
    pub fn detect_from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() >= 12 && &bytes[8..12] == b".FIT" {
            return FileType::Fit;
        }

        let head = &bytes[..bytes.len().min(1024)];
        let head = String::from_utf8_lossy(head);
        if head.contains("<gpx") {
            FileType::Gpx
        } else if head.contains("<TrainingCenterDatabase") {
            FileType::Tcx
        } else {
            FileType::Other
        }
    }
}

/// Reads and parses a track file from disk.
///
/// The type is taken from the extension, falling back to content sniffing
/// for unknown extensions.
pub fn read_track(path: impl AsRef<Path>) -> Result<Track, SourceError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = data.len(), "Read track file");

    parse_track_file(FileType::from_path(path), Bytes::from(data))
}

/// Parses a track file of a known type.
/// For FileType::Other, attempts to detect the format from the bytes.
pub fn parse_track_file(file_type: FileType, bytes: Bytes) -> Result<Track, SourceError> {
    let actual_type = if file_type == FileType::Other {
        FileType::detect_from_bytes(&bytes)
    } else {
        file_type
    };

    let track = match actual_type {
        FileType::Gpx => parse_gpx(bytes),
        FileType::Tcx => parse_tcx(bytes),
        FileType::Fit => parse_fit(bytes),
        FileType::Other => Err(SourceError::UnsupportedFileType(actual_type)),
    }?;

    debug!(
        file_type = ?actual_type,
        segments = track.segments.len(),
        points = track.point_count(),
        "Parsed track"
    );
    Ok(track)
}

/// Parses a GPX file. Every `trkseg` of every `trk` becomes one segment.
///
/// Heart rate comes from Garmin `TrackPointExtension` `hr` elements, and
/// timestamps keep the UTC offset written in the file. The `gpx` crate
/// exposes neither.
pub fn parse_gpx(bytes: Bytes) -> Result<Track, SourceError> {
    let scanned = scan_gpx_points(&bytes)?;
    let gpx = gpx::read(bytes.reader()).map_err(|e| SourceError::Gpx(e.to_string()))?;

    let mut segments = Vec::new();
    let mut point_index = 0;

    for track in &gpx.tracks {
        for seg in &track.segments {
            let segment = segments.len();
            let mut points = Vec::with_capacity(seg.points.len());

            for (index, wpt) in seg.points.iter().enumerate() {
                let extra = scanned.get(point_index).copied().unwrap_or_default();
                point_index += 1;

                let utc = wpt
                    .time
                    .map(OffsetDateTime::from)
                    .ok_or(SourceError::MissingTimestamp { segment, index })?;
                let timestamp = match extra.offset {
                    Some(offset) => utc.checked_to_offset(offset).unwrap_or(utc),
                    None => utc,
                };

                points.push(TrackPoint {
                    lat: wpt.point().y(),
                    lon: wpt.point().x(),
                    elevation: wpt.elevation.unwrap_or(0.0),
                    timestamp,
                    heart_rate: extra.heart_rate.unwrap_or(0),
                });
            }

            segments.push(TrackSegment::new(points));
        }
    }

    if scanned.len() != point_index {
        warn!(
            scanned = scanned.len(),
            parsed = point_index,
            "Extension scan and GPX parser disagree on track point count"
        );
    }

    Ok(Track::new(segments))
}

/// What the `gpx` crate drops from a `trkpt`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ScannedPoint {
    heart_rate: Option<u32>,
    /// Offset of the `<time>` text; `None` if absent or not RFC 3339.
    offset: Option<UtcOffset>,
}

#[derive(Clone, Copy, PartialEq)]
enum ScanField {
    Other,
    HeartRate,
    Time,
}

/// Walks every `trkpt` in document order, collecting its heart rate and
/// timestamp offset.
fn scan_gpx_points(bytes: &[u8]) -> Result<Vec<ScannedPoint>, SourceError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut points = Vec::new();
    let mut current: Option<ScannedPoint> = None;
    let mut field = ScanField::Other;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => current = Some(ScannedPoint::default()),
                b"hr" if current.is_some() => field = ScanField::HeartRate,
                b"time" if current.is_some() => field = ScanField::Time,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"trkpt" => {
                points.push(ScannedPoint::default());
            }
            Ok(Event::Text(t)) if field != ScanField::Other => {
                let text = t.unescape().map_err(|e| SourceError::Gpx(e.to_string()))?;
                let text = text.trim();
                if let Some(point) = current.as_mut() {
                    match field {
                        ScanField::HeartRate => {
                            point.heart_rate =
                                text.parse::<f64>().ok().map(|v| v.max(0.0).round() as u32);
                        }
                        ScanField::Time => {
                            point.offset = OffsetDateTime::parse(text, &Rfc3339)
                                .ok()
                                .map(|t| t.offset());
                        }
                        ScanField::Other => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    points.extend(current.take());
                    field = ScanField::Other;
                }
                b"hr" | b"time" => field = ScanField::Other,
                _ => {}
            },
            Err(e) => return Err(SourceError::Gpx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(points)
}

/// Parses a TCX (Training Center XML) file. Each lap track is a segment.
pub fn parse_tcx(bytes: Bytes) -> Result<Track, SourceError> {
    let mut buf_reader = BufReader::new(bytes.reader());

    let tcx_data =
        tcx::read(&mut buf_reader).map_err(|e| SourceError::Tcx(format!("{e:?}")))?;

    let mut segments = Vec::new();

    if let Some(ref activities) = tcx_data.activities {
        for activity in &activities.activities {
            for lap in &activity.laps {
                for track in &lap.tracks {
                    let mut points = Vec::new();

                    for trackpoint in &track.trackpoints {
                        // Indoor samples have no fix
                        let Some(ref position) = trackpoint.position else {
                            continue;
                        };

                        let timestamp = chrono_to_offset_datetime(&trackpoint.time)
                            .ok_or_else(|| {
                                SourceError::Tcx(format!(
                                    "Timestamp out of range: {}",
                                    trackpoint.time
                                ))
                            })?;

                        let mut point = TrackPoint::new(
                            position.latitude,
                            position.longitude,
                            trackpoint.altitude_meters.unwrap_or(0.0),
                            timestamp,
                        );
                        if let Some(ref hr) = trackpoint.heart_rate {
                            point.heart_rate = hr.value.max(0.0).round() as u32;
                        }
                        points.push(point);
                    }

                    segments.push(TrackSegment::new(points));
                }
            }
        }
    }

    Ok(Track::new(segments))
}

/// Convert chrono DateTime (any zone) to time OffsetDateTime in UTC
fn chrono_to_offset_datetime<Tz: chrono::TimeZone>(
    dt: &chrono::DateTime<Tz>,
) -> Option<OffsetDateTime> {
    let nanos = i128::from(dt.timestamp()) * 1_000_000_000 + i128::from(dt.timestamp_subsec_nanos());
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

/// Parses a FIT (Flexible and Interoperable Data Transfer) file.
///
/// `record` messages with a position fix form a single segment.
pub fn parse_fit(bytes: Bytes) -> Result<Track, SourceError> {
    let fit_data = fitparser::from_bytes(&bytes).map_err(|e| SourceError::Fit(e.to_string()))?;

    let mut points = Vec::new();

    for record in fit_data {
        if record.kind() != fitparser::profile::field_types::MesgNum::Record {
            continue;
        }

        let mut lat: Option<f64> = None;
        let mut lon: Option<f64> = None;
        let mut elevation: Option<f64> = None;
        let mut timestamp: Option<OffsetDateTime> = None;
        let mut hr: Option<u32> = None;

        for field in record.fields() {
            match field.name() {
                "position_lat" => {
                    if let fitparser::Value::SInt32(v) = field.value() {
                        lat = Some(semicircles_to_degrees(*v));
                    }
                }
                "position_long" => {
                    if let fitparser::Value::SInt32(v) = field.value() {
                        lon = Some(semicircles_to_degrees(*v));
                    }
                }
                // enhanced_altitude wins when both are present
                "enhanced_altitude" => {
                    elevation = extract_fit_f64(field.value());
                }
                "altitude" => {
                    elevation = elevation.or(extract_fit_f64(field.value()));
                }
                "timestamp" => {
                    if let fitparser::Value::Timestamp(t) = field.value() {
                        timestamp = chrono_to_offset_datetime(t);
                    }
                }
                "heart_rate" => {
                    hr = extract_fit_f64(field.value()).map(|v| v.max(0.0).round() as u32);
                }
                _ => {}
            }
        }

        let (Some(lat), Some(lon)) = (lat, lon) else {
            continue;
        };
        let timestamp = timestamp.ok_or(SourceError::MissingTimestamp {
            segment: 0,
            index: points.len(),
        })?;

        points.push(TrackPoint {
            lat,
            lon,
            elevation: elevation.unwrap_or(0.0),
            timestamp,
            heart_rate: hr.unwrap_or(0),
        });
    }

    Ok(Track::from_points(points))
}

/// Convert FIT semicircles to degrees.
/// FIT uses semicircles where 2^31 semicircles = 180 degrees.
fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}

/// Extract f64 from various FIT value types
fn extract_fit_f64(value: &fitparser::Value) -> Option<f64> {
    match value {
        fitparser::Value::Float32(v) => Some(*v as f64),
        fitparser::Value::Float64(v) => Some(*v),
        fitparser::Value::SInt8(v) => Some(*v as f64),
        fitparser::Value::UInt8(v) => Some(*v as f64),
        fitparser::Value::SInt16(v) => Some(*v as f64),
        fitparser::Value::UInt16(v) => Some(*v as f64),
        fitparser::Value::SInt32(v) => Some(*v as f64),
        fitparser::Value::UInt32(v) => Some(*v as f64),
        _ => None,
    }
}

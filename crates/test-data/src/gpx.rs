//! GPX file generation from synthetic tracks.
//!
//! Generates GPX 1.1 XML with Garmin `TrackPointExtension` heart-rate
//! elements, the shape most fitness devices export.

use std::path::Path;

use time::format_description::well_known::Rfc3339;

use crate::Track;

/// Generates a GPX 1.1 XML document from a track.
///
/// The generated GPX includes:
/// - Standard GPX 1.1 header plus the Garmin TrackPointExtension namespace
/// - Single track with one `trkseg` per track segment
/// - Each point includes lat, lon, elevation, and timestamp
/// - Heart rate as an extension, only for points that carry one
pub fn generate_gpx(track: &Track, activity_name: &str) -> Vec<u8> {
    let mut gpx = String::new();

    gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    gpx.push('\n');
    gpx.push_str(r#"<gpx version="1.1" creator="gpx-simplifier-test-data""#);
    gpx.push_str(r#" xmlns="http://www.topografix.com/GPX/1/1""#);
    gpx.push_str(r#" xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1""#);
    gpx.push_str(r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#);
    gpx.push_str(r#" xsi:schemaLocation="http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd">"#);
    gpx.push('\n');

    gpx.push_str("  <metadata>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(activity_name)));
    gpx.push_str("  </metadata>\n");

    gpx.push_str("  <trk>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(activity_name)));

    for segment in &track.segments {
        gpx.push_str("    <trkseg>\n");

        for point in &segment.points {
            gpx.push_str(&format!(
                r#"      <trkpt lat="{:.7}" lon="{:.7}">"#,
                point.lat, point.lon
            ));
            gpx.push('\n');
            gpx.push_str(&format!("        <ele>{:.2}</ele>\n", point.elevation));

            let formatted = point.timestamp.format(&Rfc3339).unwrap_or_default();
            gpx.push_str(&format!("        <time>{}</time>\n", formatted));

            if point.has_heart_rate() {
                gpx.push_str("        <extensions>\n");
                gpx.push_str("          <gpxtpx:TrackPointExtension>\n");
                gpx.push_str(&format!(
                    "            <gpxtpx:hr>{}</gpxtpx:hr>\n",
                    point.heart_rate
                ));
                gpx.push_str("          </gpxtpx:TrackPointExtension>\n");
                gpx.push_str("        </extensions>\n");
            }

            gpx.push_str("      </trkpt>\n");
        }

        gpx.push_str("    </trkseg>\n");
    }

    gpx.push_str("  </trk>\n");
    gpx.push_str("</gpx>\n");

    gpx.into_bytes()
}

/// Writes a track to disk as GPX.
pub fn write_gpx_file(
    path: impl AsRef<Path>,
    track: &Track,
    activity_name: &str,
) -> std::io::Result<()> {
    std::fs::write(path, generate_gpx(track, activity_name))
}

/// Escapes XML special characters in a string.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

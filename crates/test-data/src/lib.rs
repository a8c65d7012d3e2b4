//! Synthetic track data for gpx-simplifier tests.
//!
//! This crate generates realistic GPS recordings (position jitter, rolling
//! elevation, grade-dependent speed and heart rate, multiple segments) and
//! renders them as GPX 1.1 so the whole pipeline can be driven from files.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let track = ProceduralGenerator::new(42)
//!     .with_distance(5000.0)
//!     .with_segments(3)
//!     .generate(&RunnerProfile::default());
//! let gpx = generate_gpx(&track, "Tempo Run");
//! ```

pub mod config;
pub mod gpx;
pub mod profiles;
pub mod sources;

pub use gpx_simplifier::models::{Track, TrackPoint, TrackSegment};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{BoundingBox, Region};
    pub use crate::gpx::{generate_gpx, write_gpx_file};
    pub use crate::profiles::{AthleteProfile, HikerProfile, RunnerProfile, sample_variance};
    pub use crate::sources::{ProceduralGenerator, TrackConfig};
    pub use crate::{Track, TrackPoint, TrackSegment};
}

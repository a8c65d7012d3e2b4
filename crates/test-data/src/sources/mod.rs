//! Track acquisition sources.
//!
//! - [`ProceduralGenerator`]: Generate synthetic tracks with configurable parameters

mod procedural;

pub use procedural::{ProceduralGenerator, TrackConfig};

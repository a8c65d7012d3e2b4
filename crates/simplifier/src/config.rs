//! Run configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{errors::ConfigError, report::OutputFormat, resampler::DEFAULT_INTERVAL_M};

pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Everything one simplification run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyConfig {
    /// Track file to read (GPX, TCX, or FIT).
    pub input: PathBuf,
    /// Report destination; `-` writes to stdout.
    pub output: PathBuf,
    /// Distance between report rows in meters.
    pub interval_m: f64,
    pub format: OutputFormat,
}

impl SimplifyConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            interval_m: DEFAULT_INTERVAL_M,
            format: OutputFormat::default(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_interval(mut self, meters: f64) -> Self {
        self.interval_m = meters;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.interval_m.is_finite() || self.interval_m <= 0.0 {
            return Err(ConfigError::InvalidInterval(self.interval_m));
        }
        Ok(())
    }
}

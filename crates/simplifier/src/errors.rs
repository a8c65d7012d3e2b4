use thiserror::Error;

use crate::{file_parsers::SourceError, report::ReportError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Distance interval must be a positive number of meters, got {0}")]
    InvalidInterval(f64),
}

/// Any failure that aborts a simplification run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

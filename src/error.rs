//! Error kinds for the clipping pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Every variant is fatal to a run.
#[derive(Debug, Error)]
pub enum ClipError {
    /// Input file is not a GeoJSON feature collection
    #[error("{} does not look like a GeoJSON feature collection: {reason}", path.display())]
    InvalidInputFormat { path: PathBuf, reason: String },

    /// The boundary has no polygon to test against
    #[error("boundary relation has no polygon geometry: {0}")]
    MalformedBoundary(String),

    #[error("no relation feature returned for relation {0}")]
    BoundaryNotFound(u64),

    #[error("failed to fetch boundary relation {relation}: {reason}")]
    BoundaryFetchFailure { relation: u64, reason: String },

    #[error("timed out after {secs}s fetching boundary relation {relation}")]
    BoundaryFetchTimeout { relation: u64, secs: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ClipError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClipError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        ClipError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClipError>;

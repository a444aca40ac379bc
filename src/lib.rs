//! Streetclip - clips a city's street network to an OSM administrative boundary
//!
//! This library provides the clipping pipeline used by the `streetclip` binary.

pub mod boundary;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod records;

pub use boundary::{filter_contained, flatten, BoundaryResolver, BoundarySet, OverpassResolver};
pub use config::{ClipConfig, DatasetPaths};
pub use error::ClipError;
pub use pipeline::{join_records, run, PipelineReport};

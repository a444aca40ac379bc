//! End-to-end clipping run: load, resolve, flatten, filter, join, write.
//!
//! Each stage writes its output as soon as it completes. A failing stage
//! stops the run and leaves the earlier outputs on disk.

use std::path::PathBuf;

use geojson::Feature;
use hashbrown::HashMap;
use serde_json::Value as JsonValue;
use tracing::info;

use crate::boundary::{filter_contained, flatten, BoundaryResolver};
use crate::config::{ClipConfig, DatasetPaths};
use crate::error::Result;
use crate::io::{read_features, write_features};
use crate::records::{load_records, write_records, StreetRecord};

/// Property holding the street identifier
pub const ID_PROPERTY: &str = "id";

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub input_features: usize,
    pub boundary_polygons: usize,
    pub retained_features: usize,
    /// `None` when the join stage is disabled
    pub joined_rows: Option<usize>,
    pub written: Vec<PathBuf>,
}

/// Identifier of a feature as text; numbers use their decimal form
pub fn feature_key(feature: &Feature) -> Option<String> {
    match feature.property(ID_PROPERTY)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Inner join of filtered features against street records.
///
/// Rows come out grouped by feature in feature order, then in record
/// order. Features without an identifier or without a matching record
/// contribute no rows; they still belong in the geometry output.
pub fn join_records(filtered: &[Feature], records: &[StreetRecord]) -> Vec<StreetRecord> {
    let mut by_key: HashMap<&str, Vec<&StreetRecord>> = HashMap::new();
    for record in records {
        if let Some(key) = record.key() {
            by_key.entry(key).or_default().push(record);
        }
    }

    let joined: Vec<StreetRecord> = filtered
        .iter()
        .filter_map(feature_key)
        .filter_map(|key| by_key.get(key.as_str()))
        .flatten()
        .map(|record| (*record).clone())
        .collect();

    info!(
        "Joined {} street records for {} features",
        joined.len(),
        filtered.len()
    );
    joined
}

/// Clip one city's streets to a boundary relation
pub async fn run<R: BoundaryResolver>(
    config: &ClipConfig,
    city: &str,
    relation_id: u64,
    resolver: &R,
) -> Result<PipelineReport> {
    let paths = DatasetPaths::for_city(config, city);
    let mut written = Vec::new();

    let features: Vec<Feature> = read_features(&paths.streets)?;

    let relation = resolver.resolve(relation_id).await?;
    let boundaries = flatten(&relation)?;

    write_features(&paths.boundary_out, &boundaries.features())?;
    info!("City boundary: {}", paths.boundary_out.display());
    written.push(paths.boundary_out.clone());

    let filtered = filter_contained(&features, &boundaries);

    write_features(&paths.streets_out, &filtered)?;
    written.push(paths.streets_out.clone());

    let joined_rows = if config.join {
        let records = load_records(&paths.records)?;
        let joined = join_records(&filtered, &records);
        write_records(&paths.records_out, &joined)?;
        written.push(paths.records_out.clone());
        Some(joined.len())
    } else {
        info!("Join stage disabled, skipping {}", paths.records.display());
        None
    };

    Ok(PipelineReport {
        input_features: features.len(),
        boundary_polygons: boundaries.len(),
        retained_features: filtered.len(),
        joined_rows,
        written,
    })
}

//! GeoJSON file reading and writing.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson};
use tracing::info;

use crate::error::{ClipError, Result};

/// Read the features of a GeoJSON feature collection file
pub fn read_features(path: &Path) -> Result<Vec<Feature>> {
    info!("Reading {}", path.display());

    let raw = fs::read_to_string(path).map_err(|e| ClipError::io(path, e))?;
    let features = parse_feature_collection(&raw).map_err(|reason| {
        ClipError::InvalidInputFormat {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    info!("{} features in {}", features.len(), path.display());
    Ok(features)
}

fn parse_feature_collection(raw: &str) -> std::result::Result<Vec<Feature>, String> {
    match raw.parse::<GeoJson>().map_err(|e| e.to_string())? {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        GeoJson::Feature(_) => Err("found a single Feature, expected a FeatureCollection".into()),
        GeoJson::Geometry(_) => Err("found a bare Geometry, expected a FeatureCollection".into()),
    }
}

/// Write features as a standard FeatureCollection, creating parent directories
pub fn write_features(path: &Path, features: &[Feature]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ClipError::io(parent, e))?;
    }

    let collection = FeatureCollection {
        bbox: None,
        features: features.to_vec(),
        foreign_members: None,
    };

    let file = File::create(path).map_err(|e| ClipError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection)
        .map_err(|e| ClipError::io(path, e.into()))?;
    writer.flush().map_err(|e| ClipError::io(path, e))?;

    info!("Wrote {} features to {}", features.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection() {
        let raw = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"id":"a"},"geometry":{"type":"Point","coordinates":[1.0,2.0]}}
        ]}"#;
        let features = parse_feature_collection(raw).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].property("id").unwrap(), "a");
    }

    #[test]
    fn test_rejects_non_collections() {
        let feature = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        assert!(parse_feature_collection(feature).is_err());
        assert!(parse_feature_collection("{\"features\": 3}").is_err());
        assert!(parse_feature_collection("not json").is_err());
    }
}

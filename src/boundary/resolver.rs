//! Boundary relation lookup.

use std::future::Future;

use geojson::Feature;
use tracing::{info, warn};

use crate::error::{ClipError, Result};

/// Fetches an administrative boundary relation by OSM id
pub trait BoundaryResolver {
    fn resolve(&self, relation_id: u64) -> impl Future<Output = Result<Feature>> + Send;
}

/// Value of the `type` property marking the relation itself
pub const RELATION_TYPE: &str = "relation";

fn is_relation(feature: &Feature) -> bool {
    feature
        .property("type")
        .and_then(|v| v.as_str())
        .map(|t| t == RELATION_TYPE)
        .unwrap_or(false)
}

/// Pick the relation feature out of a service response.
///
/// When several relation features come back the first one is used; the
/// service gives no hint which administrative level the caller wanted.
pub fn select_relation(features: Vec<Feature>, relation_id: u64) -> Result<Feature> {
    let mut relations = features.into_iter().filter(is_relation);

    let first = relations
        .next()
        .ok_or(ClipError::BoundaryNotFound(relation_id))?;

    let extra = relations.count();
    if extra > 0 {
        warn!(
            "{} additional relation features returned for {}, using the first",
            extra, relation_id
        );
    }

    info!(
        "Selected relation feature {}",
        first
            .property("id")
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<no id>".to_string())
    );
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(kind: &str, id: u64) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "type": kind, "id": id },
            "geometry": null,
        }))
        .unwrap()
    }

    #[test]
    fn test_first_relation_wins() {
        let features = vec![feature("way", 1), feature("relation", 2), feature("relation", 3)];
        let selected = select_relation(features, 2).unwrap();
        assert_eq!(selected.property("id").unwrap(), 2);
    }

    #[test]
    fn test_no_relation() {
        let features = vec![feature("way", 1), feature("node", 2)];
        assert!(matches!(
            select_relation(features, 99),
            Err(ClipError::BoundaryNotFound(99))
        ));
        assert!(matches!(
            select_relation(vec![], 5),
            Err(ClipError::BoundaryNotFound(5))
        ));
    }
}

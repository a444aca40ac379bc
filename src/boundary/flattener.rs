//! Decomposition of a boundary relation into simple polygons.

use geo::{Geometry, Polygon};
use geojson::Feature;
use tracing::{debug, info};

use crate::error::{ClipError, Result};

/// One simple polygon of a flattened boundary
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub feature: Feature,
    pub polygon: Polygon<f64>,
}

/// Ordered polygons whose union is the boundary area
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    parts: Vec<BoundaryPolygon>,
}

impl BoundarySet {
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&BoundaryPolygon> {
        self.parts.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryPolygon> {
        self.parts.iter()
    }

    /// Polygon features in set order, ready to write out
    pub fn features(&self) -> Vec<Feature> {
        self.parts.iter().map(|p| p.feature.clone()).collect()
    }
}

impl FromIterator<Polygon<f64>> for BoundarySet {
    fn from_iter<I: IntoIterator<Item = Polygon<f64>>>(iter: I) -> Self {
        Self {
            parts: iter
                .into_iter()
                .map(|polygon| BoundaryPolygon {
                    feature: polygon_feature(&polygon, None),
                    polygon,
                })
                .collect(),
        }
    }
}

/// Flatten a boundary feature into simple polygon features.
///
/// Multi-polygons yield one feature per part, geometry collections are
/// walked depth-first. Points and lines are skipped; degenerate polygons
/// are kept. Each part carries the relation's properties.
pub fn flatten(boundary: &Feature) -> Result<BoundarySet> {
    let geometry = boundary
        .geometry
        .as_ref()
        .ok_or_else(|| ClipError::MalformedBoundary("feature has no geometry".into()))?;

    let geometry = geo_types::Geometry::<f64>::try_from(geometry.clone())
        .map_err(|e| ClipError::MalformedBoundary(e.to_string()))?;

    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);

    if polygons.is_empty() {
        return Err(ClipError::MalformedBoundary(
            "only point or line members found".into(),
        ));
    }

    let parts = polygons
        .into_iter()
        .map(|polygon| BoundaryPolygon {
            feature: polygon_feature(&polygon, boundary.properties.clone()),
            polygon,
        })
        .collect::<Vec<_>>();

    info!("Boundary flattened into {} polygons", parts.len());
    Ok(BoundarySet { parts })
}

fn collect_polygons(geometry: Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p),
        Geometry::MultiPolygon(mp) => out.extend(mp),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for member in gc {
                collect_polygons(member, out);
            }
        }
        other => debug!("Skipping non-areal boundary member: {:?}", other),
    }
}

fn polygon_feature(polygon: &Polygon<f64>, properties: Option<geojson::JsonObject>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(polygon))),
        id: None,
        properties,
        foreign_members: None,
    }
}

//! Containment filter for street features.

use geo::{BoundingRect, Coord, Geometry, LineString, Polygon};
use geojson::Feature;
use tracing::{debug, info};

use super::{BoundaryIndex, BoundarySet};

/// Keep the candidates covered by at least one boundary polygon.
///
/// Stable: retained features keep their input order. Features with a
/// missing, unreadable, empty or structurally invalid geometry are treated
/// as not contained and dropped rather than failing the run.
pub fn filter_contained(candidates: &[Feature], boundaries: &BoundarySet) -> Vec<Feature> {
    let index = BoundaryIndex::build(boundaries);

    let retained: Vec<Feature> = candidates
        .iter()
        .enumerate()
        .filter(|(position, feature)| match candidate_geometry(feature) {
            Some(geometry) => index.first_covering(&geometry).is_some(),
            None => {
                debug!("Dropping feature #{} without usable geometry", position);
                false
            }
        })
        .map(|(_, feature)| feature.clone())
        .collect();

    info!("Filtered features: {} of {}", retained.len(), candidates.len());
    retained
}

/// Geometry of a candidate, or `None` when it cannot be tested
fn candidate_geometry(feature: &Feature) -> Option<Geometry<f64>> {
    let geometry = feature.geometry.as_ref()?;
    let geometry = geo_types::Geometry::<f64>::try_from(geometry.clone()).ok()?;
    // empty geometries have no extent
    geometry.bounding_rect()?;
    is_testable(&geometry).then_some(geometry)
}

/// Structural checks the containment predicate relies on: finite
/// coordinates, lines of at least 2 points, rings of at least 4, and no
/// empty members in multi-geometries.
fn is_testable(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Point(p) => is_finite(&p.0),
        Geometry::Line(l) => is_finite(&l.start) && is_finite(&l.end),
        Geometry::LineString(ls) => is_line(ls),
        Geometry::Polygon(p) => is_areal(p),
        Geometry::MultiPoint(mp) => !mp.0.is_empty() && mp.iter().all(|p| is_finite(&p.0)),
        Geometry::MultiLineString(mls) => !mls.0.is_empty() && mls.iter().all(is_line),
        Geometry::MultiPolygon(mp) => !mp.0.is_empty() && mp.iter().all(is_areal),
        Geometry::GeometryCollection(gc) => !gc.0.is_empty() && gc.iter().all(is_testable),
        Geometry::Rect(r) => is_finite(&r.min()) && is_finite(&r.max()),
        Geometry::Triangle(t) => t.to_array().iter().all(is_finite),
    }
}

fn is_finite(coord: &Coord<f64>) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}

fn is_line(line: &LineString<f64>) -> bool {
    line.0.len() >= 2 && line.0.iter().all(is_finite)
}

fn is_ring(ring: &LineString<f64>) -> bool {
    ring.0.len() >= 4 && ring.0.iter().all(is_finite)
}

fn is_areal(polygon: &Polygon<f64>) -> bool {
    is_ring(polygon.exterior()) && polygon.interiors().iter().all(is_ring)
}

use geo::{Coord, Geometry, GeometryCollection, LineString, MultiPolygon, Polygon, Relate};
use tracing::warn;

/// Boundary-inclusive containment: every point of `candidate` lies in the
/// interior or on the boundary of `polygon`.
pub fn polygon_covers(polygon: &Polygon<f64>, candidate: &Geometry<f64>) -> bool {
    candidate.relate(polygon).is_coveredby()
}

/// Result of stitching member ways together
#[derive(Debug, Default)]
pub struct StitchedRings {
    pub closed: Vec<LineString<f64>>,
    /// Chains that never closed
    pub open: Vec<LineString<f64>>,
}

/// Stitch way segments sharing endpoints into rings.
///
/// Segments may be given in any order and direction. Unlike a plain
/// "close if possible", a chain only becomes a ring when its ends meet.
pub fn stitch_rings(segments: Vec<Vec<Coord<f64>>>) -> StitchedRings {
    let mut result = StitchedRings::default();
    let mut remaining: Vec<Vec<Coord<f64>>> =
        segments.into_iter().filter(|s| s.len() >= 2).collect();

    while !remaining.is_empty() {
        let mut current = remaining.remove(0);

        let mut merged = true;
        while merged && !is_closed(&current) && !remaining.is_empty() {
            merged = false;

            let current_start = current.first().cloned();
            let current_end = current.last().cloned();

            for i in 0..remaining.len() {
                let ring_start = remaining[i].first().cloned();
                let ring_end = remaining[i].last().cloned();

                if current_end == ring_start {
                    let mut ring = remaining.remove(i);
                    ring.remove(0);
                    current.extend(ring);
                } else if current_end == ring_end {
                    let mut ring = remaining.remove(i);
                    ring.reverse();
                    ring.remove(0);
                    current.extend(ring);
                } else if current_start == ring_end {
                    let mut ring = remaining.remove(i);
                    ring.pop();
                    ring.extend(current);
                    current = ring;
                } else if current_start == ring_start {
                    let mut ring = remaining.remove(i);
                    ring.reverse();
                    ring.pop();
                    ring.extend(current);
                    current = ring;
                } else {
                    continue;
                }
                merged = true;
                break;
            }
        }

        if is_closed(&current) {
            result.closed.push(LineString::new(current));
        } else {
            result.open.push(LineString::new(current));
        }
    }

    result
}

fn is_closed(coords: &[Coord<f64>]) -> bool {
    coords.len() >= 4 && coords.first() == coords.last()
}

/// Build a boundary geometry from stitched outer and inner rings.
///
/// Each inner ring becomes a hole of the first outer polygon covering it.
/// Without any closed outer ring the open chains are returned as lines.
pub fn assemble_boundary(outer: StitchedRings, inner: StitchedRings) -> Option<Geometry<f64>> {
    if outer.closed.is_empty() {
        let lines: Vec<Geometry<f64>> = outer
            .open
            .into_iter()
            .chain(inner.open)
            .chain(inner.closed)
            .map(Geometry::LineString)
            .collect();
        if lines.is_empty() {
            return None;
        }
        return Some(Geometry::GeometryCollection(GeometryCollection::from(lines)));
    }

    let mut polygons: Vec<Polygon<f64>> = outer
        .closed
        .into_iter()
        .map(|ring| Polygon::new(ring, vec![]))
        .collect();

    for hole in inner.closed {
        let hole_geometry = Geometry::LineString(hole);
        match polygons.iter_mut().find(|p| polygon_covers(p, &hole_geometry)) {
            Some(polygon) => {
                if let Geometry::LineString(ring) = hole_geometry {
                    polygon.interiors_push(ring);
                }
            }
            None => warn!("Dropping inner ring outside every outer ring"),
        }
    }

    if polygons.len() == 1 {
        polygons.pop().map(Geometry::Polygon)
    } else {
        Some(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, point, Area};

    fn square(min: f64, max: f64) -> Vec<Coord<f64>> {
        vec![
            coord! { x: min, y: min },
            coord! { x: max, y: min },
            coord! { x: max, y: max },
            coord! { x: min, y: max },
            coord! { x: min, y: min },
        ]
    }

    #[test]
    fn test_closed_ring_kept() {
        let rings = stitch_rings(vec![square(0.0, 1.0)]);
        assert_eq!(rings.closed.len(), 1);
        assert!(rings.open.is_empty());
    }

    #[test]
    fn test_split_ring_in_any_order() {
        let p1 = coord! { x: 0.0, y: 0.0 };
        let p2 = coord! { x: 1.0, y: 0.0 };
        let p3 = coord! { x: 1.0, y: 1.0 };
        let p4 = coord! { x: 0.0, y: 1.0 };

        let rings = stitch_rings(vec![vec![p3, p4, p1], vec![p1, p2, p3]]);
        assert_eq!(rings.closed.len(), 1);

        // second segment reversed
        let rings = stitch_rings(vec![vec![p1, p2, p3], vec![p1, p4, p3]]);
        assert_eq!(rings.closed.len(), 1);
        assert_eq!(rings.closed[0].0.len(), 5);
    }

    #[test]
    fn test_gap_stays_open() {
        let p1 = coord! { x: 0.0, y: 0.0 };
        let p2 = coord! { x: 1.0, y: 0.0 };
        let p3 = coord! { x: 1.0, y: 1.0 };
        let p4 = coord! { x: 0.0, y: 1.0 };

        let rings = stitch_rings(vec![vec![p1, p2], vec![p3, p4]]);
        assert!(rings.closed.is_empty());
        assert_eq!(rings.open.len(), 2);

        // a three point chain is not silently closed
        let rings = stitch_rings(vec![vec![p1, p2, p3]]);
        assert!(rings.closed.is_empty());
    }

    #[test]
    fn test_inner_ring_becomes_hole() {
        let outer = stitch_rings(vec![square(0.0, 10.0)]);
        let inner = stitch_rings(vec![square(2.0, 4.0)]);
        let geometry = assemble_boundary(outer, inner).unwrap();
        match geometry {
            Geometry::Polygon(p) => {
                assert_eq!(p.interiors().len(), 1);
                assert_eq!(p.unsigned_area(), 96.0);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_two_outers_make_multipolygon() {
        let outer = stitch_rings(vec![square(0.0, 1.0), square(5.0, 6.0)]);
        let geometry = assemble_boundary(outer, StitchedRings::default()).unwrap();
        assert!(matches!(geometry, Geometry::MultiPolygon(ref mp) if mp.0.len() == 2));
    }

    #[test]
    fn test_open_outer_yields_lines() {
        let outer = stitch_rings(vec![vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
        ]]);
        let geometry = assemble_boundary(outer, StitchedRings::default()).unwrap();
        assert!(matches!(geometry, Geometry::GeometryCollection(ref gc) if gc.0.len() == 1));
        assert!(assemble_boundary(StitchedRings::default(), StitchedRings::default()).is_none());
    }

    #[test]
    fn test_covers_is_boundary_inclusive() {
        let unit = Polygon::new(LineString::new(square(0.0, 1.0)), vec![]);
        assert!(polygon_covers(&unit, &point!(x: 0.5, y: 0.5).into()));
        assert!(polygon_covers(&unit, &point!(x: 1.0, y: 0.5).into()));
        assert!(!polygon_covers(&unit, &point!(x: 1.5, y: 0.5).into()));
    }
}

//! Bounding-box pre-filter over boundary polygons.

use geo::{BoundingRect, Geometry, Rect};
use rstar::{Envelope, RTree, RTreeObject, AABB};
use tracing::debug;

use super::geometry::polygon_covers;
use super::BoundarySet;

/// Wrapper for R-tree indexing of one boundary polygon
#[derive(Clone)]
struct IndexedPolygon {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_aabb(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Spatial index answering "which boundary polygon covers this geometry"
pub struct BoundaryIndex<'a> {
    boundaries: &'a BoundarySet,
    tree: RTree<IndexedPolygon>,
}

impl<'a> BoundaryIndex<'a> {
    pub fn build(boundaries: &'a BoundarySet) -> Self {
        // empty polygons have no envelope and cover nothing
        let indexed: Vec<IndexedPolygon> = boundaries
            .iter()
            .enumerate()
            .filter_map(|(position, part)| {
                let rect = part.polygon.bounding_rect()?;
                Some(IndexedPolygon {
                    position,
                    envelope: to_aabb(rect),
                })
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        debug!("Boundary index built with {} entries", tree.size());

        Self { boundaries, tree }
    }

    /// Position of the first boundary, in set order, covering `candidate`.
    ///
    /// Only polygons whose envelope contains the candidate's envelope are
    /// tested exactly, which cannot change the answer.
    pub fn first_covering(&self, candidate: &Geometry<f64>) -> Option<usize> {
        let query = to_aabb(candidate.bounding_rect()?);

        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .filter(|ip| ip.envelope.contains_envelope(&query))
            .map(|ip| ip.position)
            .collect();
        positions.sort_unstable();

        positions.into_iter().find(|&position| {
            self.boundaries
                .get(position)
                .map(|part| polygon_covers(&part.polygon, candidate))
                .unwrap_or(false)
        })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

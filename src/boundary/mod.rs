//! Administrative boundary handling.
//!
//! Resolves a boundary relation, flattens it into simple polygons and
//! filters street features by containment using an R-tree pre-filter.

mod filter;
mod flattener;
pub mod geometry;
mod index;
mod overpass;
mod resolver;

pub use filter::filter_contained;
pub use flattener::{flatten, BoundaryPolygon, BoundarySet};
pub use index::BoundaryIndex;
pub use overpass::{relation_features, Element, Member, OverpassResolver, OverpassResponse};
pub use resolver::{select_relation, BoundaryResolver, RELATION_TYPE};

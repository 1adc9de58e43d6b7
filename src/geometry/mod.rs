//! Geometries derived from an ordered survey point collection.

pub mod aggregator;
pub mod feature;
pub mod shape;

pub use aggregator::{FrameCoordinates, OutputFrame};
pub use feature::Feature;
pub use shape::{signed_area, Coordinate, Geometry, ShapeKind};

pub mod datum;
pub mod plane_rectangular;
pub mod transformer;
pub mod transverse_mercator;
pub mod utm;

pub use datum::{Datum, Ellipsoid};
pub use plane_rectangular::{epsg_from_logger_crs, PlaneZone};
pub use transformer::{
    CoordinateTransformer, Projected, ProjectionKey, ProjectionMode, ProjectionZone,
};
pub use transverse_mercator::TransverseMercator;
pub use utm::UtmZone;

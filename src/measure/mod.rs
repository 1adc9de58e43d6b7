//! Pairwise measurements between survey points.

pub mod angle;
pub mod distance;
pub mod traverse;

pub use angle::AngleCalculator;
pub use distance::DistanceCalculator;
pub use traverse::{TraverseLeg, TraverseTable};

use crate::error::Result;
use crate::models::SurveyPoint;
use crate::projection::{CoordinateTransformer, Datum, Projected};

/// Planar coordinates of two points in one shared frame.
///
/// When both points already carry cached projections with the same key on
/// `datum` those are used as they are; otherwise both are projected into the
/// UTM zone of their mean position.
pub(crate) fn project_pair(
    transformer: &CoordinateTransformer,
    datum: Datum,
    a: &SurveyPoint,
    b: &SurveyPoint,
) -> Result<(Projected, Projected)> {
    if let (Some(pa), Some(pb)) = (a.cached_projection(), b.cached_projection()) {
        if pa.key == pb.key && pa.key.datum == datum && !pa.key.is_geographic() {
            return Ok((*pa, *pb));
        }
    }

    let positions = [a.require_position()?, b.require_position()?];
    let key = transformer.common_utm_key(&positions, datum)?;
    Ok((
        transformer.forward(positions[0], key),
        transformer.forward(positions[1], key),
    ))
}

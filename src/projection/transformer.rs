use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

use super::datum::Datum;
use super::plane_rectangular::PlaneZone;
use super::utm::UtmZone;
use crate::error::{Result, SurveyError};
use crate::models::{GeodeticPosition, SurveyPoint};

/// Target coordinate frame family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Japanese plane rectangular system, zone chosen per point.
    PlaneRectangular,
    /// UTM, zone estimated per point.
    Utm,
    /// Geographic coordinates returned unchanged.
    Passthrough,
}

/// A concrete zone within a [`ProjectionMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionZone {
    Plane(PlaneZone),
    Utm(UtmZone),
    Geographic,
}

impl ProjectionZone {
    pub fn mode(&self) -> ProjectionMode {
        match self {
            ProjectionZone::Plane(_) => ProjectionMode::PlaneRectangular,
            ProjectionZone::Utm(_) => ProjectionMode::Utm,
            ProjectionZone::Geographic => ProjectionMode::Passthrough,
        }
    }
}

impl fmt::Display for ProjectionZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionZone::Plane(zone) => write!(f, "plane rectangular {}", zone),
            ProjectionZone::Utm(zone) => write!(f, "{}", zone),
            ProjectionZone::Geographic => f.write_str("geographic"),
        }
    }
}

/// Identifies one projected frame: datum plus zone (the zone variant carries the mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectionKey {
    pub datum: Datum,
    pub zone: ProjectionZone,
}

impl ProjectionKey {
    pub fn new(datum: Datum, zone: ProjectionZone) -> Self {
        Self { datum, zone }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.zone.mode()
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self.zone, ProjectionZone::Geographic)
    }

    pub fn epsg(&self) -> Option<u32> {
        match self.zone {
            ProjectionZone::Plane(zone) => zone.epsg(self.datum),
            ProjectionZone::Utm(zone) => zone.epsg(self.datum),
            ProjectionZone::Geographic => Some(self.datum.geographic_epsg()),
        }
    }
}

/// Easting/northing of a point in the frame named by `key`. For geographic
/// keys these are longitude/latitude degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub key: ProjectionKey,
    pub easting: f64,
    pub northing: f64,
}

impl Projected {
    /// Planar Euclidean distance. Only meaningful between points of the same key.
    pub fn planar_distance(&self, other: &Projected) -> f64 {
        (other.easting - self.easting).hypot(other.northing - self.northing)
    }
}

/// Projects survey points between geodetic coordinates and planar frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Project `point` on the datum named `datum_name` into `mode`, choosing
    /// the zone from the point itself.
    pub fn project(
        &self,
        point: &SurveyPoint,
        datum_name: &str,
        mode: ProjectionMode,
    ) -> Result<Projected> {
        let datum = Datum::parse(datum_name)?;
        let key = self.resolve(point, datum, mode)?;
        self.project_into(point, key)
    }

    /// Project `point` into an already resolved frame.
    pub fn project_into(&self, point: &SurveyPoint, key: ProjectionKey) -> Result<Projected> {
        let position = point.require_position()?;
        Ok(self.forward(position, key))
    }

    /// Like [`CoordinateTransformer::project`], but reuses and refreshes the
    /// projection cached on the point.
    pub fn project_cached(
        &self,
        point: &mut SurveyPoint,
        datum_name: &str,
        mode: ProjectionMode,
    ) -> Result<Projected> {
        let datum = Datum::parse(datum_name)?;
        let key = self.resolve(point, datum, mode)?;
        if let Some(cached) = point.cached_projection_for(&key) {
            trace!(point = %point.describe(), "projection cache hit");
            return Ok(cached);
        }

        let projected = self.project_into(point, key)?;
        if !key.is_geographic() {
            point.store_projection(projected);
        }
        Ok(projected)
    }

    /// Resolve the frame `point` projects into for `datum` and `mode`.
    ///
    /// Plane rectangular mode honours an EPSG code supplied by the logger and
    /// otherwise selects the zone from the coordinates.
    pub fn resolve(
        &self,
        point: &SurveyPoint,
        datum: Datum,
        mode: ProjectionMode,
    ) -> Result<ProjectionKey> {
        let position = point.require_position()?;
        self.resolve_position(position, point.epsg, datum, mode)
    }

    pub(crate) fn resolve_position(
        &self,
        position: GeodeticPosition,
        epsg: Option<u32>,
        datum: Datum,
        mode: ProjectionMode,
    ) -> Result<ProjectionKey> {
        let zone = match mode {
            ProjectionMode::PlaneRectangular => {
                if !datum.supports_plane_rectangular() {
                    return Err(SurveyError::UnsupportedDatum(format!(
                        "{} has no plane rectangular coordinate system",
                        datum
                    )));
                }
                let logger_zone = epsg
                    .and_then(PlaneZone::from_epsg)
                    .map(|(_, zone)| zone);
                let zone = match logger_zone {
                    Some(zone) => zone,
                    None => PlaneZone::select(position.longitude, position.latitude)?,
                };
                ProjectionZone::Plane(zone)
            }
            ProjectionMode::Utm => {
                ProjectionZone::Utm(UtmZone::estimate(position.longitude, position.latitude)?)
            }
            ProjectionMode::Passthrough => ProjectionZone::Geographic,
        };
        Ok(ProjectionKey::new(datum, zone))
    }

    /// Forward projection of a bare position.
    pub fn forward(&self, position: GeodeticPosition, key: ProjectionKey) -> Projected {
        let (easting, northing) = match key.zone {
            ProjectionZone::Plane(zone) => zone
                .projection(key.datum)
                .forward(position.longitude, position.latitude),
            ProjectionZone::Utm(zone) => zone
                .projection(key.datum)
                .forward(position.longitude, position.latitude),
            ProjectionZone::Geographic => (position.longitude, position.latitude),
        };
        Projected {
            key,
            easting,
            northing,
        }
    }

    /// Inverse projection back to geodetic coordinates on the key's datum.
    pub fn unproject(&self, projected: &Projected) -> GeodeticPosition {
        let (longitude, latitude) = match projected.key.zone {
            ProjectionZone::Plane(zone) => zone
                .projection(projected.key.datum)
                .inverse(projected.easting, projected.northing),
            ProjectionZone::Utm(zone) => zone
                .projection(projected.key.datum)
                .inverse(projected.easting, projected.northing),
            ProjectionZone::Geographic => (projected.easting, projected.northing),
        };
        GeodeticPosition::new(longitude, latitude)
    }

    /// Project every positioned point of `points` into one shared frame: the
    /// UTM zone estimated from their mean position. Points without a position
    /// are skipped.
    pub fn project_common_utm<'a, I>(&self, points: I, datum: Datum) -> Result<Vec<Projected>>
    where
        I: IntoIterator<Item = &'a SurveyPoint>,
    {
        let positions: Vec<GeodeticPosition> =
            points.into_iter().filter_map(|p| p.position()).collect();
        let key = self.common_utm_key(&positions, datum)?;
        debug!(zone = %key.zone, count = positions.len(), "projecting into shared UTM zone");
        Ok(positions.into_iter().map(|p| self.forward(p, key)).collect())
    }

    /// UTM frame estimated from the mean of `positions`.
    pub fn common_utm_key(
        &self,
        positions: &[GeodeticPosition],
        datum: Datum,
    ) -> Result<ProjectionKey> {
        if positions.is_empty() {
            return Err(SurveyError::IncompleteGeometry(
                "no positioned points to choose a UTM zone from".to_string(),
            ));
        }
        let count = positions.len() as f64;
        let longitude = positions.iter().map(|p| p.longitude).sum::<f64>() / count;
        let latitude = positions.iter().map(|p| p.latitude).sum::<f64>() / count;
        let zone = UtmZone::estimate(longitude, latitude)?;
        Ok(ProjectionKey::new(datum, ProjectionZone::Utm(zone)))
    }
}

impl From<PlaneZone> for ProjectionZone {
    fn from(zone: PlaneZone) -> Self {
        ProjectionZone::Plane(zone)
    }
}

impl From<UtmZone> for ProjectionZone {
    fn from(zone: UtmZone) -> Self {
        ProjectionZone::Utm(zone)
    }
}

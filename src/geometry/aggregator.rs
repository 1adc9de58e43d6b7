use serde::{Deserialize, Serialize};
use tracing::debug;

use super::shape::{Coordinate, Geometry, ShapeKind};
use crate::error::{Result, SurveyError};
use crate::measure::DistanceCalculator;
use crate::models::{SurveyPoint, SurveyPointCollection};
use crate::projection::{
    CoordinateTransformer, ProjectionKey, ProjectionMode, ProjectionZone, UtmZone,
};
use crate::utils::SQUARE_METRES_PER_HECTARE;

/// Coordinate frame derived geometries are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFrame {
    /// Longitude/latitude degrees.
    #[default]
    Geodetic,
    /// Plane rectangular (easting Y, northing X); every member must fall in one zone.
    PlaneRectangular,
    /// UTM, one zone for the whole collection estimated from its first member.
    Utm,
}

impl OutputFrame {
    /// Frame from the `jgd` / `utm` switches of export requests; `jgd` wins
    /// when both are set.
    pub fn from_flags(jgd: bool, utm: bool) -> Self {
        match (jgd, utm) {
            (true, _) => OutputFrame::PlaneRectangular,
            (false, true) => OutputFrame::Utm,
            (false, false) => OutputFrame::Geodetic,
        }
    }
}

/// Coordinates of every member in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCoordinates {
    pub key: ProjectionKey,
    pub coordinates: Vec<Coordinate>,
}

impl SurveyPointCollection {
    /// Coordinates of all members, in order, in `frame`. Every member must be
    /// positioned.
    pub fn coordinates(&self, frame: OutputFrame) -> Result<FrameCoordinates> {
        let first = self.first().ok_or_else(|| {
            SurveyError::IncompleteGeometry("the collection is empty".to_string())
        })?;
        let transformer = CoordinateTransformer::new();
        let datum = self.datum();

        let key = match frame {
            OutputFrame::Geodetic => ProjectionKey::new(datum, ProjectionZone::Geographic),
            OutputFrame::Utm => {
                let position = require_position(first)?;
                let zone = UtmZone::estimate(position.longitude, position.latitude)?;
                ProjectionKey::new(datum, ProjectionZone::Utm(zone))
            }
            OutputFrame::PlaneRectangular => {
                return self.plane_coordinates(&transformer);
            }
        };

        let coordinates = self
            .iter()
            .map(|point| -> Result<Coordinate> {
                let projected = transformer.forward(require_position(point)?, key);
                Ok((projected.easting, projected.northing))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FrameCoordinates { key, coordinates })
    }

    /// Build `kind` in `frame`.
    pub fn shape(&self, kind: ShapeKind, frame: OutputFrame) -> Result<Geometry> {
        let FrameCoordinates { key, coordinates } = self.coordinates(frame)?;
        debug!(?kind, zone = %key.zone, points = coordinates.len(), "building geometry");
        Geometry::from_coordinates(kind, coordinates)
    }

    pub fn as_points(&self, frame: OutputFrame) -> Result<Geometry> {
        self.shape(ShapeKind::Point, frame)
    }

    pub fn as_linestring(&self, frame: OutputFrame) -> Result<Geometry> {
        self.shape(ShapeKind::LineString, frame)
    }

    pub fn as_polygon(&self, frame: OutputFrame) -> Result<Geometry> {
        self.shape(ShapeKind::Polygon, frame)
    }

    /// Polygon area in hectares, rounded to 5 decimals.
    pub fn area_ha(&self) -> Result<f64> {
        let area = self.as_polygon(self.measurement_frame())?.area();
        Ok(round_to(area / SQUARE_METRES_PER_HECTARE, 5))
    }

    /// Horizontal length of the path through all members in metres, rounded
    /// to millimetres.
    pub fn length_m(&self) -> Result<f64> {
        let length = self.as_linestring(self.measurement_frame())?.length();
        Ok(round_to(length, 3))
    }

    /// Sum of slope distances between consecutive members, rounded to millimetres.
    pub fn slope_length_m(&self) -> Result<f64> {
        let points: Vec<&SurveyPoint> = self.iter().collect();
        if points.len() < 2 {
            return Err(SurveyError::IncompleteGeometry(format!(
                "a slope length needs at least 2 points, got {}",
                points.len()
            )));
        }

        let calculator = DistanceCalculator::with_datum(self.datum());
        let mut length = 0.0;
        for pair in points.windows(2) {
            length += calculator.slope_distance(pair[0], pair[1])?;
        }
        Ok(round_to(length, 3))
    }

    /// Sessions whose logger reported a plane rectangular CRS are measured in
    /// it; all others in UTM.
    fn measurement_frame(&self) -> OutputFrame {
        match self.first().and_then(|p| p.epsg) {
            Some(_) => OutputFrame::PlaneRectangular,
            None => OutputFrame::Utm,
        }
    }

    fn plane_coordinates(&self, transformer: &CoordinateTransformer) -> Result<FrameCoordinates> {
        let datum = self.datum();
        let mut frame_key: Option<ProjectionKey> = None;
        let mut coordinates = Vec::with_capacity(self.len());

        for point in self.iter() {
            let cached = point.cached_projection().filter(|p| {
                p.key.datum == datum && p.key.mode() == ProjectionMode::PlaneRectangular
            });
            let projected = match cached {
                Some(projected) => *projected,
                None => {
                    require_position(point)?;
                    let key = transformer.resolve(point, datum, ProjectionMode::PlaneRectangular)?;
                    transformer.project_into(point, key)?
                }
            };

            match frame_key {
                None => frame_key = Some(projected.key),
                Some(key) if key != projected.key => {
                    return Err(SurveyError::IncompleteGeometry(format!(
                        "{} lies in {} but the collection is in {}",
                        point.describe(),
                        projected.key.zone,
                        key.zone
                    )));
                }
                Some(_) => {}
            }
            coordinates.push((projected.easting, projected.northing));
        }

        let key = frame_key.ok_or_else(|| {
            SurveyError::IncompleteGeometry("the collection is empty".to_string())
        })?;
        Ok(FrameCoordinates { key, coordinates })
    }
}

fn require_position(point: &SurveyPoint) -> Result<crate::models::GeodeticPosition> {
    point.position().ok_or_else(|| {
        SurveyError::IncompleteGeometry(format!("{} has no coordinates", point.describe()))
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeodeticPosition, SortColumn};
    use crate::projection::PlaneZone;
    use pretty_assertions::assert_eq;

    fn point(number: u32, longitude: f64, latitude: f64) -> SurveyPoint {
        let mut point = SurveyPoint {
            point_number: Some(number),
            altitude: Some(100.0),
            ..Default::default()
        };
        point.set_position(Some(GeodeticPosition::new(longitude, latitude)));
        point
    }

    fn collection(points: Vec<SurveyPoint>) -> SurveyPointCollection {
        SurveyPointCollection::new(points, SortColumn::PointNumber, false)
    }

    #[test]
    fn test_frame_flags() {
        assert_eq!(OutputFrame::from_flags(false, false), OutputFrame::Geodetic);
        assert_eq!(OutputFrame::from_flags(true, false), OutputFrame::PlaneRectangular);
        assert_eq!(OutputFrame::from_flags(false, true), OutputFrame::Utm);
        assert_eq!(OutputFrame::from_flags(true, true), OutputFrame::PlaneRectangular);
    }

    #[test]
    fn test_geodetic_points() {
        let c = collection(vec![point(1, 141.0, 40.0), point(2, 140.0, 41.0)]);
        let points = c.as_points(OutputFrame::Geodetic).unwrap();
        assert_eq!(points.coordinates(), &[(141.0, 40.0), (140.0, 41.0)]);
        assert_eq!(points.points()[0], Geometry::Point((141.0, 40.0)));
    }

    #[test]
    fn test_logger_plane_coordinates_are_used() {
        let mut points = vec![
            point(1, 141.0, 40.0),
            point(2, 140.0, 41.0),
            point(3, 139.0, 42.0),
        ];
        for (i, p) in points.iter_mut().enumerate() {
            p.epsg = Some(6678);
            p.set_logger_projection(i as f64 + 0.1, i as f64).unwrap();
        }
        let c = collection(points);

        let FrameCoordinates { key, coordinates } =
            c.coordinates(OutputFrame::PlaneRectangular).unwrap();
        assert_eq!(key.zone, ProjectionZone::Plane(PlaneZone::new(10).unwrap()));
        assert_eq!(coordinates[0], (0.0, 0.1));
        assert_eq!(coordinates[2], (2.0, 2.1));
    }

    #[test]
    fn test_plane_frame_rejects_mixed_zones() {
        // Aomori (zone X) and Tokyo (zone IX)
        let c = collection(vec![point(1, 140.74, 40.82), point(2, 139.69, 35.69)]);
        assert!(matches!(
            c.as_linestring(OutputFrame::PlaneRectangular),
            Err(SurveyError::IncompleteGeometry(_))
        ));
    }

    #[test]
    fn test_utm_frame_uses_first_member() {
        // The first member sits on the 141°E meridian of UTM 54
        let c = collection(vec![point(1, 141.0, 40.0), point(2, 140.0, 41.0)]);
        let FrameCoordinates { key, coordinates } = c.coordinates(OutputFrame::Utm).unwrap();
        assert_eq!(key.epsg(), Some(6691));
        assert!((coordinates[0].0 - 500_000.0).abs() < 1e-6);
        assert!((coordinates[0].1 - 4_427_757.2186).abs() < 1e-3);
    }

    #[test]
    fn test_polygon_ring_closes() {
        let c = collection(vec![
            point(1, 141.0, 40.0),
            point(2, 141.001, 40.0),
            point(3, 141.001, 40.001),
        ]);
        let polygon = c.as_polygon(OutputFrame::Utm).unwrap();
        let ring = polygon.coordinates();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);
        assert!(polygon.to_wkt().starts_with("POLYGON (("));
    }

    #[test]
    fn test_missing_coordinates() {
        let mut points = vec![point(1, 141.0, 40.0), point(2, 141.001, 40.0)];
        points[1].set_position(None);
        let c = collection(points);
        assert!(matches!(
            c.as_linestring(OutputFrame::Geodetic),
            Err(SurveyError::IncompleteGeometry(_))
        ));
        assert!(matches!(
            collection(vec![]).as_points(OutputFrame::Utm),
            Err(SurveyError::IncompleteGeometry(_))
        ));
    }

    #[test]
    fn test_area_and_lengths() {
        // Roughly 100 m x 100 m square near 141°E 40°N
        let dlon = 100.0 / (111_320.0 * 40f64.to_radians().cos());
        let dlat = 100.0 / 111_035.0;
        let mut points = vec![
            point(1, 141.0, 40.0),
            point(2, 141.0 + dlon, 40.0),
            point(3, 141.0 + dlon, 40.0 + dlat),
            point(4, 141.0, 40.0 + dlat),
        ];
        points[2].altitude = Some(110.0);
        let c = collection(points);

        let area = c.area_ha().unwrap();
        assert!((area - 1.0).abs() < 0.01, "area = {}", area);
        let length = c.length_m().unwrap();
        assert!((length - 300.0).abs() < 1.0, "length = {}", length);
        let slope = c.slope_length_m().unwrap();
        assert!(slope > length);
    }
}

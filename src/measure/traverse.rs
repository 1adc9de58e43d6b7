//! Traverse table: azimuth, inclination and distance of every leg between
//! consecutive points, closing from the last point back to the first.

use serde::Serialize;
use tracing::debug;

use super::{AngleCalculator, DistanceCalculator};
use crate::error::{Result, SurveyError};
use crate::models::SurveyPoint;
use crate::projection::Datum;

/// One leg, from the point at `index` to the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraverseLeg {
    pub index: usize,
    pub name: String,
    pub azimuth: f64,
    pub angle: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraverseTable {
    legs: Vec<TraverseLeg>,
}

impl TraverseTable {
    /// Build the table for `points` in order.
    ///
    /// With `slope` the distance is the slope distance and `angle` the
    /// inclination; without it the distance is horizontal and `angle` is 0.
    pub fn build(points: &[&SurveyPoint], datum: Datum, slope: bool) -> Result<Self> {
        if points.len() < 2 {
            return Err(SurveyError::IncompleteGeometry(format!(
                "a traverse needs at least 2 points, got {}",
                points.len()
            )));
        }

        let distances = DistanceCalculator::with_datum(datum);
        let angles = AngleCalculator::with_datum(datum);

        let legs = points
            .iter()
            .enumerate()
            .map(|(index, current)| {
                let forward = points[(index + 1) % points.len()];
                let (angle, distance) = if slope {
                    (
                        angles.inclination_deg(current, forward)?,
                        distances.slope_distance(current, forward)?,
                    )
                } else {
                    (0.0, distances.horizontal_distance(current, forward)?)
                };

                Ok::<_, SurveyError>(TraverseLeg {
                    index,
                    name: current.display_name().unwrap_or_default(),
                    azimuth: round_to(angles.azimuth_deg(current, forward)?, 2),
                    angle: round_to(angle, 2),
                    distance: round_to(distance, 3),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(legs = legs.len(), slope, "built traverse table");
        Ok(Self { legs })
    }

    pub fn legs(&self) -> &[TraverseLeg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Sum of leg distances, closing leg included.
    pub fn total_distance(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance).sum()
    }

    /// Render as CSV with an `index,name,azimuth,angle,distance` header.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.legs.is_empty() {
            writer.write_record(["index", "name", "azimuth", "angle", "distance"])?;
        }
        for leg in &self.legs {
            writer.serialize(leg)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| SurveyError::InvalidFormat(e.to_string()))
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeodeticPosition;
    use pretty_assertions::assert_eq;

    fn point(name: f64, longitude: f64, latitude: f64, altitude: f64) -> SurveyPoint {
        let mut point = SurveyPoint {
            point_name: Some(name),
            altitude: Some(altitude),
            ..Default::default()
        };
        point.set_position(Some(GeodeticPosition::new(longitude, latitude)));
        point
    }

    fn square() -> Vec<SurveyPoint> {
        vec![
            point(1.0, 141.0, 35.0, 100.0),
            point(2.0, 141.0, 35.001, 105.0),
            point(3.0, 141.001, 35.001, 110.0),
            point(4.0, 141.001, 35.0, 105.0),
        ]
    }

    #[test]
    fn test_traverse_closes_back_to_first() {
        let points = square();
        let refs: Vec<&SurveyPoint> = points.iter().collect();
        let table = TraverseTable::build(&refs, Datum::Jgd2011, true).unwrap();

        assert_eq!(table.len(), 4);
        let names: Vec<&str> = table.legs().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3", "4"]);

        // 1 -> 2 heads north and climbs, 4 -> 1 heads west and descends
        assert!(table.legs()[0].azimuth < 1.0 || table.legs()[0].azimuth > 359.0);
        assert!(table.legs()[0].angle > 0.0);
        assert!((table.legs()[3].azimuth - 270.0).abs() < 1.0);
        assert!(table.legs()[3].angle < 0.0);
    }

    #[test]
    fn test_horizontal_traverse_has_flat_angles() {
        let points = square();
        let refs: Vec<&SurveyPoint> = points.iter().collect();
        let flat = TraverseTable::build(&refs, Datum::Jgd2011, false).unwrap();
        let sloped = TraverseTable::build(&refs, Datum::Jgd2011, true).unwrap();

        assert!(flat.legs().iter().all(|leg| leg.angle == 0.0));
        assert!(sloped.total_distance() > flat.total_distance());
    }

    #[test]
    fn test_csv_output() {
        let points = square();
        let refs: Vec<&SurveyPoint> = points.iter().take(2).collect();
        let table = TraverseTable::build(&refs, Datum::Jgd2011, false).unwrap();
        let csv = table.to_csv().unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "index,name,azimuth,angle,distance");
        assert!(lines[1].starts_with("0,1,"));
        assert!(lines[2].starts_with("1,2,"));
    }

    #[test]
    fn test_too_few_points() {
        let points = square();
        let refs: Vec<&SurveyPoint> = points.iter().take(1).collect();
        assert!(matches!(
            TraverseTable::build(&refs, Datum::Jgd2011, true),
            Err(SurveyError::IncompleteGeometry(_))
        ));
        assert_eq!(
            TraverseTable::default().to_csv().unwrap(),
            "index,name,azimuth,angle,distance\n"
        );
    }
}

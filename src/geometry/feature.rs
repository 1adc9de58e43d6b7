use serde::Serialize;
use serde_json::{json, Map, Value};

use super::aggregator::OutputFrame;
use super::shape::{Geometry, ShapeKind};
use crate::analyzers::SessionAnalyzer;
use crate::config::Settings;
use crate::error::Result;
use crate::models::{Language, SurveyPointCollection};

/// A geometry with its attribute mapping, ready for GeoJSON or KML writers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub kind: ShapeKind,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            kind: geometry.kind(),
            geometry,
            properties,
        }
    }

    /// GeoJSON `Feature` object.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": self.geometry,
            "properties": self.properties,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_geojson())?)
    }
}

impl SurveyPointCollection {
    /// One point feature per member, each carrying that member's properties.
    pub fn point_features(
        &self,
        frame: OutputFrame,
        language: Language,
        settings: &Settings,
    ) -> Result<Vec<Feature>> {
        let points = self.as_points(frame)?.points();
        Ok(points
            .into_iter()
            .zip(self.iter())
            .map(|(geometry, point)| Feature::new(geometry, point.properties(language, settings)))
            .collect())
    }

    /// The whole collection as one feature of `kind`, described by the
    /// session summary.
    pub fn feature(
        &self,
        kind: ShapeKind,
        frame: OutputFrame,
        language: Language,
        settings: &Settings,
    ) -> Result<Feature> {
        let geometry = self.shape(kind, frame)?;
        let statistics = SessionAnalyzer::new().analyze(self)?;
        Ok(Feature::new(geometry, statistics.properties(language, settings)))
    }

    /// GeoJSON `FeatureCollection`: the point features for
    /// [`ShapeKind::Point`], otherwise the single session feature.
    pub fn feature_collection(
        &self,
        kind: ShapeKind,
        frame: OutputFrame,
        language: Language,
        settings: &Settings,
    ) -> Result<Value> {
        let features = match kind {
            ShapeKind::Point => self.point_features(frame, language, settings)?,
            _ => vec![self.feature(kind, frame, language, settings)?],
        };
        Ok(json!({
            "type": "FeatureCollection",
            "features": features.iter().map(Feature::to_geojson).collect::<Vec<_>>(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortColumn, SurveyPoint};
    use pretty_assertions::assert_eq;

    fn collection() -> SurveyPointCollection {
        let points = [(141.0, 40.0), (141.001, 40.0), (141.001, 40.001)]
            .iter()
            .map(|&(lon, lat)| {
                SurveyPoint::builder()
                    .group_name("A")
                    .coordinates(lon, lat)
                    .altitude(120.0)
                    .build()
                    .unwrap()
            })
            .collect();
        SurveyPointCollection::new(points, SortColumn::PointNumber, false)
    }

    #[test]
    fn test_point_features() {
        let settings = Settings::default();
        let features = collection()
            .point_features(OutputFrame::Geodetic, Language::En, &settings)
            .unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[1].geometry, Geometry::Point((141.001, 40.0)));
        assert_eq!(features[1].properties["point"], Value::from("A-1"));
        assert_eq!(features[1].kind, ShapeKind::Point);
    }

    #[test]
    fn test_polygon_feature_geojson() {
        let settings = Settings::default();
        let feature = collection()
            .feature(ShapeKind::Polygon, OutputFrame::Utm, Language::Ja, &settings)
            .unwrap();
        let json = feature.to_geojson();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Polygon");
        assert_eq!(json["geometry"]["coordinates"][0].as_array().unwrap().len(), 4);
        assert_eq!(json["properties"]["測点数"], 3);

        let text = feature.to_json().unwrap();
        assert!(text.starts_with('{'));
    }

    #[test]
    fn test_feature_collection() {
        let settings = Settings::default();
        let c = collection();
        let points = c
            .feature_collection(ShapeKind::Point, OutputFrame::Geodetic, Language::En, &settings)
            .unwrap();
        assert_eq!(points["features"].as_array().unwrap().len(), 3);

        let line = c
            .feature_collection(ShapeKind::LineString, OutputFrame::Geodetic, Language::En, &settings)
            .unwrap();
        assert_eq!(line["features"].as_array().unwrap().len(), 1);
        assert_eq!(line["features"][0]["geometry"]["type"], "LineString");
    }
}

use super::project_pair;
use crate::error::Result;
use crate::models::SurveyPoint;
use crate::projection::{CoordinateTransformer, Datum};

/// Horizontal and slope distances in metres.
#[derive(Debug, Clone, Copy)]
pub struct DistanceCalculator {
    datum: Datum,
    transformer: CoordinateTransformer,
}

impl DistanceCalculator {
    pub fn new(datum_name: &str) -> Result<Self> {
        Ok(Self::with_datum(Datum::parse(datum_name)?))
    }

    pub fn with_datum(datum: Datum) -> Self {
        Self {
            datum,
            transformer: CoordinateTransformer::new(),
        }
    }

    pub fn datum(&self) -> Datum {
        self.datum
    }

    pub fn horizontal_distance(&self, a: &SurveyPoint, b: &SurveyPoint) -> Result<f64> {
        let (pa, pb) = project_pair(&self.transformer, self.datum, a, b)?;
        Ok(pa.planar_distance(&pb))
    }

    /// `sqrt(horizontal² + Δh²)`.
    pub fn slope_distance(&self, a: &SurveyPoint, b: &SurveyPoint) -> Result<f64> {
        let horizontal = self.horizontal_distance(a, b)?;
        let dh = a.height_difference(b)?;
        Ok(horizontal.hypot(dh))
    }
}

impl Default for DistanceCalculator {
    fn default() -> Self {
        Self::with_datum(Datum::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;
    use crate::models::GeodeticPosition;
    use crate::projection::ProjectionMode;

    fn point(longitude: f64, latitude: f64, altitude: Option<f64>) -> SurveyPoint {
        let mut point = SurveyPoint {
            altitude,
            ..Default::default()
        };
        point.set_position(Some(GeodeticPosition::new(longitude, latitude)));
        point
    }

    #[test]
    fn test_horizontal_distance() {
        let calculator = DistanceCalculator::new("JGD2011").unwrap();
        let a = point(139.0, 35.0, Some(100.0));
        let b = point(139.001, 35.001, Some(110.0));

        let d = calculator.horizontal_distance(&a, &b).unwrap();
        assert!((d - 143.7).abs() < 1.0, "horizontal = {}", d);
        assert_eq!(d, calculator.horizontal_distance(&b, &a).unwrap());
        assert_eq!(calculator.horizontal_distance(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_slope_distance() {
        let calculator = DistanceCalculator::default();
        let a = point(139.0, 35.0, Some(100.0));
        let b = point(139.001, 35.001, Some(110.0));

        let horizontal = calculator.horizontal_distance(&a, &b).unwrap();
        let slope = calculator.slope_distance(&a, &b).unwrap();
        assert!(slope >= horizontal);
        assert!((slope - (horizontal * horizontal + 100.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_missing_inputs_propagate() {
        let calculator = DistanceCalculator::default();
        let a = point(139.0, 35.0, Some(100.0));

        assert!(matches!(
            calculator.slope_distance(&a, &point(139.001, 35.0, None)),
            Err(SurveyError::MissingHeight(_))
        ));
        assert!(matches!(
            calculator.horizontal_distance(&a, &SurveyPoint::default()),
            Err(SurveyError::MissingCoordinate(_))
        ));
        assert!(matches!(
            DistanceCalculator::new("ED50"),
            Err(SurveyError::UnsupportedDatum(_))
        ));
    }

    #[test]
    fn test_uses_shared_cached_projection() {
        let calculator = DistanceCalculator::default();
        let transformer = CoordinateTransformer::new();
        let mut a = point(139.0, 35.0, None);
        let mut b = point(139.001, 35.001, None);
        let pa = transformer
            .project_cached(&mut a, "JGD2011", ProjectionMode::PlaneRectangular)
            .unwrap();
        let pb = transformer
            .project_cached(&mut b, "JGD2011", ProjectionMode::PlaneRectangular)
            .unwrap();

        let d = calculator.horizontal_distance(&a, &b).unwrap();
        assert_eq!(d, pa.planar_distance(&pb));
        // Plane and UTM scale factors differ, but only slightly.
        let utm = calculator
            .horizontal_distance(&point(139.0, 35.0, None), &point(139.001, 35.001, None))
            .unwrap();
        assert!((d - utm).abs() < 0.1);
    }

    #[test]
    fn test_cache_on_other_datum_is_ignored() {
        let calculator = DistanceCalculator::new("Tokyo").unwrap();
        let transformer = CoordinateTransformer::new();
        let mut a = point(139.0, 35.0, None);
        let mut b = point(139.001, 35.001, None);
        let fresh = calculator.horizontal_distance(&a, &b).unwrap();

        transformer
            .project_cached(&mut a, "JGD2011", ProjectionMode::Utm)
            .unwrap();
        transformer
            .project_cached(&mut b, "JGD2011", ProjectionMode::Utm)
            .unwrap();
        assert_eq!(calculator.horizontal_distance(&a, &b).unwrap(), fresh);
    }
}

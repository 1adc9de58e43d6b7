use super::project_pair;
use crate::error::{Result, SurveyError};
use crate::models::SurveyPoint;
use crate::projection::{CoordinateTransformer, Datum};

/// Inclination and azimuth between two points, in degrees.
#[derive(Debug, Clone, Copy)]
pub struct AngleCalculator {
    datum: Datum,
    transformer: CoordinateTransformer,
}

impl AngleCalculator {
    pub fn new(datum_name: &str) -> Result<Self> {
        Ok(Self::with_datum(Datum::parse(datum_name)?))
    }

    pub fn with_datum(datum: Datum) -> Self {
        Self {
            datum,
            transformer: CoordinateTransformer::new(),
        }
    }

    /// Vertical angle from `a` to `b`, positive when `b` is higher. Coincident
    /// points at the same height give 0.
    pub fn inclination_deg(&self, a: &SurveyPoint, b: &SurveyPoint) -> Result<f64> {
        let dh = a.height_difference(b)?;
        let (pa, pb) = project_pair(&self.transformer, self.datum, a, b)?;
        let horizontal = pa.planar_distance(&pb);

        if horizontal == 0.0 && dh == 0.0 {
            return Ok(0.0);
        }
        Ok(dh.atan2(horizontal).to_degrees())
    }

    /// Bearing from `a` to `b`, clockwise from projected north, in `[0, 360)`.
    pub fn azimuth_deg(&self, a: &SurveyPoint, b: &SurveyPoint) -> Result<f64> {
        let (pa, pb) = project_pair(&self.transformer, self.datum, a, b)?;
        let de = pb.easting - pa.easting;
        let dn = pb.northing - pa.northing;

        if de == 0.0 && dn == 0.0 {
            return Err(SurveyError::UndefinedAzimuth(format!(
                "{} and {} coincide",
                a.describe(),
                b.describe()
            )));
        }

        let azimuth = de.atan2(dn).to_degrees().rem_euclid(360.0);
        // rem_euclid can round a tiny negative angle up to exactly 360
        Ok(if azimuth >= 360.0 { 0.0 } else { azimuth })
    }
}

impl Default for AngleCalculator {
    fn default() -> Self {
        Self::with_datum(Datum::default())
    }
}

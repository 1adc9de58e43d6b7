use std::fmt;

use super::datum::Datum;
use super::transverse_mercator::TransverseMercator;
use crate::error::{Result, SurveyError};

pub const UTM_SCALE_FACTOR: f64 = 0.9996;
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
pub const UTM_SOUTH_FALSE_NORTHING: f64 = 10_000_000.0;

/// A 6° UTM zone and hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtmZone {
    number: u8,
    north: bool,
}

impl UtmZone {
    pub fn new(number: u8, north: bool) -> Option<Self> {
        (1..=60).contains(&number).then_some(Self { number, north })
    }

    /// Estimate the zone from a position: `floor((lon + 180) / 6) + 1`,
    /// hemisphere from the latitude sign. UTM zones are globally exhaustive,
    /// so only non-finite or out-of-range input is rejected.
    pub fn estimate(longitude: f64, latitude: f64) -> Result<Self> {
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return Err(SurveyError::InvalidCoordinate(format!(
                "Cannot estimate a UTM zone for lon={}, lat={}",
                longitude, latitude
            )));
        }

        // lon = 180 belongs to zone 60
        let number = (((longitude + 180.0) / 6.0).floor() as u8 + 1).min(60);
        Ok(Self {
            number,
            north: latitude >= 0.0,
        })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    pub fn central_meridian(&self) -> f64 {
        self.number as f64 * 6.0 - 183.0
    }

    /// EPSG code of the projected CRS for this zone on `datum`, where one is registered.
    pub fn epsg(&self, datum: Datum) -> Option<u32> {
        let number = self.number as u32;
        match datum {
            Datum::Wgs84 if self.north => Some(32600 + number),
            Datum::Wgs84 => Some(32700 + number),
            Datum::Jgd2011 if self.north && (51..=55).contains(&number) => Some(6688 + number - 51),
            Datum::Jgd2000 if self.north && (51..=55).contains(&number) => Some(3097 + number - 51),
            Datum::Tokyo if self.north && (51..=55).contains(&number) => Some(3092 + number - 51),
            _ => None,
        }
    }

    pub fn projection(&self, datum: Datum) -> TransverseMercator {
        let false_northing = if self.north {
            0.0
        } else {
            UTM_SOUTH_FALSE_NORTHING
        };
        TransverseMercator::new(
            datum.ellipsoid(),
            0.0,
            self.central_meridian(),
            UTM_SCALE_FACTOR,
            UTM_FALSE_EASTING,
            false_northing,
        )
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UTM {}{}", self.number, if self.north { 'N' } else { 'S' })
    }
}

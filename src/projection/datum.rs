use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SurveyError};

/// Reference ellipsoid described by its semi-major axis and inverse flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    pub const GRS80: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_222_101,
    };

    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_223_563,
    };

    pub const BESSEL_1841: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_377_397.155,
        inverse_flattening: 299.152_812_8,
    };

    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    /// Third flattening `n = f / (2 - f)`, the expansion parameter of the Krüger series.
    pub fn third_flattening(&self) -> f64 {
        let f = self.flattening();
        f / (2.0 - f)
    }

    /// First eccentricity.
    pub fn eccentricity(&self) -> f64 {
        let f = self.flattening();
        (f * (2.0 - f)).sqrt()
    }
}

/// Geodetic datums the transformer knows how to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    Jgd2011,
    Jgd2000,
    Wgs84,
    Tokyo,
}

impl Datum {
    /// Resolve a datum from the names loggers and users write: `"JGD2011"`,
    /// `"jgd-2000"`, `"WGS 84"`, `"Tokyo"`...
    pub fn parse(name: &str) -> Result<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "JGD2011" | "JGD2011R" => Ok(Datum::Jgd2011),
            "JGD2000" | "JGD2000R" => Ok(Datum::Jgd2000),
            "WGS84" => Ok(Datum::Wgs84),
            "TOKYO" | "TOKYODATUM" => Ok(Datum::Tokyo),
            _ => Err(SurveyError::UnsupportedDatum(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Datum::Jgd2011 => "JGD2011",
            Datum::Jgd2000 => "JGD2000",
            Datum::Wgs84 => "WGS84",
            Datum::Tokyo => "Tokyo",
        }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        match self {
            Datum::Jgd2011 | Datum::Jgd2000 => Ellipsoid::GRS80,
            Datum::Wgs84 => Ellipsoid::WGS84,
            Datum::Tokyo => Ellipsoid::BESSEL_1841,
        }
    }

    /// The plane rectangular coordinate system is only defined on the Japanese datums.
    pub fn supports_plane_rectangular(&self) -> bool {
        !matches!(self, Datum::Wgs84)
    }

    /// EPSG code of the geographic 2D CRS.
    pub fn geographic_epsg(&self) -> u32 {
        match self {
            Datum::Jgd2011 => 6668,
            Datum::Jgd2000 => 4612,
            Datum::Wgs84 => 4326,
            Datum::Tokyo => 4301,
        }
    }
}

impl Default for Datum {
    fn default() -> Self {
        Datum::Jgd2011
    }
}

impl FromStr for Datum {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self> {
        Datum::parse(s)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Japan's plane rectangular coordinate system (zones I to XIX).
//!
//! Each zone is a Gauss-Krüger projection with scale factor 0.9999 around its
//! own origin and no false origin. X is the northing and Y the easting.

use std::fmt;
use tracing::debug;

use super::datum::Datum;
use super::transverse_mercator::TransverseMercator;
use crate::error::{Result, SurveyError};

pub const PLANE_SCALE_FACTOR: f64 = 0.9999;

/// Geographic rectangle a zone is responsible for.
#[derive(Debug, Clone, Copy)]
struct Coverage {
    min_lon: f64,
    max_lon: f64,
    min_lat: f64,
    max_lat: f64,
}

impl Coverage {
    fn contains(&self, longitude: f64, latitude: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&longitude)
            && (self.min_lat..=self.max_lat).contains(&latitude)
    }
}

#[derive(Debug, Clone, Copy)]
struct ZoneDefinition {
    origin_lat: f64,
    origin_lon: f64,
    coverage: Coverage,
}

const fn zone(origin_lat: f64, origin_lon: f64, lon: (f64, f64), lat: (f64, f64)) -> ZoneDefinition {
    ZoneDefinition {
        origin_lat,
        origin_lon,
        coverage: Coverage {
            min_lon: lon.0,
            max_lon: lon.1,
            min_lat: lat.0,
            max_lat: lat.1,
        },
    }
}

// Coverage rectangles enclose the prefectures (or island groups) assigned to
// each zone by MLIT notice No. 9 (2002).
const ZONES: [ZoneDefinition; 19] = [
    // I: Nagasaki, north-western islands of Kagoshima
    zone(33.0, 129.0 + 30.0 / 60.0, (128.0, 130.3), (26.9, 34.8)),
    // II: Fukuoka, Saga, Kumamoto, Oita, Miyazaki, Kagoshima
    zone(33.0, 131.0, (129.9, 132.1), (27.0, 34.0)),
    // III: Yamaguchi, Shimane, Hiroshima
    zone(36.0, 132.0 + 10.0 / 60.0, (130.8, 133.5), (33.7, 37.4)),
    // IV: Kagawa, Ehime, Tokushima, Kochi
    zone(33.0, 133.0 + 30.0 / 60.0, (132.0, 134.8), (32.7, 34.5)),
    // V: Hyogo, Tottori, Okayama
    zone(36.0, 134.0 + 20.0 / 60.0, (133.2, 135.5), (34.1, 35.7)),
    // VI: Kyoto, Osaka, Fukui, Shiga, Mie, Nara, Wakayama
    zone(36.0, 136.0, (134.9, 136.9), (33.4, 36.0)),
    // VII: Ishikawa, Toyama, Gifu, Aichi
    zone(36.0, 137.0 + 10.0 / 60.0, (135.8, 137.9), (34.5, 37.9)),
    // VIII: Niigata, Nagano, Yamanashi, Shizuoka
    zone(36.0, 138.0 + 30.0 / 60.0, (137.3, 139.9), (34.5, 38.6)),
    // IX: Tokyo (main islands), Fukushima, Tochigi, Ibaraki, Saitama, Chiba, Gunma, Kanagawa
    zone(36.0, 139.0 + 50.0 / 60.0, (138.3, 141.1), (32.4, 37.9)),
    // X: Aomori, Akita, Yamagata, Iwate, Miyagi
    zone(40.0, 140.0 + 50.0 / 60.0, (139.5, 142.1), (37.7, 41.6)),
    // XI: south-western Hokkaido (Otaru, Hakodate, Date...)
    zone(44.0, 140.0 + 15.0 / 60.0, (139.3, 141.5), (41.3, 43.5)),
    // XII: central Hokkaido (Sapporo, Asahikawa, Wakkanai...)
    zone(44.0, 142.0 + 15.0 / 60.0, (140.9, 143.9), (41.9, 45.6)),
    // XIII: eastern Hokkaido (Kitami, Obihiro, Kushiro, Nemuro...)
    zone(44.0, 144.0 + 15.0 / 60.0, (143.0, 145.9), (41.9, 44.5)),
    // XIV: Tokyo islands south of 28°N and east of 140°30'E (Ogasawara)
    zone(26.0, 142.0, (140.5, 143.0), (24.0, 28.0)),
    // XV: Okinawa islands between 126°E and 130°E
    zone(26.0, 127.0 + 30.0 / 60.0, (126.5, 128.6), (25.8, 27.9)),
    // XVI: Sakishima islands (west of 126°E)
    zone(26.0, 124.0, (122.9, 126.5), (23.9, 25.9)),
    // XVII: Daito islands (east of 130°E)
    zone(26.0, 131.0, (130.9, 131.5), (24.0, 26.5)),
    // XVIII: Okinotorishima
    zone(20.0, 136.0, (135.9, 136.2), (20.3, 20.6)),
    // XIX: Minamitorishima
    zone(26.0, 154.0, (153.9, 154.1), (24.2, 24.4)),
];

const ROMAN: [&str; 19] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV",
    "XV", "XVI", "XVII", "XVIII", "XIX",
];

/// One of the 19 numbered plane rectangular zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneZone(u8);

impl PlaneZone {
    pub fn new(number: u8) -> Option<Self> {
        (1..=19).contains(&number).then_some(PlaneZone(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn roman(&self) -> &'static str {
        ROMAN[self.index()]
    }

    /// Origin as `(latitude, longitude)` degrees.
    pub fn origin(&self) -> (f64, f64) {
        let definition = &ZONES[self.index()];
        (definition.origin_lat, definition.origin_lon)
    }

    pub fn covers(&self, longitude: f64, latitude: f64) -> bool {
        ZONES[self.index()].coverage.contains(longitude, latitude)
    }

    /// Pick the zone whose coverage contains the point. Where coverage
    /// rectangles overlap, the zone with the nearest origin meridian wins.
    pub fn select(longitude: f64, latitude: f64) -> Result<Self> {
        let selected = ZONES
            .iter()
            .enumerate()
            .filter(|(_, definition)| definition.coverage.contains(longitude, latitude))
            .min_by(|(_, a), (_, b)| {
                let da = (a.origin_lon - longitude).abs();
                let db = (b.origin_lon - longitude).abs();
                da.total_cmp(&db)
            })
            .map(|(i, _)| PlaneZone(i as u8 + 1));

        match selected {
            Some(zone) => {
                debug!(zone = zone.number(), longitude, latitude, "selected plane rectangular zone");
                Ok(zone)
            }
            None => Err(SurveyError::ZoneNotFound {
                longitude,
                latitude,
            }),
        }
    }

    /// EPSG code of the projected CRS for this zone on `datum`.
    pub fn epsg(&self, datum: Datum) -> Option<u32> {
        let offset = self.0 as u32 - 1;
        match datum {
            Datum::Jgd2011 => Some(6669 + offset),
            Datum::Jgd2000 => Some(2443 + offset),
            Datum::Tokyo => Some(30161 + offset),
            Datum::Wgs84 => None,
        }
    }

    /// Reverse of [`PlaneZone::epsg`].
    pub fn from_epsg(code: u32) -> Option<(Datum, PlaneZone)> {
        let (datum, first) = match code {
            6669..=6687 => (Datum::Jgd2011, 6669),
            2443..=2461 => (Datum::Jgd2000, 2443),
            30161..=30179 => (Datum::Tokyo, 30161),
            _ => return None,
        };
        Some((datum, PlaneZone((code - first) as u8 + 1)))
    }

    pub fn projection(&self, datum: Datum) -> TransverseMercator {
        let (origin_lat, origin_lon) = self.origin();
        TransverseMercator::new(
            datum.ellipsoid(),
            origin_lat,
            origin_lon,
            PLANE_SCALE_FACTOR,
            0.0,
            0.0,
        )
    }

    fn index(&self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for PlaneZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {}", self.roman())
    }
}

/// Resolve the CRS names a GNSS logger writes into its waypoint files, e.g.
/// generation `"JGD2011_R"` with type `"JPN9"`, to an EPSG code.
///
/// Returns `None` when either part is absent or unknown.
pub fn epsg_from_logger_crs(generation: Option<&str>, crs_type: Option<&str>) -> Option<u32> {
    let datum = Datum::parse(generation?).ok()?;
    let number = crs_type?
        .trim()
        .to_uppercase()
        .strip_prefix("JPN")?
        .parse::<u8>()
        .ok()?;
    PlaneZone::new(number)?.epsg(datum)
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;
use validator::Validate;

use crate::error::{Result, SurveyError};
use crate::projection::{Datum, PlaneZone, Projected, ProjectionKey, ProjectionZone};
use crate::utils::constants::FREQUENCY_BANDS;
use crate::utils::text;

/// Longitude/latitude pair in decimal degrees. Both or neither: a point either
/// carries a position or it does not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeodeticPosition {
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
}

impl GeodeticPosition {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// One GNSS field measurement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyPoint {
    // Identity
    pub point_name: Option<f64>,
    pub point_number: Option<u32>,
    pub group_name: Option<String>,

    // Timing
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Seconds, counting both endpoints.
    pub measurement_time: Option<i64>,

    // Position
    pub(crate) position: Option<GeodeticPosition>,
    pub altitude: Option<f64>,
    pub ellipsoid_height: Option<f64>,
    pub geoid_height: Option<f64>,

    // Quality
    pub fix: Option<String>,
    pub fix_mode: Option<String>,
    pub pdop: Option<f64>,
    pub number_of_satellites: Option<u32>,
    pub std_h: Option<f64>,
    pub std_v: Option<f64>,
    pub epochs: Option<u32>,
    pub interval: Option<f64>,

    // Equipment
    pub receiver: Option<String>,
    pub antenna: Option<String>,
    pub signals: Option<String>,
    pub signal_frequencies: Option<u32>,

    // Coordinate reference reported by the logger
    pub jgd: Option<String>,
    pub epsg: Option<u32>,
    #[serde(skip)]
    pub(crate) projection: Option<Projected>,

    // Provenance
    pub office: Option<String>,
    pub branch_office: Option<String>,
    pub local_area: Option<String>,
    pub address: Option<String>,
    pub project_year: Option<i32>,
    pub project_name: Option<String>,
    pub surveyor: Option<String>,

    // Labeling
    pub label: Option<String>,
    pub point_size: Option<u32>,
    pub label_cds: Option<GeodeticPosition>,
}

impl SurveyPoint {
    pub fn builder() -> SurveyPointBuilder {
        SurveyPointBuilder::new()
    }

    pub fn position(&self) -> Option<GeodeticPosition> {
        self.position
    }

    /// Move the point. Any cached projection is dropped with the old position.
    pub fn set_position(&mut self, position: Option<GeodeticPosition>) {
        if self.projection.take().is_some() {
            trace!(point = %self.describe(), "position changed, dropping cached projection");
        }
        self.position = position;
    }

    pub fn longitude(&self) -> Option<f64> {
        self.position.map(|p| p.longitude)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.position.map(|p| p.latitude)
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn require_position(&self) -> Result<GeodeticPosition> {
        self.position
            .ok_or_else(|| SurveyError::MissingCoordinate(self.describe()))
    }

    /// Name shown on maps and in tables: `"{group}-{name}"`, integral names
    /// without decimals (`A-1`, `1.5`).
    pub fn display_name(&self) -> Option<String> {
        let name = self.point_name?;
        let name = if name.fract() == 0.0 && name.abs() < 1e15 {
            format!("{}", name as i64)
        } else {
            name.to_string()
        };

        match self.group_name.as_deref() {
            Some(group) if !group.is_empty() => Some(format!("{}-{}", group, name)),
            _ => Some(name),
        }
    }

    /// Identification used in error messages.
    pub fn describe(&self) -> String {
        match (self.display_name(), self.point_number) {
            (Some(name), _) => format!("point {}", name),
            (None, Some(number)) => format!("point #{}", number),
            (None, None) => "unnamed point".to_string(),
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.label.as_deref().map_or(false, |label| !label.is_empty())
    }

    /// Cached projection, if one has been computed or supplied by the logger.
    pub fn cached_projection(&self) -> Option<&Projected> {
        self.projection.as_ref()
    }

    pub(crate) fn cached_projection_for(&self, key: &ProjectionKey) -> Option<Projected> {
        self.projection.filter(|p| &p.key == key)
    }

    pub(crate) fn store_projection(&mut self, projected: Projected) {
        trace!(point = %self.describe(), key = ?projected.key, "caching projection");
        self.projection = Some(projected);
    }

    pub fn clear_projection(&mut self) {
        self.projection = None;
    }

    /// Projected northing (Japanese X) of the cached projection.
    pub fn transformed_x(&self) -> Option<f64> {
        self.projection
            .filter(|p| !p.key.is_geographic())
            .map(|p| p.northing)
    }

    /// Projected easting (Japanese Y) of the cached projection.
    pub fn transformed_y(&self) -> Option<f64> {
        self.projection
            .filter(|p| !p.key.is_geographic())
            .map(|p| p.easting)
    }

    /// Record plane rectangular coordinates reported by the logger. The zone
    /// and datum come from `self.epsg`.
    pub fn set_logger_projection(&mut self, x: f64, y: f64) -> Result<()> {
        let epsg = self.epsg.ok_or_else(|| {
            SurveyError::InvalidFormat(format!(
                "{} has plane coordinates but no EPSG code",
                self.describe()
            ))
        })?;
        let (datum, zone) = PlaneZone::from_epsg(epsg).ok_or_else(|| {
            SurveyError::InvalidFormat(format!(
                "EPSG:{} of {} is not a plane rectangular CRS",
                epsg,
                self.describe()
            ))
        })?;

        self.store_projection(Projected {
            key: ProjectionKey::new(datum, ProjectionZone::Plane(zone)),
            easting: y,
            northing: x,
        });
        Ok(())
    }

    /// Change the datum the point's coordinates refer to. Any cached
    /// projection computed for another datum is dropped.
    pub fn set_datum(&mut self, datum_name: &str) -> Result<Datum> {
        let datum = Datum::parse(datum_name)?;
        if self.projection.map_or(false, |p| p.key.datum != datum) {
            trace!(point = %self.describe(), %datum, "datum changed, dropping cached projection");
            self.projection = None;
        }
        self.jgd = Some(datum.name().to_string());
        Ok(datum)
    }

    /// Difference `other - self` of the best height dimension both points
    /// carry: ellipsoid height when both have it, otherwise altitude.
    pub fn height_difference(&self, other: &SurveyPoint) -> Result<f64> {
        match (
            self.ellipsoid_height,
            other.ellipsoid_height,
            self.altitude,
            other.altitude,
        ) {
            (Some(a), Some(b), _, _) => Ok(b - a),
            (_, _, Some(a), Some(b)) => Ok(b - a),
            _ => Err(SurveyError::MissingHeight(format!(
                "{} and {} do not share a height dimension",
                self.describe(),
                other.describe()
            ))),
        }
    }

    /// `end - start` in seconds, both endpoints counted.
    pub fn calculate_measurement_time(&self) -> Option<i64> {
        let (start, end) = (self.start?, self.end?);
        Some((end - start).num_seconds() + 1)
    }

    /// Number of distinct carrier frequencies (L1, L2, L5, L6) in `signals`.
    pub fn count_signal_frequencies(&self) -> Option<u32> {
        let signals = self.signals.as_deref()?;
        let count = FREQUENCY_BANDS
            .iter()
            .filter(|band| signals.split_whitespace().any(|s| s == **band))
            .count();
        Some(count as u32)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(position) = &self.position {
            position.validate()?;
        }
        self.validate_times()
    }

    /// `end >= start`, and a recorded `measurement_time` agrees with them.
    pub fn validate_times(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(SurveyError::InvalidFormat(format!(
                    "{} ends ({}) before it starts ({})",
                    self.describe(),
                    end,
                    start
                )));
            }
        }

        if let (Some(recorded), Some(expected)) =
            (self.measurement_time, self.calculate_measurement_time())
        {
            if recorded != expected {
                return Err(SurveyError::InvalidFormat(format!(
                    "{} records {}s of measurement but start/end span {}s",
                    self.describe(),
                    recorded,
                    expected
                )));
            }
        }

        Ok(())
    }
}

/// Builds a [`SurveyPoint`] from parsed record fields, filling the derived
/// attributes (measurement time, signal frequencies, cleaned office names) and
/// validating the result.
#[derive(Debug, Default)]
pub struct SurveyPointBuilder {
    point: SurveyPoint,
    logger_plane: Option<(f64, f64)>,
}

impl SurveyPointBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_name(mut self, name: f64) -> Self {
        self.point.point_name = Some(name);
        self
    }

    pub fn point_number(mut self, number: u32) -> Self {
        self.point.point_number = Some(number);
        self
    }

    pub fn group_name(mut self, group: &str) -> Self {
        self.point.group_name = Some(group.to_string());
        self
    }

    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.point.start = Some(start);
        self
    }

    pub fn end(mut self, end: NaiveDateTime) -> Self {
        self.point.end = Some(end);
        self
    }

    pub fn coordinates(mut self, longitude: f64, latitude: f64) -> Self {
        self.point.position = Some(GeodeticPosition::new(longitude, latitude));
        self
    }

    pub fn altitude(mut self, altitude: f64) -> Self {
        self.point.altitude = Some(altitude);
        self
    }

    pub fn ellipsoid_height(mut self, height: f64) -> Self {
        self.point.ellipsoid_height = Some(height);
        self
    }

    pub fn geoid_height(mut self, height: f64) -> Self {
        self.point.geoid_height = Some(height);
        self
    }

    pub fn fix(mut self, fix: &str, fix_mode: &str) -> Self {
        self.point.fix = Some(fix.to_string());
        self.point.fix_mode = Some(fix_mode.to_string());
        self
    }

    pub fn pdop(mut self, pdop: f64) -> Self {
        self.point.pdop = Some(pdop);
        self
    }

    pub fn number_of_satellites(mut self, count: u32) -> Self {
        self.point.number_of_satellites = Some(count);
        self
    }

    pub fn standard_deviations(mut self, std_h: f64, std_v: f64) -> Self {
        self.point.std_h = Some(std_h);
        self.point.std_v = Some(std_v);
        self
    }

    pub fn epochs(mut self, epochs: u32, interval: f64) -> Self {
        self.point.epochs = Some(epochs);
        self.point.interval = Some(interval);
        self
    }

    pub fn receiver(mut self, receiver: &str) -> Self {
        self.point.receiver = Some(receiver.to_string());
        self
    }

    pub fn antenna(mut self, antenna: &str) -> Self {
        self.point.antenna = Some(antenna.to_string());
        self
    }

    pub fn signals(mut self, signals: &str) -> Self {
        self.point.signals = Some(signals.to_string());
        self
    }

    pub fn jgd(mut self, jgd: &str) -> Self {
        self.point.jgd = Some(jgd.to_string());
        self
    }

    pub fn epsg(mut self, epsg: u32) -> Self {
        self.point.epsg = Some(epsg);
        self
    }

    /// Plane rectangular X (northing) / Y (easting) as reported by the logger.
    pub fn logger_plane_coordinates(mut self, x: f64, y: f64) -> Self {
        self.logger_plane = Some((x, y));
        self
    }

    pub fn office(mut self, office: &str) -> Self {
        self.point.office = Some(office.to_string());
        self
    }

    pub fn branch_office(mut self, branch_office: &str) -> Self {
        self.point.branch_office = Some(branch_office.to_string());
        self
    }

    pub fn local_area(mut self, local_area: &str) -> Self {
        self.point.local_area = Some(local_area.to_string());
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.point.address = Some(address.to_string());
        self
    }

    pub fn project(mut self, year: i32, name: &str) -> Self {
        self.point.project_year = Some(year);
        self.point.project_name = Some(name.to_string());
        self
    }

    pub fn surveyor(mut self, surveyor: &str) -> Self {
        self.point.surveyor = Some(surveyor.to_string());
        self
    }

    pub fn build(self) -> Result<SurveyPoint> {
        let mut point = self.point;

        point.measurement_time = point.calculate_measurement_time();
        point.signal_frequencies = point.count_signal_frequencies();
        point.office = point.office.as_deref().map(text::clean_office_name);
        point.branch_office = point
            .branch_office
            .as_deref()
            .map(text::clean_branch_office_name);
        point.local_area = point.local_area.as_deref().map(text::clean_local_area_name);
        point.address = point.address.as_deref().map(text::to_half_width);
        point.project_name = point.project_name.as_deref().map(text::to_half_width);

        if let Some((x, y)) = self.logger_plane {
            point.set_logger_projection(x, y)?;
        }

        point.validate()?;
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 11, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_display_name() {
        let mut point = SurveyPoint {
            point_name: Some(1.0),
            group_name: Some("A".to_string()),
            ..Default::default()
        };
        assert_eq!(point.display_name().as_deref(), Some("A-1"));

        point.group_name = None;
        point.point_name = Some(1.5);
        assert_eq!(point.display_name().as_deref(), Some("1.5"));

        point.group_name = Some(String::new());
        point.point_name = Some(0.0);
        assert_eq!(point.display_name().as_deref(), Some("0"));

        point.point_name = None;
        assert_eq!(point.display_name(), None);
        assert_eq!(point.describe(), "unnamed point");
    }

    #[test]
    fn test_builder_derives_attributes() {
        let point = SurveyPoint::builder()
            .point_name(3.0)
            .coordinates(140.0, 40.0)
            .start(at(10, 51, 42))
            .end(at(11, 51, 42))
            .signals("L1 L2 L5 L6 E1 E5b L1OF L2OF ")
            .office("青森森林管理署")
            .branch_office("三厩森林事務所")
            .local_area("増川山国有林")
            .address("100い１")
            .build()
            .unwrap();

        assert_eq!(point.measurement_time, Some(3601));
        assert_eq!(point.signal_frequencies, Some(4));
        assert_eq!(point.office.as_deref(), Some("青森"));
        assert_eq!(point.branch_office.as_deref(), Some("三厩"));
        assert_eq!(point.local_area.as_deref(), Some("増川山"));
        assert_eq!(point.address.as_deref(), Some("100い1"));
    }

    #[test]
    fn test_signal_frequencies() {
        let mut point = SurveyPoint {
            signals: Some("L1 E1 E5b L1OF L2OF ".to_string()),
            ..Default::default()
        };
        assert_eq!(point.count_signal_frequencies(), Some(1));
        point.signals = Some("L1 L2 E1 E5b L1OF L2OF ".to_string());
        assert_eq!(point.count_signal_frequencies(), Some(2));
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let result = SurveyPoint::builder().coordinates(140.0, 91.0).build();
        assert!(matches!(result, Err(SurveyError::Validation(_))));
    }

    #[test]
    fn test_time_validation() {
        let mut point = SurveyPoint {
            start: Some(at(11, 0, 0)),
            end: Some(at(10, 0, 0)),
            ..Default::default()
        };
        assert!(point.validate_times().is_err());

        point.end = Some(at(11, 0, 9));
        point.measurement_time = Some(10);
        assert!(point.validate_times().is_ok());

        point.measurement_time = Some(60);
        assert!(point.validate_times().is_err());
    }

    #[test]
    fn test_missing_position() {
        let point = SurveyPoint {
            point_name: Some(7.0),
            ..Default::default()
        };
        let err = point.require_position().unwrap_err();
        assert!(matches!(err, SurveyError::MissingCoordinate(ref msg) if msg == "point 7"));
    }

    #[test]
    fn test_moving_point_drops_cached_projection() {
        let mut point = SurveyPoint::builder()
            .coordinates(140.08785504166664, 36.103774791666666)
            .epsg(6677)
            .logger_plane_coordinates(11_573.375, 22_694.980)
            .build()
            .unwrap();
        assert!(point.cached_projection().is_some());

        let moved = GeodeticPosition::new(140.1, 36.2);
        point.set_position(Some(moved));
        assert_eq!(point.position(), Some(moved));
        assert!(point.cached_projection().is_none());
        assert_eq!(point.transformed_x(), None);

        point.set_position(None);
        assert!(!point.has_position());
    }

    #[test]
    fn test_height_difference_prefers_ellipsoid_height() {
        let a = SurveyPoint {
            altitude: Some(100.0),
            ellipsoid_height: Some(140.0),
            ..Default::default()
        };
        let mut b = SurveyPoint {
            altitude: Some(110.0),
            ellipsoid_height: Some(155.0),
            ..Default::default()
        };
        assert_eq!(a.height_difference(&b).unwrap(), 15.0);

        b.ellipsoid_height = None;
        assert_eq!(a.height_difference(&b).unwrap(), 10.0);

        b.altitude = None;
        assert!(matches!(
            a.height_difference(&b),
            Err(SurveyError::MissingHeight(_))
        ));
    }

    #[test]
    fn test_logger_projection_and_datum_change() {
        let mut point = SurveyPoint::builder()
            .coordinates(140.08785504166664, 36.103774791666666)
            .epsg(6677)
            .logger_plane_coordinates(11_573.375, 22_694.980)
            .build()
            .unwrap();

        assert_eq!(point.transformed_x(), Some(11_573.375));
        assert_eq!(point.transformed_y(), Some(22_694.980));

        point.set_datum("JGD2011").unwrap();
        assert!(point.cached_projection().is_some());

        point.set_datum("JGD2000").unwrap();
        assert!(point.cached_projection().is_none());
        assert_eq!(point.jgd.as_deref(), Some("JGD2000"));
    }

    #[test]
    fn test_logger_projection_requires_plane_epsg() {
        let result = SurveyPoint::builder()
            .coordinates(140.0, 36.0)
            .epsg(4326)
            .logger_plane_coordinates(0.0, 0.0)
            .build();
        assert!(matches!(result, Err(SurveyError::InvalidFormat(_))));
    }
}

//! Property keys with their English and Japanese names, and per-point
//! property mappings for GeoJSON/KML writers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::survey_point::SurveyPoint;
use crate::config::Settings;
use crate::utils::format_datetime;

/// Language of exported property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    En,
    Ja,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Point,
    PointName,
    PointNumber,
    GroupName,
    Start,
    End,
    MeasurementTime,
    Longitude,
    Latitude,
    Altitude,
    EllipsoidHeight,
    GeoidHeight,
    Fix,
    FixMode,
    Pdop,
    NumberOfSatellites,
    StdH,
    StdV,
    Epochs,
    Interval,
    Receiver,
    Antenna,
    Signals,
    SignalFrequencies,
    Jgd,
    Epsg,
    TransformedX,
    TransformedY,
    Office,
    BranchOffice,
    LocalArea,
    Address,
    ProjectYear,
    ProjectName,
    Surveyor,
    Label,
    PointSize,
}

// (key, English, Japanese)
const NAMES: [(PropertyKey, &str, &str); 37] = [
    (PropertyKey::Point, "point", "測点"),
    (PropertyKey::PointName, "point_name", "測点名"),
    (PropertyKey::PointNumber, "point_number", "測点番号"),
    (PropertyKey::GroupName, "group_name", "班名"),
    (PropertyKey::Start, "start", "測量開始"),
    (PropertyKey::End, "end", "測量終了"),
    (PropertyKey::MeasurementTime, "measurement_time", "計測時間（秒）"),
    (PropertyKey::Longitude, "longitude", "経度"),
    (PropertyKey::Latitude, "latitude", "緯度"),
    (PropertyKey::Altitude, "altitude", "標高"),
    (PropertyKey::EllipsoidHeight, "ellipsoid_height", "楕円体高"),
    (PropertyKey::GeoidHeight, "geoid_height", "ジオイド高"),
    (PropertyKey::Fix, "fix", "測位状態"),
    (PropertyKey::FixMode, "fix_mode", "測位方式"),
    (PropertyKey::Pdop, "pdop", "PDOP"),
    (PropertyKey::NumberOfSatellites, "number_of_satellites", "衛星数"),
    (PropertyKey::StdH, "std_h", "水平標準偏差"),
    (PropertyKey::StdV, "std_v", "垂直標準偏差"),
    (PropertyKey::Epochs, "epochs", "計測点数"),
    (PropertyKey::Interval, "interval", "計測インターバル（秒）"),
    (PropertyKey::Receiver, "receiver", "計測機器"),
    (PropertyKey::Antenna, "antenna", "アンテナ"),
    (PropertyKey::Signals, "signals", "受信信号"),
    (PropertyKey::SignalFrequencies, "signal_frequencies", "周波数数"),
    (PropertyKey::Jgd, "jgd", "測地系"),
    (PropertyKey::Epsg, "epsg", "EPSGコード"),
    (PropertyKey::TransformedX, "transformed_x", "X座標"),
    (PropertyKey::TransformedY, "transformed_y", "Y座標"),
    (PropertyKey::Office, "office", "森林管理署"),
    (PropertyKey::BranchOffice, "branch_office", "森林事務所"),
    (PropertyKey::LocalArea, "local_area", "国有林名"),
    (PropertyKey::Address, "address", "林小班"),
    (PropertyKey::ProjectYear, "project_year", "事業年度"),
    (PropertyKey::ProjectName, "project_name", "事業名"),
    (PropertyKey::Surveyor, "surveyor", "測量者"),
    (PropertyKey::Label, "label", "ラベル"),
    (PropertyKey::PointSize, "point_size", "表示サイズ"),
];

impl PropertyKey {
    /// Every key, in export order.
    pub fn all() -> impl Iterator<Item = PropertyKey> {
        NAMES.iter().map(|(key, _, _)| *key)
    }

    pub fn name(&self, language: Language) -> &'static str {
        let (_, en, ja) = NAMES[*self as usize];
        match language {
            Language::En => en,
            Language::Ja => ja,
        }
    }

    /// Reverse lookup from either language.
    pub fn from_name(name: &str) -> Option<PropertyKey> {
        NAMES
            .iter()
            .find(|(_, en, ja)| *en == name || *ja == name)
            .map(|(key, _, _)| *key)
    }
}

/// Insert `value` under the name of `key` in `language`.
pub(crate) fn insert(
    map: &mut Map<String, Value>,
    language: Language,
    key: PropertyKey,
    value: impl Into<Value>,
) {
    map.insert(key.name(language).to_string(), value.into());
}

impl SurveyPoint {
    /// All attributes as a flat property mapping. Timestamps are formatted
    /// with the configured datetime format, coordinates rounded to the
    /// configured decimal places; absent values map to `null`.
    pub fn properties(&self, language: Language, settings: &Settings) -> Map<String, Value> {
        let datetime = |dt: Option<chrono::NaiveDateTime>| {
            dt.map(|dt| format_datetime(&dt, &settings.datetime_format))
        };
        let geodetic = |v: Option<f64>| v.map(|v| settings.round_geodetic(v));
        let projected = |v: Option<f64>| v.map(|v| settings.round_projected(v));

        let mut map = Map::new();
        let mut put = |key: PropertyKey, value: Value| insert(&mut map, language, key, value);

        put(PropertyKey::Point, self.display_name().into());
        put(PropertyKey::PointName, self.point_name.into());
        put(PropertyKey::PointNumber, self.point_number.into());
        put(PropertyKey::GroupName, self.group_name.clone().into());
        put(PropertyKey::Start, datetime(self.start).into());
        put(PropertyKey::End, datetime(self.end).into());
        put(PropertyKey::MeasurementTime, self.measurement_time.into());
        put(PropertyKey::Longitude, geodetic(self.longitude()).into());
        put(PropertyKey::Latitude, geodetic(self.latitude()).into());
        put(PropertyKey::Altitude, self.altitude.into());
        put(PropertyKey::EllipsoidHeight, self.ellipsoid_height.into());
        put(PropertyKey::GeoidHeight, self.geoid_height.into());
        put(PropertyKey::Fix, self.fix.clone().into());
        put(PropertyKey::FixMode, self.fix_mode.clone().into());
        put(PropertyKey::Pdop, self.pdop.into());
        put(PropertyKey::NumberOfSatellites, self.number_of_satellites.into());
        put(PropertyKey::StdH, self.std_h.into());
        put(PropertyKey::StdV, self.std_v.into());
        put(PropertyKey::Epochs, self.epochs.into());
        put(PropertyKey::Interval, self.interval.into());
        put(PropertyKey::Receiver, self.receiver.clone().into());
        put(PropertyKey::Antenna, self.antenna.clone().into());
        put(PropertyKey::Signals, self.signals.clone().into());
        put(PropertyKey::SignalFrequencies, self.signal_frequencies.into());
        put(PropertyKey::Jgd, self.jgd.clone().into());
        put(PropertyKey::Epsg, self.epsg.into());
        put(PropertyKey::TransformedX, projected(self.transformed_x()).into());
        put(PropertyKey::TransformedY, projected(self.transformed_y()).into());
        put(PropertyKey::Office, self.office.clone().into());
        put(PropertyKey::BranchOffice, self.branch_office.clone().into());
        put(PropertyKey::LocalArea, self.local_area.clone().into());
        put(PropertyKey::Address, self.address.clone().into());
        put(PropertyKey::ProjectYear, self.project_year.into());
        put(PropertyKey::ProjectName, self.project_name.clone().into());
        put(PropertyKey::Surveyor, self.surveyor.clone().into());
        put(PropertyKey::Label, self.label.clone().into());
        put(PropertyKey::PointSize, self.point_size.into());

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_datetime;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_table_matches_enum_order() {
        for (i, key) in PropertyKey::all().enumerate() {
            assert_eq!(key as usize, i);
            assert_eq!(PropertyKey::from_name(key.name(Language::En)), Some(key));
            assert_eq!(PropertyKey::from_name(key.name(Language::Ja)), Some(key));
        }
        assert_eq!(PropertyKey::Office.name(Language::Ja), "森林管理署");
        assert_eq!(PropertyKey::from_name("unknown"), None);
    }

    #[test]
    fn test_point_properties() {
        let point = SurveyPoint::builder()
            .point_name(1.0)
            .group_name("A")
            .coordinates(140.123_456_789_012_34, 40.5)
            .start(parse_datetime("2023-11-09 10:51:42").unwrap())
            .office("青森森林管理署")
            .build()
            .unwrap();
        let settings = Settings::default();

        let en = point.properties(Language::En, &settings);
        assert_eq!(en.len(), PropertyKey::all().count());
        assert_eq!(en["point"], Value::from("A-1"));
        assert_eq!(en["start"], Value::from("2023-11-09T10:51:42"));
        assert_eq!(en["end"], Value::Null);
        assert_eq!(en["longitude"], Value::from(140.123_456_789_01));
        assert_eq!(en["office"], Value::from("青森"));

        let ja = point.properties(Language::Ja, &settings);
        assert_eq!(ja["測点"], Value::from("A-1"));
        assert_eq!(ja["森林管理署"], Value::from("青森"));
        assert!(ja.get("office").is_none());
    }
}

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, SurveyError};
use crate::models::properties::{insert, Language, PropertyKey};
use crate::models::{SurveyPoint, SurveyPointCollection};
use crate::utils::format_datetime;

/// Aggregates without a per-point counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    PointCount,
    MeanEpochs,
    MeanPdop,
    MeanSatellites,
    AreaHa,
    LengthM,
    SlopeLengthM,
}

const SESSION_NAMES: [(SessionKey, &str, &str); 7] = [
    (SessionKey::PointCount, "point_count", "測点数"),
    (SessionKey::MeanEpochs, "mean_epochs", "計測点数（平均）"),
    (SessionKey::MeanPdop, "mean_pdop", "PDOP（平均）"),
    (SessionKey::MeanSatellites, "mean_satellites", "衛星数（平均）"),
    (SessionKey::AreaHa, "area_ha", "面積（ha）"),
    (SessionKey::LengthM, "length_m", "延長（m）"),
    (SessionKey::SlopeLengthM, "slope_length_m", "斜距離（m）"),
];

impl SessionKey {
    pub fn name(&self, language: Language) -> &'static str {
        let (_, en, ja) = SESSION_NAMES[*self as usize];
        match language {
            Language::En => en,
            Language::Ja => ja,
        }
    }
}

/// Summary of one survey session (a collection).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatistics {
    pub point_count: usize,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub mean_epochs: Option<f64>,
    pub mean_interval: Option<f64>,
    pub mean_pdop: Option<f64>,
    pub mean_satellites: Option<f64>,

    // Taken from the first member
    pub receiver: Option<String>,
    pub surveyor: Option<String>,
    pub office: Option<String>,
    pub branch_office: Option<String>,
    pub local_area: Option<String>,
    pub address: Option<String>,
    pub project_year: Option<i32>,
    pub project_name: Option<String>,

    pub area_ha: Option<f64>,
    pub length_m: Option<f64>,
    pub slope_length_m: Option<f64>,
}

pub struct SessionAnalyzer;

impl SessionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate `collection`. Area needs 3 members, lengths 2; below that
    /// they stay `None`. The slope length is also `None` when members lack a
    /// shared height. Any other geometry failure is an error.
    pub fn analyze(&self, collection: &SurveyPointCollection) -> Result<SessionStatistics> {
        let first = collection.first().ok_or_else(|| {
            SurveyError::IncompleteGeometry("no points to analyze".to_string())
        })?;
        let points: Vec<&SurveyPoint> = collection.iter().collect();

        let area_ha = if points.len() >= 3 {
            Some(collection.area_ha()?)
        } else {
            None
        };
        let length_m = if points.len() >= 2 {
            Some(collection.length_m()?)
        } else {
            None
        };
        let slope_length_m = if points.len() >= 2 {
            match collection.slope_length_m() {
                Ok(length) => Some(length),
                Err(SurveyError::MissingHeight(reason)) => {
                    debug!(%reason, "no slope length for session");
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        let stats = SessionStatistics {
            point_count: points.len(),
            start: points.iter().filter_map(|p| p.start).min(),
            end: points.iter().filter_map(|p| p.end).max(),
            mean_epochs: mean(points.iter().filter_map(|p| p.epochs.map(f64::from)), 2),
            mean_interval: mean(points.iter().filter_map(|p| p.interval), 1),
            mean_pdop: mean(points.iter().filter_map(|p| p.pdop), 2),
            mean_satellites: mean(
                points
                    .iter()
                    .filter_map(|p| p.number_of_satellites.map(f64::from)),
                2,
            ),
            receiver: first.receiver.clone(),
            surveyor: first.surveyor.clone(),
            office: first.office.clone(),
            branch_office: first.branch_office.clone(),
            local_area: first.local_area.clone(),
            address: first.address.clone(),
            project_year: first.project_year,
            project_name: first.project_name.clone(),
            area_ha,
            length_m,
            slope_length_m,
        };
        debug!(points = stats.point_count, ?stats.area_ha, "analyzed session");
        Ok(stats)
    }
}

impl SessionStatistics {
    /// Property mapping for a whole-session feature.
    pub fn properties(&self, language: Language, settings: &Settings) -> Map<String, Value> {
        let datetime = |dt: Option<NaiveDateTime>| {
            dt.map(|dt| format_datetime(&dt, &settings.datetime_format))
        };

        let mut map = Map::new();
        insert(&mut map, language, PropertyKey::Office, self.office.clone());
        insert(&mut map, language, PropertyKey::BranchOffice, self.branch_office.clone());
        insert(&mut map, language, PropertyKey::LocalArea, self.local_area.clone());
        insert(&mut map, language, PropertyKey::Address, self.address.clone());
        insert(&mut map, language, PropertyKey::Start, datetime(self.start));
        insert(&mut map, language, PropertyKey::End, datetime(self.end));
        put(&mut map, language, SessionKey::PointCount, self.point_count);
        insert(&mut map, language, PropertyKey::Interval, self.mean_interval);
        put(&mut map, language, SessionKey::MeanEpochs, self.mean_epochs);
        put(&mut map, language, SessionKey::MeanPdop, self.mean_pdop);
        put(&mut map, language, SessionKey::MeanSatellites, self.mean_satellites);
        insert(&mut map, language, PropertyKey::Receiver, self.receiver.clone());
        insert(&mut map, language, PropertyKey::Surveyor, self.surveyor.clone());
        insert(&mut map, language, PropertyKey::ProjectYear, self.project_year);
        insert(&mut map, language, PropertyKey::ProjectName, self.project_name.clone());
        put(&mut map, language, SessionKey::AreaHa, self.area_ha);
        put(&mut map, language, SessionKey::LengthM, self.length_m);
        put(&mut map, language, SessionKey::SlopeLengthM, self.slope_length_m);
        map
    }

    pub fn summary(&self) -> String {
        let span = match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{} to {}", start, end),
            _ => "unknown".to_string(),
        };
        let or_dash = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

        format!(
            "Office: {} / {} / {} {}\n\
            Session: {}\n\
            Points: {}\n\
            Mean epochs: {}, interval: {} s, PDOP: {}, satellites: {}\n\
            Receiver: {}\n\
            Area: {} ha, length: {} m, slope length: {} m",
            self.office.as_deref().unwrap_or("-"),
            self.branch_office.as_deref().unwrap_or("-"),
            self.local_area.as_deref().unwrap_or("-"),
            self.address.as_deref().unwrap_or(""),
            span,
            self.point_count,
            or_dash(self.mean_epochs),
            or_dash(self.mean_interval),
            or_dash(self.mean_pdop),
            or_dash(self.mean_satellites),
            self.receiver.as_deref().unwrap_or("-"),
            or_dash(self.area_ha),
            or_dash(self.length_m),
            or_dash(self.slope_length_m),
        )
    }
}

impl Default for SessionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn put(map: &mut Map<String, Value>, language: Language, key: SessionKey, value: impl Into<Value>) {
    map.insert(key.name(language).to_string(), value.into());
}

fn mean<I>(values: I, decimals: i32) -> Option<f64>
where
    I: Iterator<Item = f64>,
{
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    let factor = 10f64.powi(decimals);
    Some((sum / count as f64 * factor).round() / factor)
}

use crate::error::{Result, SurveyError};

/// Convert DMS (Degrees:Minutes:Seconds) text to decimal degrees
///
/// # Examples
/// ```
/// use gnss_survey::utils::dms_to_decimal;
///
/// let decimal = dms_to_decimal("40:51:09.1161").unwrap();
/// assert!((decimal - 40.85253225).abs() < 1e-9);
/// ```
pub fn dms_to_decimal(dms: &str) -> Result<f64> {
    let parts: Vec<&str> = dms.trim().split(':').collect();

    if parts.len() != 3 {
        return Err(SurveyError::InvalidCoordinate(format!(
            "Invalid DMS format: '{}'. Expected format: 'DD:MM:SS'",
            dms
        )));
    }

    let is_negative = dms.trim().starts_with('-');
    let degrees = parse_part(parts[0], "degrees")?;
    let minutes = parse_part(parts[1], "minutes")?;
    let seconds = parse_part(parts[2], "seconds")?;

    components_to_decimal(degrees.abs(), minutes, seconds).map(|d| if is_negative { -d } else { d })
}

/// Convert the packed `DDDMMSS.sss` notation GNSS loggers write
/// (`405109.1161` is 40°51′09.1161″) to decimal degrees.
///
/// # Examples
/// ```
/// use gnss_survey::utils::packed_dms_to_decimal;
///
/// let decimal = packed_dms_to_decimal(140516.27814).unwrap();
/// assert!((decimal - 140.08785504166664).abs() < 1e-12);
/// ```
pub fn packed_dms_to_decimal(packed: f64) -> Result<f64> {
    if !packed.is_finite() {
        return Err(SurveyError::InvalidCoordinate(format!(
            "Invalid packed DMS value: {}",
            packed
        )));
    }

    let is_negative = packed < 0.0;
    let packed = packed.abs();
    let whole = packed.trunc();
    let fraction = packed - whole;
    let whole = whole as u64;

    let degrees = (whole / 10_000) as f64;
    let minutes = ((whole / 100) % 100) as f64;
    let seconds = (whole % 100) as f64 + fraction;

    components_to_decimal(degrees, minutes, seconds).map(|d| if is_negative { -d } else { d })
}

/// Reverse of [`packed_dms_to_decimal`].
pub fn decimal_to_packed_dms(decimal: f64) -> f64 {
    let (degrees, minutes, seconds) = split_decimal(decimal.abs());
    let packed = degrees as f64 * 10_000.0 + minutes as f64 * 100.0 + seconds;
    if decimal < 0.0 {
        -packed
    } else {
        packed
    }
}

/// Convert decimal degrees to DMS text
pub fn decimal_to_dms(decimal: f64) -> String {
    let sign = if decimal < 0.0 { "-" } else { "" };
    let (degrees, minutes, seconds) = split_decimal(decimal.abs());
    format!("{}{}:{:02}:{:07.4}", sign, degrees, minutes, seconds)
}

/// Parse coordinate that might be in DMS or decimal format
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();

    if !trimmed.contains(':') {
        trimmed.parse::<f64>().map_err(|_| {
            SurveyError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", coord_str))
        })
    } else {
        dms_to_decimal(trimmed)
    }
}

fn parse_part(part: &str, what: &str) -> Result<f64> {
    part.trim().parse::<f64>().map_err(|_| {
        SurveyError::InvalidCoordinate(format!("Invalid {} value: '{}'", what, part))
    })
}

fn components_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> Result<f64> {
    if !(0.0..60.0).contains(&minutes) {
        return Err(SurveyError::InvalidCoordinate(format!(
            "Minutes must be between 0 and 60, got: {}",
            minutes
        )));
    }

    if !(0.0..60.0).contains(&seconds) {
        return Err(SurveyError::InvalidCoordinate(format!(
            "Seconds must be between 0 and 60, got: {}",
            seconds
        )));
    }

    Ok(degrees + minutes / 60.0 + seconds / 3600.0)
}

fn split_decimal(decimal: f64) -> (u32, u32, f64) {
    let degrees = decimal.floor();
    let minutes_decimal = (decimal - degrees) * 60.0;
    let minutes = minutes_decimal.floor();
    let seconds = (minutes_decimal - minutes) * 60.0;
    (degrees as u32, minutes as u32, seconds)
}

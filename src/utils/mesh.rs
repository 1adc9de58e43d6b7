//! Japanese standard grid square (mesh) codes, JIS X 0410.

use serde::Serialize;

use crate::error::{Result, SurveyError};

/// Mesh codes of one position at every level, each extending the previous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshCode {
    /// 1st level, 40′ × 1°
    pub first: String,
    /// 2nd level, 5′ × 7′30″
    pub secondary: String,
    /// 3rd level (standard), 30″ × 45″
    pub standard: String,
    /// Half of the standard square
    pub half: String,
    /// Quarter of the standard square
    pub quarter: String,
}

impl MeshCode {
    /// Codes of the square containing the position. The first-level code
    /// takes two digits from each axis, so the area is latitude 6°40′ to
    /// 66°40′ and longitude 110° to 200°.
    pub fn from_lonlat(longitude: f64, latitude: f64) -> Result<Self> {
        // latitude in minutes, then seconds within the standard square
        let (p, a) = div_rem(latitude * 60.0, 40.0);
        let u = longitude.trunc() - 100.0;
        if !(10.0..100.0).contains(&p) || !(10.0..100.0).contains(&u) {
            return Err(SurveyError::InvalidCoordinate(format!(
                "lon={}, lat={} is outside the mesh code area",
                longitude, latitude
            )));
        }

        let (q, b) = div_rem(a, 5.0);
        let (r, c) = div_rem(b * 60.0, 30.0);
        let (s, d) = div_rem(c, 15.0);
        let (t, _) = div_rem(d, 7.5);

        // longitude in minutes, then seconds within the standard square
        let (v, g) = div_rem(longitude.fract() * 60.0, 7.5);
        let (w, h) = div_rem(g * 60.0, 45.0);
        let (x, i) = div_rem(h, 22.5);
        let (y, _) = div_rem(i, 11.25);

        let first = format!("{}{}", p as u32, u as u32);
        let secondary = format!("{}{}{}", first, q as u32, v as u32);
        let standard = format!("{}{}{}", secondary, r as u32, w as u32);
        let half = format!("{}{}", standard, (s * 2.0 + x + 1.0) as u32);
        let quarter = format!("{}{}", half, (t * 2.0 + y + 1.0) as u32);

        Ok(Self {
            first,
            secondary,
            standard,
            half,
            quarter,
        })
    }
}

/// South-west corner `(longitude, latitude)` of the square a 4, 6 or 8 digit
/// mesh code names.
pub fn mesh_code_to_lonlat(code: &str) -> Result<(f64, f64)> {
    let invalid = || SurveyError::InvalidCoordinate(format!("Invalid mesh code: '{}'", code));

    if !matches!(code.len(), 4 | 6 | 8) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let digit = |i: usize| f64::from(code.as_bytes()[i] - b'0');

    let mut latitude = (digit(0) * 10.0 + digit(1)) * 2.0 / 3.0;
    let mut longitude = digit(2) * 10.0 + digit(3) + 100.0;

    if code.len() >= 6 {
        latitude += digit(4) * 2.0 / 3.0 / 8.0;
        longitude += digit(5) / 8.0;
    }
    if code.len() == 8 {
        latitude += digit(6) * 2.0 / 3.0 / 80.0;
        longitude += digit(7) / 80.0;
    }

    Ok((longitude, latitude))
}

fn div_rem(value: f64, divisor: f64) -> (f64, f64) {
    let remainder = value.rem_euclid(divisor);
    (((value - remainder) / divisor).round(), remainder)
}

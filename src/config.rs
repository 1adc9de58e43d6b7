//! Runtime settings, layered from built-in defaults, an optional TOML file and
//! `GNSS_SURVEY__*` environment variables.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

use crate::error::Result;
use crate::labels::LabelConfig;
use crate::projection::Datum;
use crate::utils::constants::{
    DEFAULT_DATETIME_FORMAT, DEFAULT_GEODETIC_DECIMAL_PLACES, DEFAULT_PROJECTED_DECIMAL_PLACES,
    ENV_PREFIX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DecimalPlaces {
    #[validate(range(max = 15))]
    pub geodetic: u32,

    #[validate(range(max = 15))]
    pub projected: u32,
}

impl Default for DecimalPlaces {
    fn default() -> Self {
        Self {
            geodetic: DEFAULT_GEODETIC_DECIMAL_PLACES,
            projected: DEFAULT_PROJECTED_DECIMAL_PLACES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Datum name used when the caller does not give one.
    pub default_datum: String,
    /// chrono format for timestamps in exported properties.
    pub datetime_format: String,
    pub decimal_places: DecimalPlaces,
    pub labels: LabelConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_datum: Datum::default().name().to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            decimal_places: DecimalPlaces::default(),
            labels: LabelConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `path` if given, then environment
    /// variables such as `GNSS_SURVEY__LABELS__STEP=10`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            debug!(path = %path.display(), "loading settings file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        Datum::parse(&self.default_datum)?;
        self.decimal_places.validate()?;
        Ok(())
    }

    pub fn datum(&self) -> Result<Datum> {
        Datum::parse(&self.default_datum)
    }

    pub fn round_geodetic(&self, value: f64) -> f64 {
        round_to(value, self.decimal_places.geodetic)
    }

    pub fn round_projected(&self, value: f64) -> f64 {
        round_to(value, self.decimal_places.projected)
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

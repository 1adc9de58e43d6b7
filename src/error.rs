use thiserror::Error;

pub type Result<T> = std::result::Result<T, SurveyError>;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Missing coordinate: {0}")]
    MissingCoordinate(String),

    #[error("Missing height: {0}")]
    MissingHeight(String),

    #[error("Unsupported datum: {0}")]
    UnsupportedDatum(String),

    #[error("No plane rectangular zone covers lon={longitude}, lat={latitude}")]
    ZoneNotFound { longitude: f64, latitude: f64 },

    #[error("Azimuth is undefined between coincident points: {0}")]
    UndefinedAzimuth(String),

    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("Index {index} is out of range for a collection of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Incomplete geometry: {0}")]
    IncompleteGeometry(String),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

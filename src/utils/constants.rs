/// Carrier frequency bands counted towards `signal_frequencies`
pub const FREQUENCY_BANDS: [&str; 4] = ["L1", "L2", "L5", "L6"];

/// Words stripped from forest office names
pub const OFFICE_SUFFIXES: [&str; 4] = ["森林管理署", "署", "支", "所"];
pub const BRANCH_OFFICE_SUFFIXES: [&str; 2] = ["森林事務所", "担当区"];
pub const LOCAL_AREA_SUFFIXES: [&str; 1] = ["国有林"];

/// Timestamp layouts written by GNSS loggers, tried in order
pub const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Output defaults
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DEFAULT_GEODETIC_DECIMAL_PLACES: u32 = 11;
pub const DEFAULT_PROJECTED_DECIMAL_PLACES: u32 = 4;

/// Labeling defaults
pub const DEFAULT_LABEL_STEP: usize = 5;
pub const DEFAULT_BASE_SIZE: u32 = 2;
pub const DEFAULT_STEP_SIZE: u32 = 4;
pub const DEFAULT_FIRST_SIZE: u32 = 6;
pub const DEFAULT_LABEL_CLEARANCE_M: f64 = 20.0;

/// Square metres per hectare
pub const SQUARE_METRES_PER_HECTARE: f64 = 10_000.0;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "GNSS_SURVEY";

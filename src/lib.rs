pub mod analyzers;
pub mod config;
pub mod error;
pub mod geometry;
pub mod labels;
pub mod measure;
pub mod models;
pub mod projection;
pub mod utils;

pub use analyzers::{SessionAnalyzer, SessionStatistics};
pub use config::Settings;
pub use error::{Result, SurveyError};
pub use geometry::{Feature, Geometry, OutputFrame, ShapeKind};
pub use labels::{Label, LabelConfig, LabelPlacer};
pub use measure::{AngleCalculator, DistanceCalculator, TraverseTable};
pub use models::{GeodeticPosition, Language, SortColumn, SurveyPoint, SurveyPointCollection};
pub use projection::{CoordinateTransformer, Datum, ProjectionMode};

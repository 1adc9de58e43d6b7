pub mod collection;
pub mod properties;
pub mod survey_point;

pub use collection::{SortColumn, SurveyPointCollection};
pub use properties::{Language, PropertyKey};
pub use survey_point::{GeodeticPosition, SurveyPoint, SurveyPointBuilder};

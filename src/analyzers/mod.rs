pub mod session_analyzer;

pub use session_analyzer::{SessionAnalyzer, SessionKey, SessionStatistics};

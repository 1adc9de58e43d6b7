//! Map label assignment and anchor placement.

pub mod placer;

pub use placer::{Label, LabelConfig, LabelPlacer};

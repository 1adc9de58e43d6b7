pub mod constants;
pub mod coordinates;
pub mod datetime;
pub mod mesh;
pub mod text;

pub use constants::*;
pub use coordinates::{decimal_to_packed_dms, dms_to_decimal, packed_dms_to_decimal};
pub use datetime::{format_datetime, parse_datetime};
pub use mesh::{mesh_code_to_lonlat, MeshCode};
pub use text::{parse_numeric, to_half_width};

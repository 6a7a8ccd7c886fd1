//! Small shared helpers: the image checksum and integer narrowing.

pub mod crc;
pub mod math;

pub use self::crc::compute_crc;
pub use self::math::{to_index, to_u32};

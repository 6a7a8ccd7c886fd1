//! Checked integer narrowing for image serialization.

use crate::Result;

/// Converts a `usize` to `u32` for image serialization, returning an error if the value
/// exceeds `u32::MAX`.
///
/// # Errors
///
/// Returns an error if `value` exceeds `u32::MAX`.
pub fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| malformed_error!("Image serialization value {value} exceeds u32::MAX"))
}

/// Converts a `usize` to a 16-bit table or heap index.
///
/// `0xFFFF` is reserved as the empty index, so the largest encodable value is `0xFFFE`.
///
/// # Errors
///
/// Returns an error if `value` does not fit below the empty-index sentinel.
pub fn to_index(value: usize) -> Result<u16> {
    match u16::try_from(value) {
        Ok(index) if index != u16::MAX => Ok(index),
        _ => Err(malformed_error!(
            "Index {value} does not fit a 16-bit table reference"
        )),
    }
}

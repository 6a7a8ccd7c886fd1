//! CRC-32/MPEG-2 checksum.
//!
//! The runtime verifies both image CRCs and the native-method checksum with the same routine:
//! polynomial `0x04C11DB7`, MSB-first (not reflected), no final xor. The seed is supplied by the
//! caller, which is what makes the checksum chainable across several strings.
//!
//! ```rust
//! use nanometa::utils::crc::compute_crc;
//!
//! assert_eq!(compute_crc(b"123456789", 0xFFFF_FFFF), 0x0376_E6E7);
//!
//! let chained = compute_crc(b"56789", compute_crc(b"1234", 0xFFFF_FFFF));
//! assert_eq!(chained, 0x0376_E6E7);
//! ```

use crc::{Crc, CRC_32_MPEG_2};

const MPEG_2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Computes the CRC of `data`, continuing from `seed`.
#[must_use]
pub fn compute_crc(data: &[u8], seed: u32) -> u32 {
    let mut digest = MPEG_2.digest_with_initial(seed);
    digest.update(data);
    digest.finalize()
}

/// Chains the CRC of a string's bytes (without terminator) onto `crc`.
pub fn update_crc(crc: &mut u32, text: &str) {
    *crc = compute_crc(text.as_bytes(), *crc);
}

//! Low-level byte stream parser for signature and table decoding.
//!
//! [`Parser`] is a cursor over a borrowed byte slice. It owns nothing but its position, so a
//! signature decode that recurses (a `BYREF` of an `SZARRAY` of a `VALUETYPE`, say) threads a
//! single explicit cursor through the recursion instead of sharing hidden mutable state.
//!
//! # Usage Examples
//!
//! ```rust
//! use nanometa::Parser;
//!
//! // compressed uint 0x0203, then compressed token (TypeRef #3)
//! let data = [0x82, 0x03, 0x0D];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_compressed_uint()?, 0x0203);
//! let token = parser.read_compressed_token()?;
//! assert_eq!(token.value(), 0x0100_0003);
//! # Ok::<(), nanometa::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::{tables::TableKind, token::Token},
    Error::OutOfBounds,
    Result,
};

/// Table id used by the runtime for the fourth (unassigned) compressed-token tag.
pub const UNKNOWN_TOKEN_TABLE: u32 = 0xFF;

/// A generic binary data parser for reading metadata structures.
///
/// The parser maintains an internal position cursor and provides bounds checking
/// to prevent buffer overruns when reading malformed or truncated data.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Create a new [`Parser`] positioned at `position`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `position` lies beyond the end of `data`.
    pub fn new_at(data: &'a [u8], position: usize) -> Result<Self> {
        if position > data.len() {
            return Err(OutOfBounds);
        }

        Ok(Parser { data, position })
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move the position forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing would exceed the data length.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if self.position + step > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Peek at the current byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the cursor is at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        match self.data.get(self.position) {
            Some(byte) => Ok(*byte),
            None => Err(OutOfBounds),
        }
    }

    /// Read a type T from the current position in little-endian format and advance.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are not enough bytes remaining.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a compressed unsigned integer.
    ///
    /// The encoding uses 1, 2 or 4 bytes, big-endian, with the high bits of the first byte
    /// selecting the width:
    /// - `0xxxxxxx` - 7 bit value
    /// - `10xxxxxx xxxxxxxx` - 14 bit value
    /// - `110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx` - 29 bit value
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input, or [`crate::Error::Malformed`]
    /// if the first byte does not start a valid encoding.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok(value);
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            let value = ((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3;
            return Ok(value);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a compressed type token.
    ///
    /// The value is a compressed uint whose two low bits select the table and whose remaining
    /// bits hold the index:
    /// - `0` - `TypeDef`
    /// - `1` - `TypeRef`
    /// - `2` - `TypeSpec`
    /// - `3` - no table; the runtime decodes this to table id `0xFF`, and so do we
    ///
    /// # Errors
    /// Returns an error if the underlying compressed uint cannot be read.
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;

        let table = match compressed_token & 0x3 {
            0x0 => TableKind::TypeDef as u32,
            0x1 => TableKind::TypeRef as u32,
            0x2 => TableKind::TypeSpec as u32,
            _ => UNKNOWN_TOKEN_TABLE,
        };

        Ok(Token::new((table << 24) | (compressed_token >> 2)))
    }
}

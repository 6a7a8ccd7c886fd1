//! String heap of an assembly image.

use std::{borrow::Cow, ffi::CStr, str};

use crate::{metadata::tables::EMPTY_INDEX, Error::OutOfBounds, Result};

/// Lowest index that can address the runtime's built-in string table.
pub const BUILTIN_STRING_FLOOR: u16 = 0x8000;

/// The string heap holds the identifiers referenced by the record tables.
///
/// Entries are NUL-terminated UTF-8 and addressed by their byte offset. The empty index
/// `0xFFFF` stands for the empty string.
///
/// Well-known names are not stored in the heap at all: the image refers to them as
/// `0xFFFF - n`, where `n` is the position of the name in the built-in string table compiled
/// into the runtime. That table is not part of the image, so such names resolve to
/// [`builtin_placeholder`] instead.
pub struct Strings<'a> {
    data: &'a [u8],
}

/// Position in the runtime's built-in string table addressed by `index`, if any.
///
/// An index is built-in when it is at or above [`BUILTIN_STRING_FLOOR`] and points past the
/// end of a heap of `heap_len` bytes.
#[must_use]
pub fn builtin_string_id(index: u16, heap_len: usize) -> Option<u16> {
    if index == EMPTY_INDEX || index < BUILTIN_STRING_FLOOR || usize::from(index) < heap_len {
        return None;
    }
    Some(EMPTY_INDEX - index)
}

/// Stand-in name for entry `id` of the built-in string table.
///
/// ```rust
/// use nanometa::metadata::streams::builtin_placeholder;
///
/// assert_eq!(builtin_placeholder(0x58), "BUILTIN_STRING_0058");
/// ```
#[must_use]
pub fn builtin_placeholder(id: u16) -> String {
    format!("BUILTIN_STRING_{id:04X}")
}

impl<'a> Strings<'a> {
    /// Create a `Strings` view over the heap bytes
    #[must_use]
    pub fn from(data: &'a [u8]) -> Strings<'a> {
        Strings { data }
    }

    /// Get the string starting at `index`.
    ///
    /// Built-in indices yield an owned placeholder, heap entries are borrowed.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` lies outside the heap and below the
    /// built-in range, or [`crate::Error::Malformed`] if the entry is unterminated or not
    /// valid UTF-8.
    pub fn get(&self, index: u16) -> Result<Cow<'a, str>> {
        if index == EMPTY_INDEX {
            return Ok(Cow::Borrowed(""));
        }

        if let Some(id) = builtin_string_id(index, self.data.len()) {
            return Ok(Cow::Owned(builtin_placeholder(id)));
        }

        let index = usize::from(index);
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(Cow::Borrowed(result)),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Unterminated string at index - {}", index)),
        }
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the heap holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        let data = b"Acme.Widgets\0Gadget\0<Value>k__BackingField\0";
        let strings = Strings::from(data);

        assert_eq!(strings.get(0).unwrap(), "Acme.Widgets");
        assert_eq!(strings.get(13).unwrap(), "Gadget");
        assert_eq!(strings.get(16).unwrap(), "get");
        assert_eq!(strings.get(20).unwrap(), "<Value>k__BackingField");
        assert_eq!(strings.get(EMPTY_INDEX).unwrap(), "");
    }

    #[test]
    fn invalid() {
        let strings = Strings::from(b"abc");
        assert!(matches!(strings.get(0), Err(crate::Error::Malformed { .. })));
        assert!(matches!(strings.get(3), Err(OutOfBounds)));
        assert!(matches!(strings.get(0x7FFF), Err(OutOfBounds)));

        let strings = Strings::from(&[0xC3, 0x28, 0x00]);
        assert!(strings.get(0).is_err());
    }

    #[test]
    fn builtin_indices() {
        let strings = Strings::from(b"Gadget\0");

        // "DateTime" sits at position 0x58 of the runtime table
        assert_eq!(strings.get(0xFFA7).unwrap(), "BUILTIN_STRING_0058");
        assert!(matches!(strings.get(0xFFA7).unwrap(), Cow::Owned(_)));
        assert_eq!(strings.get(0x8000).unwrap(), "BUILTIN_STRING_7FFF");
        assert!(matches!(strings.get(0).unwrap(), Cow::Borrowed("Gadget")));
    }

    #[test]
    fn builtin_range() {
        assert_eq!(builtin_string_id(0xFFA7, 16), Some(0x58));
        assert_eq!(builtin_string_id(0xFF5D, 16), Some(0xA2));
        assert_eq!(builtin_string_id(EMPTY_INDEX, 16), None);
        assert_eq!(builtin_string_id(0x7FFF, 16), None);
        // a heap this large owns the index
        assert_eq!(builtin_string_id(0x8004, 0x9000), None);
    }
}

//! Signature heap of an assembly image.

use crate::{Error::OutOfBounds, Result};

/// The signature heap holds compressed field, method, local and type signatures.
///
/// Unlike a length-prefixed blob heap, entries carry no size: a signature is self-delimiting
/// and the decoder reads exactly as many bytes as the element kinds require.
pub struct SignatureHeap<'a> {
    data: &'a [u8],
}

impl<'a> SignatureHeap<'a> {
    /// Create a `SignatureHeap` view over the heap bytes
    #[must_use]
    pub fn from(data: &'a [u8]) -> SignatureHeap<'a> {
        SignatureHeap { data }
    }

    /// The heap bytes from `index` to the end of the heap.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` lies outside the heap.
    pub fn get(&self, index: u16) -> Result<&'a [u8]> {
        let index = usize::from(index);
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[index..])
    }

    /// The complete heap.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

//! Byte heaps of an assembly image.
//!
//! Two regions of an image are not record tables but heaps addressed by 16-bit offsets:
//!
//! - **Strings** - NUL-terminated UTF-8 identifiers (type, member, namespace and assembly names)
//! - **Signatures** - compressed type signatures, decoded by [`crate::metadata::signatures`]
//!
//! Both views borrow the image and never copy. Names taken from the runtime's built-in string
//! table are the one exception: they come back as owned placeholders.
//!
//! # Examples
//!
//! ```rust
//! use nanometa::metadata::streams::{SignatureHeap, Strings};
//!
//! let strings = Strings::from(b"Acme\0Gadget\0");
//! assert_eq!(strings.get(5)?, "Gadget");
//! assert_eq!(strings.get(0xFFFF)?, "");
//!
//! let heap = SignatureHeap::from(&[0x06, 0x07, 0x00, 0x01, 0x0F]);
//! assert_eq!(heap.get(3)?, &[0x01, 0x0F]);
//! # Ok::<(), nanometa::Error>(())
//! ```

mod signatureheap;
mod strings;

pub use signatureheap::SignatureHeap;
pub use strings::{builtin_placeholder, builtin_string_id, Strings, BUILTIN_STRING_FLOOR};

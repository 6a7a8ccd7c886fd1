//! Compressed signatures of the signature heap.
//!
//! Method, field and type-specification signatures share one element grammar: a single data
//! type byte, optionally followed by an inner element (`BYREF`, `SZARRAY`) or a compressed type
//! token (`CLASS`, `VALUETYPE`).
//!
//! # Binary Format
//!
//! - Method: calling convention, one byte parameter count `N`, then `N + 1` elements with the
//!   return type first
//! - Field: calling convention `0x06` followed by one element
//! - Local variables: calling convention `0x07`; the elements are not decoded
//! - Type specification: a single element
//!
//! # Examples
//!
//! ```rust
//! use nanometa::metadata::signatures::{parse_field_signature, parse_method_signature, ElementType};
//!
//! let method = parse_method_signature(&[0x00, 0x01, 0x00, 0x14, 0x07])?;
//! assert!(method.return_type.is_void());
//! assert_eq!(method.params, vec![ElementType::ByRef(Box::new(ElementType::I4))]);
//!
//! let field = parse_field_signature(&[0x06, 0x0F])?;
//! assert_eq!(field.base, ElementType::String);
//! # Ok::<(), nanometa::Error>(())
//! ```

mod encoders;
mod parser;
mod types;

pub use encoders::*;
pub use parser::*;
pub use types::*;

use crate::Result;

/// Parse a [`MethodSignature`] from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or truncated
pub fn parse_method_signature(data: &[u8]) -> Result<MethodSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_method_signature()
}

/// Parse a [`FieldSignature`] from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or truncated
pub fn parse_field_signature(data: &[u8]) -> Result<FieldSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_field_signature()
}

/// Parse a [`TypeSpecSignature`] from a byte slice
///
/// # Errors
/// Returns an error if the signature data is truncated
pub fn parse_type_spec_signature(data: &[u8]) -> Result<TypeSpecSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_type_spec_signature()
}

/// Parse any [`Signature`], classified by its calling convention byte
///
/// # Errors
/// Returns an error if the signature data is malformed or truncated
pub fn parse_signature(data: &[u8]) -> Result<Signature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_signature()
}

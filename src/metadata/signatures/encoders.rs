//! Signature encoders, the inverse of [`crate::metadata::signatures::SignatureParser`].
//!
//! The tooling never rewrites signatures of an existing image; these encoders exist so images
//! can be assembled from scratch by [`crate::metadata::builder::AssemblyBuilder`].

use crate::{
    metadata::{
        signatures::{ElementType, FieldSignature, MethodSignature, CALLING_CONVENTION},
        tables::TableKind,
        token::Token,
    },
    Error::{OutOfBounds, UnexpectedToken},
    Result,
};

/// Largest value representable by the compressed uint encoding (29 bits)
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Appends `value` as a compressed uint.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
pub fn encode_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    if value < 0x80 {
        buffer.push(value as u8);
    } else if value < 0x4000 {
        buffer.push(0x80 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else if value <= MAX_COMPRESSED_UINT {
        buffer.push(0xC0 | (value >> 24) as u8);
        buffer.push((value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        return Err(OutOfBounds);
    }

    Ok(())
}

/// Appends a type token in its compressed form: the index shifted left by two with the table
/// tag (`TypeDef` 0, `TypeRef` 1, `TypeSpec` 2) in the low bits.
///
/// # Errors
/// Returns [`crate::Error::UnexpectedToken`] for a token of any other table, or
/// [`crate::Error::OutOfBounds`] if the index does not fit the encoding.
pub fn encode_compressed_token(token: Token, buffer: &mut Vec<u8>) -> Result<()> {
    let tag = match token.table() {
        Some(TableKind::TypeDef) => 0,
        Some(TableKind::TypeRef) => 1,
        Some(TableKind::TypeSpec) => 2,
        _ => return Err(UnexpectedToken(token)),
    };

    let index = token.index();
    if index > (MAX_COMPRESSED_UINT >> 2) {
        return Err(OutOfBounds);
    }

    encode_compressed_uint((index << 2) | tag, buffer)
}

/// Appends one element.
///
/// # Errors
/// Returns an error if an embedded token cannot be encoded.
pub fn encode_element(element: &ElementType, buffer: &mut Vec<u8>) -> Result<()> {
    buffer.push(element.opcode());

    match element {
        ElementType::ByRef(inner) | ElementType::SzArray(inner) => encode_element(inner, buffer),
        ElementType::ValueType(token) | ElementType::Class(token) => {
            encode_compressed_token(*token, buffer)
        }
        _ => Ok(()),
    }
}

/// Encodes a method signature: calling convention, a one byte parameter count, the return
/// type, then each parameter.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] for more than 255 parameters, or an error if an
/// element cannot be encoded.
pub fn encode_method_signature(signature: &MethodSignature) -> Result<Vec<u8>> {
    let param_count = u8::try_from(signature.params.len()).map_err(|_| OutOfBounds)?;

    let mut buffer = Vec::with_capacity(3 + signature.params.len());
    buffer.push(if signature.has_this {
        CALLING_CONVENTION::DEFAULT | CALLING_CONVENTION::HAS_THIS
    } else {
        CALLING_CONVENTION::DEFAULT
    });
    buffer.push(param_count);

    encode_element(&signature.return_type, &mut buffer)?;
    for param in &signature.params {
        encode_element(param, &mut buffer)?;
    }

    Ok(buffer)
}

/// Encodes a field signature: the field calling convention followed by the field type.
///
/// # Errors
/// Returns an error if the element cannot be encoded.
pub fn encode_field_signature(signature: &FieldSignature) -> Result<Vec<u8>> {
    let mut buffer = vec![CALLING_CONVENTION::FIELD];
    encode_element(&signature.base, &mut buffer)?;
    Ok(buffer)
}

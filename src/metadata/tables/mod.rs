//! Fixed-size record tables of an assembly image.
//!
//! Every table is a contiguous array of little-endian records whose layout is shared with the
//! runtime byte for byte. Each record type implements [`Record`], which ties it to its
//! [`TableKind`] and provides the read and write halves of the layout.
//!
//! # Index conventions
//!
//! - Table and heap references are 16-bit; [`EMPTY_INDEX`] (`0xFFFF`) means "none".
//! - `TypeRef.scope` and `TypeDef.extends` carry [`TYPEREF_FLAG`] (`0x8000`) when the low 15 bits
//!   index the `TypeRef` table rather than `AssemblyRef` or `TypeDef`.
//! - A method with RVA [`EMPTY_INDEX`] has no managed body.

use crate::{metadata::token::Token, Result};

mod assemblyref;
mod attribute;
mod fielddef;
mod memberref;
mod methoddef;
mod resource;
mod tablekind;
mod typedef;
mod typeref;
mod typespec;

pub use assemblyref::*;
pub use attribute::*;
pub use fielddef::*;
pub use memberref::*;
pub use methoddef::*;
pub use resource::*;
pub use tablekind::*;
pub use typedef::*;
pub use typeref::*;
pub use typespec::*;

/// The "no index" sentinel used by every 16-bit table and heap reference.
pub const EMPTY_INDEX: u16 = 0xFFFF;

/// Marks a scope or base-type reference as pointing into the `TypeRef` table.
pub const TYPEREF_FLAG: u16 = 0x8000;

/// A record type stored in one of the image tables.
pub trait Record: Sized + Copy {
    /// The table this record lives in
    const KIND: TableKind;
    /// Size of one record in bytes
    const SIZE: usize;

    /// Reads one record at `offset`, advancing it by [`Record::SIZE`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data is too short.
    fn read(data: &[u8], offset: &mut usize) -> Result<Self>;

    /// Appends the record's byte representation to `out`.
    fn write(&self, out: &mut Vec<u8>);

    /// The token addressing record `index` of this table.
    #[must_use]
    fn token(index: u32) -> Token {
        Token::encode(Self::KIND, index)
    }
}

/// A reference that is either a local table index or, when [`TYPEREF_FLAG`] is set, a
/// `TypeRef` index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeOrigin {
    /// Index into the table the field naturally refers to (`AssemblyRef` for a scope,
    /// `TypeDef` for a base type)
    Local(u16),
    /// Index into the `TypeRef` table
    TypeRef(u16),
}

impl TypeOrigin {
    /// Splits a flagged 16-bit reference. Returns `None` for [`EMPTY_INDEX`].
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        if raw == EMPTY_INDEX {
            None
        } else if raw & TYPEREF_FLAG != 0 {
            Some(TypeOrigin::TypeRef(raw & !TYPEREF_FLAG))
        } else {
            Some(TypeOrigin::Local(raw))
        }
    }
}

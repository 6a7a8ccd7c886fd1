use std::ops::Range;

use bitflags::bitflags;

use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind, TypeOrigin, EMPTY_INDEX},
    Result,
};

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// Flags of a `TypeDef` record
    pub struct TypeDefFlags : u16 {
        /// Visibility and nesting scope
        const SCOPE_MASK = 0x0007;
        /// Type is serializable
        const SERIALIZABLE = 0x0008;
        /// Semantics selector, see [`TypeSemantics`]
        const SEMANTICS_MASK = 0x0030;
        /// Type is abstract
        const ABSTRACT = 0x0040;
        /// Type cannot be derived from
        const SEALED = 0x0080;
        /// Name is special
        const SPECIAL_NAME = 0x0100;
        /// Type is a delegate
        const DELEGATE = 0x0200;
        /// Type is a multicast delegate
        const MULTICAST_DELEGATE = 0x0400;
        /// Type has been patched
        const PATCHED = 0x0800;
        /// Static constructor may run lazily
        const BEFORE_FIELD_INIT = 0x1000;
        /// Type carries security information
        const HAS_SECURITY = 0x2000;
        /// Type declares a finalizer
        const HAS_FINALIZER = 0x4000;
        /// Type carries custom attributes
        const HAS_ATTRIBUTES = 0x8000;
    }
}

/// The semantics selected by [`TypeDefFlags::SEMANTICS_MASK`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeSemantics {
    /// Reference type
    Class,
    /// Value type
    ValueType,
    /// Interface
    Interface,
    /// Enumeration
    Enum,
}

impl TypeDefFlags {
    /// Decodes the semantics bits.
    #[must_use]
    pub fn semantics(self) -> TypeSemantics {
        match self.bits() & TypeDefFlags::SEMANTICS_MASK.bits() {
            0x00 => TypeSemantics::Class,
            0x10 => TypeSemantics::ValueType,
            0x20 => TypeSemantics::Interface,
            _ => TypeSemantics::Enum,
        }
    }
}

/// A type defined in this assembly. `TableKind` = 4
///
/// The type's methods form one contiguous range of the `MethodDef` table starting at
/// `methods_first`, ordered virtual, then instance, then static. Static and instance fields
/// are two independent ranges of the `FieldDef` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeDefRecord {
    /// String heap index of the type name
    pub name: u16,
    /// String heap index of the namespace
    pub namespace: u16,
    /// Base type: a `TypeDef` index, or a `TypeRef` index when flagged with `0x8000`
    pub extends: u16,
    /// `TypeDef` index of the enclosing type, [`EMPTY_INDEX`] when not nested
    pub enclosing_type: u16,
    /// Type flags
    pub flags: TypeDefFlags,
    /// Signature heap index of the implemented interface list
    pub interfaces: u16,
    /// First `MethodDef` index
    pub methods_first: u16,
    /// Number of virtual methods
    pub v_methods_num: u8,
    /// Number of instance methods
    pub i_methods_num: u8,
    /// Number of static methods
    pub s_methods_num: u8,
    /// Runtime data type of the type (the element type a value of it marshals as)
    pub data_type: u8,
    /// First static `FieldDef` index
    pub s_fields_first: u16,
    /// First instance `FieldDef` index
    pub i_fields_first: u16,
    /// Number of static fields
    pub s_fields_num: u8,
    /// Number of instance fields
    pub i_fields_num: u8,
}

impl TypeDefRecord {
    /// Total number of methods of the type.
    #[must_use]
    pub fn method_count(&self) -> usize {
        usize::from(self.v_methods_num)
            + usize::from(self.i_methods_num)
            + usize::from(self.s_methods_num)
    }

    /// The full `MethodDef` range of the type.
    #[must_use]
    pub fn methods(&self) -> Range<usize> {
        let first = usize::from(self.methods_first);
        first..first + self.method_count()
    }

    /// The virtual sub-range.
    #[must_use]
    pub fn virtual_methods(&self) -> Range<usize> {
        let first = usize::from(self.methods_first);
        first..first + usize::from(self.v_methods_num)
    }

    /// The instance sub-range.
    #[must_use]
    pub fn instance_methods(&self) -> Range<usize> {
        let first = self.virtual_methods().end;
        first..first + usize::from(self.i_methods_num)
    }

    /// The static sub-range.
    #[must_use]
    pub fn static_methods(&self) -> Range<usize> {
        let first = self.instance_methods().end;
        first..first + usize::from(self.s_methods_num)
    }

    /// The static `FieldDef` range.
    #[must_use]
    pub fn static_fields(&self) -> Range<usize> {
        let first = usize::from(self.s_fields_first);
        first..first + usize::from(self.s_fields_num)
    }

    /// The instance `FieldDef` range.
    #[must_use]
    pub fn instance_fields(&self) -> Range<usize> {
        let first = usize::from(self.i_fields_first);
        first..first + usize::from(self.i_fields_num)
    }

    /// The decoded semantics of the type.
    #[must_use]
    pub fn semantics(&self) -> TypeSemantics {
        self.flags.semantics()
    }

    /// `true` for delegates and multicast delegates.
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        self.flags
            .intersects(TypeDefFlags::DELEGATE | TypeDefFlags::MULTICAST_DELEGATE)
    }

    /// The base type, if any. [`TypeOrigin::Local`] indexes the `TypeDef` table.
    #[must_use]
    pub fn base_type(&self) -> Option<TypeOrigin> {
        TypeOrigin::from_raw(self.extends)
    }

    /// `TypeDef` index of the enclosing type, if nested.
    #[must_use]
    pub fn enclosing(&self) -> Option<u16> {
        (self.enclosing_type != EMPTY_INDEX).then_some(self.enclosing_type)
    }
}

impl Record for TypeDefRecord {
    const KIND: TableKind = TableKind::TypeDef;
    const SIZE: usize = 24;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(TypeDefRecord {
            name: read_le_at::<u16>(data, offset)?,
            namespace: read_le_at::<u16>(data, offset)?,
            extends: read_le_at::<u16>(data, offset)?,
            enclosing_type: read_le_at::<u16>(data, offset)?,
            flags: TypeDefFlags::from_bits_retain(read_le_at::<u16>(data, offset)?),
            interfaces: read_le_at::<u16>(data, offset)?,
            methods_first: read_le_at::<u16>(data, offset)?,
            v_methods_num: read_le_at::<u8>(data, offset)?,
            i_methods_num: read_le_at::<u8>(data, offset)?,
            s_methods_num: read_le_at::<u8>(data, offset)?,
            data_type: read_le_at::<u8>(data, offset)?,
            s_fields_first: read_le_at::<u16>(data, offset)?,
            i_fields_first: read_le_at::<u16>(data, offset)?,
            s_fields_num: read_le_at::<u8>(data, offset)?,
            i_fields_num: read_le_at::<u8>(data, offset)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.name);
        push_le(out, self.namespace);
        push_le(out, self.extends);
        push_le(out, self.enclosing_type);
        push_le(out, self.flags.bits());
        push_le(out, self.interfaces);
        push_le(out, self.methods_first);
        push_le(out, self.v_methods_num);
        push_le(out, self.i_methods_num);
        push_le(out, self.s_methods_num);
        push_le(out, self.data_type);
        push_le(out, self.s_fields_first);
        push_le(out, self.i_fields_first);
        push_le(out, self.s_fields_num);
        push_le(out, self.i_fields_num);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x00,             // name
            0x02, 0x00,             // namespace
            0x03, 0x80,             // extends TypeRef #3
            0xFF, 0xFF,             // not nested
            0x10, 0x02,             // value type + delegate
            0xFF, 0xFF,             // interfaces
            0x04, 0x00,             // methods_first
            0x01, 0x02, 0x03,       // v / i / s methods
            0x12,                   // data type
            0x05, 0x00,             // sFields_first
            0x07, 0x00,             // iFields_first
            0x02, 0x01,             // s / i fields
        ];

        let mut offset = 0;
        let record = TypeDefRecord::read(&data, &mut offset).unwrap();
        assert_eq!(offset, 24);

        assert_eq!(record.base_type(), Some(TypeOrigin::TypeRef(3)));
        assert_eq!(record.enclosing(), None);
        assert_eq!(record.semantics(), TypeSemantics::ValueType);
        assert!(record.is_delegate());
        assert_eq!(record.data_type, 0x12);

        assert_eq!(record.method_count(), 6);
        assert_eq!(record.methods(), 4..10);
        assert_eq!(record.virtual_methods(), 4..5);
        assert_eq!(record.instance_methods(), 5..7);
        assert_eq!(record.static_methods(), 7..10);
        assert_eq!(record.static_fields(), 5..7);
        assert_eq!(record.instance_fields(), 7..8);

        let mut out = Vec::new();
        record.write(&mut out);
        assert_eq!(out, data);
    }

    #[test]
    fn semantics() {
        let flags = |bits| TypeDefFlags::from_bits_retain(bits);
        assert_eq!(flags(0x0000).semantics(), TypeSemantics::Class);
        assert_eq!(flags(0x0010).semantics(), TypeSemantics::ValueType);
        assert_eq!(flags(0x0020).semantics(), TypeSemantics::Interface);
        assert_eq!(flags(0x0030).semantics(), TypeSemantics::Enum);
        assert_eq!(flags(0x80C1).semantics(), TypeSemantics::Class);
    }
}

use bitflags::bitflags;

use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind},
    Result,
};

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// Flags of a `FieldDef` record
    pub struct FieldDefFlags : u16 {
        /// Field access mask
        const SCOPE_MASK = 0x0007;
        /// Field is not serialized
        const NOT_SERIALIZED = 0x0008;
        /// Field belongs to the type, not the instance
        const STATIC = 0x0010;
        /// Field can only be assigned in a constructor
        const INIT_ONLY = 0x0020;
        /// Compile-time constant
        const LITERAL = 0x0040;
        /// Name is special
        const SPECIAL_NAME = 0x0100;
        /// Field has a default value
        const HAS_DEFAULT = 0x0200;
        /// Field has an RVA
        const HAS_FIELD_RVA = 0x0400;
        /// Field is hidden from reflection
        const NO_REFLECTION = 0x0800;
        /// Field carries custom attributes
        const HAS_ATTRIBUTES = 0x8000;
    }
}

/// A field defined in this assembly. `TableKind` = 5
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDefRecord {
    /// String heap index of the field name
    pub name: u16,
    /// Signature heap index of the field signature
    pub sig: u16,
    /// Signature heap index of the default value blob
    pub default_value: u16,
    /// Field flags
    pub flags: FieldDefFlags,
}

impl FieldDefRecord {
    /// `true` for static fields.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(FieldDefFlags::STATIC)
    }
}

impl Record for FieldDefRecord {
    const KIND: TableKind = TableKind::FieldDef;
    const SIZE: usize = 8;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(FieldDefRecord {
            name: read_le_at::<u16>(data, offset)?,
            sig: read_le_at::<u16>(data, offset)?,
            default_value: read_le_at::<u16>(data, offset)?,
            flags: FieldDefFlags::from_bits_retain(read_le_at::<u16>(data, offset)?),
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.name);
        push_le(out, self.sig);
        push_le(out, self.default_value);
        push_le(out, self.flags.bits());
    }
}

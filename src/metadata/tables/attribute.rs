use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind},
    Result,
};

/// A custom attribute application. `TableKind` = 7
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeRecord {
    /// Table id of the owner (`TypeDef`, `MethodDef` or `FieldDef`)
    pub owner_type: u16,
    /// Index of the owner within its table
    pub owner_index: u16,
    /// Method token index of the attribute constructor
    pub constructor: u16,
    /// Signature heap index of the serialized arguments
    pub data: u16,
}

impl Record for AttributeRecord {
    const KIND: TableKind = TableKind::Attributes;
    const SIZE: usize = 8;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(AttributeRecord {
            owner_type: read_le_at::<u16>(data, offset)?,
            owner_index: read_le_at::<u16>(data, offset)?,
            constructor: read_le_at::<u16>(data, offset)?,
            data: read_le_at::<u16>(data, offset)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.owner_type);
        push_le(out, self.owner_index);
        push_le(out, self.constructor);
        push_le(out, self.data);
    }
}

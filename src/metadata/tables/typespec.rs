use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind},
    Result,
};

/// A constructed type referenced from signatures. `TableKind` = 8
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeSpecRecord {
    /// Signature heap index of the type signature
    pub sig: u16,
}

impl Record for TypeSpecRecord {
    const KIND: TableKind = TableKind::TypeSpec;
    const SIZE: usize = 4;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        let sig = read_le_at::<u16>(data, offset)?;
        let _pad = read_le_at::<u16>(data, offset)?;

        Ok(TypeSpecRecord { sig })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.sig);
        push_le(out, 0u16);
    }
}

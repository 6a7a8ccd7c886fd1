use crate::{
    file::io::{push_le, read_le_at},
    metadata::{header::Version, tables::{Record, TableKind}},
    Result,
};

/// A reference to another assembly. `TableKind` = 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssemblyRefRecord {
    /// String heap index of the referenced assembly's name
    pub name: u16,
    /// Version the image was compiled against
    pub version: Version,
}

impl Record for AssemblyRefRecord {
    const KIND: TableKind = TableKind::AssemblyRef;
    const SIZE: usize = 12;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        let name = read_le_at::<u16>(data, offset)?;
        let _pad = read_le_at::<u16>(data, offset)?;
        let version = Version::read(data, offset)?;

        Ok(AssemblyRefRecord { name, version })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.name);
        push_le(out, 0u16);
        self.version.write(out);
    }
}

use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind},
    Result,
};

/// An embedded resource descriptor. `TableKind` = 9
///
/// The payload starts at `offset` inside the `ResourcesData` region and runs up to the next
/// descriptor's offset; the table ends with a sentinel descriptor that only closes the last one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Resource id
    pub id: i16,
    /// Resource kind (bitmap, font, string, binary)
    pub kind: u8,
    /// Resource flags
    pub flags: u8,
    /// Offset of the payload within the `ResourcesData` region
    pub offset: u32,
}

impl Record for ResourceRecord {
    const KIND: TableKind = TableKind::Resources;
    const SIZE: usize = 8;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(ResourceRecord {
            id: read_le_at::<i16>(data, offset)?,
            kind: read_le_at::<u8>(data, offset)?,
            flags: read_le_at::<u8>(data, offset)?,
            offset: read_le_at::<u32>(data, offset)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.id);
        push_le(out, self.kind);
        push_le(out, self.flags);
        push_le(out, self.offset);
    }
}

/// A resource file descriptor. `TableKind` = 14
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceFileRecord {
    /// String heap index of the resource file name
    pub name: u16,
    /// Number of resources the file contributes
    pub number_of_resources: u32,
}

impl Record for ResourceFileRecord {
    const KIND: TableKind = TableKind::ResourcesFiles;
    const SIZE: usize = 8;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        let name = read_le_at::<u16>(data, offset)?;
        let _pad = read_le_at::<u16>(data, offset)?;
        let number_of_resources = read_le_at::<u32>(data, offset)?;

        Ok(ResourceFileRecord {
            name,
            number_of_resources,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.name);
        push_le(out, 0u16);
        push_le(out, self.number_of_resources);
    }
}

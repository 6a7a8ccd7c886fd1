//! The assembly header.
//!
//! Every image starts with a fixed 124-byte header carrying the assembly identity, the start
//! offset of each of the sixteen regions, and three integrity values:
//!
//! | Offset | Size | Field |
//! |-------:|-----:|-------|
//! | 0 | 8 | marker `NFMRK1` |
//! | 8 | 4 | header CRC |
//! | 12 | 4 | assembly CRC |
//! | 16 | 4 | flags |
//! | 20 | 4 | native methods checksum |
//! | 24 | 4 | patch entry offset |
//! | 28 | 8 | version |
//! | 36 | 2 | assembly name |
//! | 38 | 2 | string table version |
//! | 40 | 64 | region start offsets |
//! | 104 | 4 | number of patched methods |
//! | 108 | 16 | region padding |
//!
//! The assembly CRC covers everything after the header up to the end of the image; the header
//! CRC covers the header itself with the header CRC field zeroed. Both use the seed `0`.

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::TableKind,
    utils::crc::compute_crc,
    Error::{Empty, NotSupported, OutOfBounds},
    Result,
};

/// The marker every image starts with.
pub const MARKER: [u8; 8] = *b"NFMRK1\0\0";
/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 124;
/// Offset of the header CRC.
pub const HEADER_CRC_OFFSET: usize = 8;
/// Offset of the assembly CRC.
pub const ASSEMBLY_CRC_OFFSET: usize = 12;
/// Offset of the native methods checksum.
pub const NATIVE_CHECKSUM_OFFSET: usize = 20;

/// A four part version number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl Version {
    /// Creates a version from its four parts.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Version {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Reads a version at `offset`, advancing it by 8 bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data is too short.
    pub fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(Version {
            major: read_le_at::<u16>(data, offset)?,
            minor: read_le_at::<u16>(data, offset)?,
            build: read_le_at::<u16>(data, offset)?,
            revision: read_le_at::<u16>(data, offset)?,
        })
    }

    /// Appends the version's byte representation to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.major);
        push_le(out, self.minor);
        push_le(out, self.build);
        push_le(out, self.revision);
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// The parsed assembly header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyHeader {
    /// CRC over the header with this field zeroed
    pub header_crc: u32,
    /// CRC over the image after the header
    pub assembly_crc: u32,
    /// Assembly flags
    pub flags: u32,
    /// Checksum binding the managed native-method declarations to their implementation
    pub native_methods_checksum: u32,
    /// Patch entry offset
    pub patch_entry_offset: u32,
    /// Assembly version
    pub version: Version,
    /// String heap index of the assembly name
    pub assembly_name: u16,
    /// String table version
    pub string_table_version: u16,
    /// Start offset of each region, indexed by [`TableKind`]
    pub start_of_tables: [u32; TableKind::COUNT],
    /// Number of patched methods
    pub num_of_patched_methods: u32,
    /// Trailing padding of each region, indexed by [`TableKind`]
    pub padding_of_tables: [u8; TableKind::COUNT],
}

impl AssemblyHeader {
    /// Parses the header at the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for empty input, [`crate::Error::NotSupported`] if the
    /// marker is missing, or [`crate::Error::OutOfBounds`] if the header is truncated.
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Empty);
        }

        if data.len() < MARKER.len() || data[..6] != MARKER[..6] {
            return Err(NotSupported);
        }

        if data.len() < HEADER_SIZE {
            return Err(OutOfBounds);
        }

        let mut offset = MARKER.len();
        let header_crc = read_le_at::<u32>(data, &mut offset)?;
        let assembly_crc = read_le_at::<u32>(data, &mut offset)?;
        let flags = read_le_at::<u32>(data, &mut offset)?;
        let native_methods_checksum = read_le_at::<u32>(data, &mut offset)?;
        let patch_entry_offset = read_le_at::<u32>(data, &mut offset)?;
        let version = Version::read(data, &mut offset)?;
        let assembly_name = read_le_at::<u16>(data, &mut offset)?;
        let string_table_version = read_le_at::<u16>(data, &mut offset)?;

        let mut start_of_tables = [0u32; TableKind::COUNT];
        for start in &mut start_of_tables {
            *start = read_le_at::<u32>(data, &mut offset)?;
        }

        let num_of_patched_methods = read_le_at::<u32>(data, &mut offset)?;

        let mut padding_of_tables = [0u8; TableKind::COUNT];
        for padding in &mut padding_of_tables {
            *padding = read_le_at::<u8>(data, &mut offset)?;
        }

        Ok(AssemblyHeader {
            header_crc,
            assembly_crc,
            flags,
            native_methods_checksum,
            patch_entry_offset,
            version,
            assembly_name,
            string_table_version,
            start_of_tables,
            num_of_patched_methods,
            padding_of_tables,
        })
    }

    /// Appends the header's 124-byte representation to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MARKER);
        push_le(out, self.header_crc);
        push_le(out, self.assembly_crc);
        push_le(out, self.flags);
        push_le(out, self.native_methods_checksum);
        push_le(out, self.patch_entry_offset);
        self.version.write(out);
        push_le(out, self.assembly_name);
        push_le(out, self.string_table_version);
        for start in self.start_of_tables {
            push_le(out, start);
        }
        push_le(out, self.num_of_patched_methods);
        out.extend_from_slice(&self.padding_of_tables);
    }

    /// Start offset of a region.
    #[must_use]
    pub fn table_start(&self, kind: TableKind) -> usize {
        self.start_of_tables[kind as usize] as usize
    }

    /// Size in bytes of a region, excluding its trailing padding.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the offsets are not ascending or the padding
    /// exceeds the region.
    pub fn table_size(&self, kind: TableKind) -> Result<usize> {
        if kind == TableKind::EndOfAssembly {
            return Ok(0);
        }

        let start = self.start_of_tables[kind as usize];
        let end = self.start_of_tables[kind as usize + 1];
        let padding = u32::from(self.padding_of_tables[kind as usize]);

        end.checked_sub(start)
            .and_then(|size| size.checked_sub(padding))
            .map(|size| size as usize)
            .ok_or_else(|| {
                malformed_error!(
                    "Region {:?} has an invalid extent - start {}, end {}, padding {}",
                    kind,
                    start,
                    end,
                    padding
                )
            })
    }

    /// Total image size, the start offset of [`TableKind::EndOfAssembly`].
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.table_start(TableKind::EndOfAssembly)
    }

    /// Checks that every region lies inside an image of `len` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the image is shorter than its declared size or
    /// [`crate::Error::Malformed`] if a region has an invalid extent.
    pub fn check_extents(&self, len: usize) -> Result<()> {
        if self.total_size() > len || self.total_size() < HEADER_SIZE {
            return Err(OutOfBounds);
        }

        for kind in TableKind::iter() {
            let _ = self.table_size(kind)?;
        }

        Ok(())
    }
}

/// Computes the assembly CRC of an image: the CRC of `[HEADER_SIZE, total_size)`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the image is shorter than `total_size`.
pub fn compute_assembly_crc(image: &[u8], total_size: usize) -> Result<u32> {
    let body = image.get(HEADER_SIZE..total_size).ok_or(OutOfBounds)?;
    Ok(compute_crc(body, 0))
}

/// Computes the header CRC of an image: the CRC of the header with the header CRC zeroed.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the image is shorter than the header.
pub fn compute_header_crc(image: &[u8]) -> Result<u32> {
    let header = image.get(..HEADER_SIZE).ok_or(OutOfBounds)?;

    let crc = compute_crc(&header[..HEADER_CRC_OFFSET], 0);
    let crc = compute_crc(&[0u8; 4], crc);
    Ok(compute_crc(&header[HEADER_CRC_OFFSET + 4..], crc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> AssemblyHeader {
        let mut start_of_tables = [0u32; TableKind::COUNT];
        for (position, start) in start_of_tables.iter_mut().enumerate() {
            *start = (HEADER_SIZE + position * 4) as u32;
        }

        let mut padding_of_tables = [0u8; TableKind::COUNT];
        padding_of_tables[TableKind::Strings as usize] = 1;

        AssemblyHeader {
            header_crc: 0x1111_1111,
            assembly_crc: 0x2222_2222,
            flags: 0,
            native_methods_checksum: 0x3333_3333,
            patch_entry_offset: 0xFFFF_FFFF,
            version: Version::new(1, 2, 3, 4),
            assembly_name: 0,
            string_table_version: 1,
            start_of_tables,
            num_of_patched_methods: 0,
            padding_of_tables,
        }
    }

    #[test]
    fn write_then_read() {
        let header = sample_header();

        let mut out = Vec::new();
        header.write(&mut out);
        assert_eq!(out.len(), HEADER_SIZE);
        assert_eq!(&out[..6], b"NFMRK1");
        assert_eq!(&out[NATIVE_CHECKSUM_OFFSET..NATIVE_CHECKSUM_OFFSET + 4], &[0x33; 4]);

        let parsed = AssemblyHeader::read(&out).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn table_sizes() {
        let header = sample_header();
        assert_eq!(header.table_size(TableKind::TypeDef).unwrap(), 4);
        assert_eq!(header.table_size(TableKind::Strings).unwrap(), 3);
        assert_eq!(header.table_size(TableKind::EndOfAssembly).unwrap(), 0);
        assert_eq!(header.total_size(), HEADER_SIZE + 60);
    }

    #[test]
    fn invalid_extent() {
        let mut header = sample_header();
        header.start_of_tables[TableKind::MethodDef as usize] = 0;
        assert!(header.table_size(TableKind::FieldDef).is_err());
    }

    #[test]
    fn rejects_foreign_input() {
        assert!(matches!(AssemblyHeader::read(&[]), Err(Empty)));
        assert!(matches!(
            AssemblyHeader::read(b"MZ\x90\x00\x03\x00\x00\x00"),
            Err(NotSupported)
        ));
        assert!(matches!(
            AssemblyHeader::read(b"NFMRK1\0\0\0\0"),
            Err(OutOfBounds)
        ));
    }

    #[test]
    fn header_crc_ignores_its_own_field() {
        let mut out = Vec::new();
        sample_header().write(&mut out);
        let first = compute_header_crc(&out).unwrap();

        out[HEADER_CRC_OFFSET..HEADER_CRC_OFFSET + 4].copy_from_slice(&first.to_le_bytes());
        assert_eq!(compute_header_crc(&out).unwrap(), first);

        out[NATIVE_CHECKSUM_OFFSET] ^= 1;
        assert_ne!(compute_header_crc(&out).unwrap(), first);
    }

    #[test]
    fn assembly_crc_range() {
        let mut image = vec![0u8; HEADER_SIZE + 8];
        image[HEADER_SIZE..].copy_from_slice(b"12345678");
        let crc = compute_assembly_crc(&image, HEADER_SIZE + 8).unwrap();
        assert_eq!(crc, compute_crc(b"12345678", 0));

        // header bytes are not covered
        image[0] = 0xAA;
        assert_eq!(compute_assembly_crc(&image, HEADER_SIZE + 8).unwrap(), crc);
        assert!(compute_assembly_crc(&image, HEADER_SIZE + 9).is_err());
    }
}

//! The loaded assembly image and its typed, bounds-checked accessors.
//!
//! [`Assembly`] owns the image bytes and exposes every table through [`Assembly::get`] and a
//! named wrapper per kind. Records are small `Copy` values decoded on demand from the owned
//! buffer; nothing is cached apart from the few cross references computed once at load time:
//!
//! - the owner `TypeDef` of every `FieldDef` and `MethodDef`
//! - the storage offset of every instance field, taking inherited fields into account
//!
//! The image is read-only during generation. The only mutation is the header write-back
//! ([`Assembly::set_native_checksum`], [`Assembly::update_crcs`]) once a run has completed.

use std::{borrow::Cow, path::Path};

use strum::EnumCount;

use crate::{
    file::{io::read_le_at, output::Output},
    metadata::{
        header::{
            compute_assembly_crc, compute_header_crc, AssemblyHeader, Version,
            ASSEMBLY_CRC_OFFSET, HEADER_CRC_OFFSET, NATIVE_CHECKSUM_OFFSET,
        },
        streams::{SignatureHeap, Strings},
        tables::{
            AssemblyRefRecord, AttributeRecord, FieldDefRecord, FieldRefRecord, MethodDefRecord,
            MethodRefRecord, Record, ResourceFileRecord, ResourceRecord, TableKind, TypeDefRecord,
            TypeOrigin, TypeRefRecord, TypeSpecRecord,
        },
    },
    Error::{FileError, OutOfBounds, RecursionLimit},
    Result,
};

/// Maximum length of a base type chain before the image is considered cyclic
const MAX_INHERITANCE_DEPTH: usize = 64;

/// Supplies the instance field count of base types defined outside the image.
///
/// A type deriving from a `TypeRef` inherits that type's instance fields, which shifts the
/// storage offsets of its own fields. The image does not describe external types, so the
/// count comes from the caller.
pub trait BaseLayout {
    /// Number of instance fields of the external type `type_ref` (a `TypeRef` index).
    fn instance_field_count(&self, assembly: &Assembly, type_ref: u16) -> usize;
}

/// The default [`BaseLayout`]: every external base type contributes no fields, as is the case
/// for `System.Object` and `System.ValueType`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectLayout;

impl BaseLayout for ObjectLayout {
    fn instance_field_count(&self, _assembly: &Assembly, _type_ref: u16) -> usize {
        0
    }
}

/// A loaded assembly image.
///
/// # Examples
///
/// ```rust,no_run
/// use nanometa::metadata::assembly::Assembly;
///
/// let assembly = Assembly::from_file("Acme.Gadgets.pe".as_ref())?;
/// println!("{} {}", assembly.name().as_deref().unwrap_or("?"), assembly.version());
///
/// for index in 0..assembly.type_def_count() {
///     let type_def = assembly.type_def(index)?;
///     println!("{}", assembly.string(type_def.name)?);
/// }
/// # Ok::<(), nanometa::Error>(())
/// ```
pub struct Assembly {
    data: Vec<u8>,
    header: AssemblyHeader,
    counts: [usize; TableKind::COUNT],
    field_owners: Vec<Option<u16>>,
    method_owners: Vec<Option<u16>>,
    field_offsets: Vec<Option<u16>>,
}

impl Assembly {
    /// Loads an image from a file.
    ///
    /// The image is read into an owned buffer: generation patches the checksum and CRC fields
    /// in place before [`Assembly::to_file`] writes the buffer back.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, or any error of
    /// [`Assembly::from_mem`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(FileError)?;
        Self::from_mem(data)
    }

    /// Loads an image from memory, treating external base types as field-less.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`], [`crate::Error::NotSupported`] or
    /// [`crate::Error::OutOfBounds`] if the header cannot be read, and
    /// [`crate::Error::Malformed`] if the regions or cross references are inconsistent.
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        Self::from_mem_with_layout(data, &ObjectLayout)
    }

    /// Loads an image from memory, asking `layout` for the field counts of external base types.
    ///
    /// # Errors
    /// See [`Assembly::from_mem`].
    pub fn from_mem_with_layout(data: Vec<u8>, layout: &dyn BaseLayout) -> Result<Self> {
        let header = AssemblyHeader::read(&data)?;
        header.check_extents(data.len())?;

        let mut counts = [0usize; TableKind::COUNT];
        for (slot, count) in counts.iter_mut().enumerate() {
            let Some(kind) = TableKind::from_repr(slot as u8) else {
                continue;
            };

            let size = header.table_size(kind)?;
            *count = match kind.record_size() {
                Some(record_size) => size / record_size,
                None => size,
            };
        }

        let mut assembly = Assembly {
            data,
            header,
            counts,
            field_owners: Vec::new(),
            method_owners: Vec::new(),
            field_offsets: Vec::new(),
        };

        assembly.resolve_owners()?;
        assembly.resolve_field_offsets(layout)?;

        Ok(assembly)
    }

    fn resolve_owners(&mut self) -> Result<()> {
        let mut field_owners = vec![None; self.field_def_count()];
        let mut method_owners = vec![None; self.method_def_count()];

        for index in 0..self.type_def_count() {
            let type_def = self.type_def(index)?;
            let owner = Some(index as u16);

            for field in type_def
                .static_fields()
                .chain(type_def.instance_fields())
            {
                *field_owners.get_mut(field).ok_or(OutOfBounds)? = owner;
            }

            for method in type_def.methods() {
                *method_owners.get_mut(method).ok_or(OutOfBounds)? = owner;
            }
        }

        self.field_owners = field_owners;
        self.method_owners = method_owners;
        Ok(())
    }

    /// Total instance fields of a type including everything it inherits.
    fn total_instance_fields(
        &self,
        index: usize,
        layout: &dyn BaseLayout,
        totals: &mut [Option<usize>],
    ) -> Result<usize> {
        let mut chain = Vec::new();
        let mut current = index;

        // walk up until a known total or the root of the hierarchy
        let mut inherited = loop {
            if let Some(total) = totals.get(current).copied().flatten() {
                break total;
            }
            if chain.len() >= MAX_INHERITANCE_DEPTH {
                return Err(RecursionLimit(MAX_INHERITANCE_DEPTH));
            }
            chain.push(current);

            match self.type_def(current)?.base_type() {
                Some(TypeOrigin::Local(base)) => current = usize::from(base),
                Some(TypeOrigin::TypeRef(type_ref)) => {
                    break layout.instance_field_count(self, type_ref)
                }
                None => break 0,
            }
        };

        for &type_index in chain.iter().rev() {
            inherited += usize::from(self.type_def(type_index)?.i_fields_num);
            totals[type_index] = Some(inherited);
        }

        Ok(inherited)
    }

    fn resolve_field_offsets(&mut self, layout: &dyn BaseLayout) -> Result<()> {
        let mut offsets = vec![None; self.field_def_count()];
        let mut totals = vec![None; self.type_def_count()];

        for index in 0..self.type_def_count() {
            let total = self.total_instance_fields(index, layout, &mut totals)?;
            let type_def = self.type_def(index)?;
            let first_own = total - usize::from(type_def.i_fields_num);

            for (position, field) in type_def.instance_fields().enumerate() {
                // slot 0 of every object is its header
                let offset = u16::try_from(1 + first_own + position)
                    .map_err(|_| malformed_error!("Field offset overflow in type {}", index))?;
                *offsets.get_mut(field).ok_or(OutOfBounds)? = Some(offset);
            }
        }

        self.field_offsets = offsets;
        Ok(())
    }

    /// The image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The parsed header.
    #[must_use]
    pub fn header(&self) -> &AssemblyHeader {
        &self.header
    }

    /// The assembly name, `None` if the name index does not resolve.
    #[must_use]
    pub fn name(&self) -> Option<Cow<'_, str>> {
        self.string(self.header.assembly_name).ok()
    }

    /// The assembly version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.header.version
    }

    /// Number of records of a table, or the byte size of a heap region.
    #[must_use]
    pub fn count(&self, kind: TableKind) -> usize {
        self.counts[kind as usize]
    }

    /// The bytes of a region, excluding its trailing padding.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the region lies outside the image.
    pub fn region(&self, kind: TableKind) -> Result<&[u8]> {
        let start = self.header.table_start(kind);
        let size = self.header.table_size(kind)?;
        self.data.get(start..start + size).ok_or(OutOfBounds)
    }

    /// Absolute image offset of record `index` of a table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index exceeds the table, or
    /// [`crate::Error::Malformed`] for a heap region.
    pub fn record_offset(&self, kind: TableKind, index: usize) -> Result<usize> {
        let Some(record_size) = kind.record_size() else {
            return Err(malformed_error!("{:?} is not a record table", kind));
        };

        if index >= self.count(kind) {
            return Err(OutOfBounds);
        }

        Ok(self.header.table_start(kind) + index * record_size)
    }

    /// Reads record `index` of the table `R` lives in.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn get<R: Record>(&self, index: usize) -> Result<R> {
        let mut offset = self.record_offset(R::KIND, index)?;
        R::read(&self.data, &mut offset)
    }

    /// Reads `AssemblyRef` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn assembly_ref(&self, index: usize) -> Result<AssemblyRefRecord> {
        self.get(index)
    }

    /// Reads `TypeRef` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn type_ref(&self, index: usize) -> Result<TypeRefRecord> {
        self.get(index)
    }

    /// Reads `FieldRef` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn field_ref(&self, index: usize) -> Result<FieldRefRecord> {
        self.get(index)
    }

    /// Reads `MethodRef` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn method_ref(&self, index: usize) -> Result<MethodRefRecord> {
        self.get(index)
    }

    /// Reads `TypeDef` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn type_def(&self, index: usize) -> Result<TypeDefRecord> {
        self.get(index)
    }

    /// Reads `FieldDef` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn field_def(&self, index: usize) -> Result<FieldDefRecord> {
        self.get(index)
    }

    /// Reads `MethodDef` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn method_def(&self, index: usize) -> Result<MethodDefRecord> {
        self.get(index)
    }

    /// Reads attribute record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn attribute(&self, index: usize) -> Result<AttributeRecord> {
        self.get(index)
    }

    /// Reads `TypeSpec` record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn type_spec(&self, index: usize) -> Result<TypeSpecRecord> {
        self.get(index)
    }

    /// Reads resource record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn resource(&self, index: usize) -> Result<ResourceRecord> {
        self.get(index)
    }

    /// Reads resource file record `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the table.
    pub fn resource_file(&self, index: usize) -> Result<ResourceFileRecord> {
        self.get(index)
    }

    /// Number of `TypeDef` records.
    #[must_use]
    pub fn type_def_count(&self) -> usize {
        self.count(TableKind::TypeDef)
    }

    /// Number of `FieldDef` records.
    #[must_use]
    pub fn field_def_count(&self) -> usize {
        self.count(TableKind::FieldDef)
    }

    /// Number of `MethodDef` records.
    #[must_use]
    pub fn method_def_count(&self) -> usize {
        self.count(TableKind::MethodDef)
    }

    /// The string heap.
    #[must_use]
    pub fn strings(&self) -> Strings<'_> {
        Strings::from(self.region(TableKind::Strings).unwrap_or_default())
    }

    /// The signature heap.
    #[must_use]
    pub fn signatures(&self) -> SignatureHeap<'_> {
        SignatureHeap::from(self.region(TableKind::Signatures).unwrap_or_default())
    }

    /// Resolves a string index.
    ///
    /// Indices into the runtime's built-in string table resolve to a placeholder, see
    /// [`crate::metadata::streams::builtin_placeholder`].
    ///
    /// # Errors
    /// Returns an error if the index lies outside the heap or the entry is malformed.
    pub fn string(&self, index: u16) -> Result<Cow<'_, str>> {
        Strings::from(self.region(TableKind::Strings)?).get(index)
    }

    /// The signature heap from `index` to its end.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index lies outside the heap.
    pub fn signature(&self, index: u16) -> Result<&[u8]> {
        SignatureHeap::from(self.region(TableKind::Signatures)?).get(index)
    }

    /// The `TypeDef` that declares `FieldDef` record `field`.
    #[must_use]
    pub fn field_owner(&self, field: usize) -> Option<u16> {
        self.field_owners.get(field).copied().flatten()
    }

    /// The `TypeDef` that declares `MethodDef` record `method`.
    #[must_use]
    pub fn method_owner(&self, method: usize) -> Option<u16> {
        self.method_owners.get(method).copied().flatten()
    }

    /// Storage offset of an instance field inside its object, `None` for static or unowned
    /// fields.
    #[must_use]
    pub fn instance_field_offset(&self, field: usize) -> Option<u16> {
        self.field_offsets.get(field).copied().flatten()
    }

    /// The native methods checksum currently stored in the header.
    #[must_use]
    pub fn native_checksum(&self) -> u32 {
        self.header.native_methods_checksum
    }

    /// Stores a new native methods checksum in the header. The CRCs are not updated.
    pub fn set_native_checksum(&mut self, checksum: u32) {
        self.header.native_methods_checksum = checksum;
        self.write_header_u32(NATIVE_CHECKSUM_OFFSET, checksum);
    }

    /// Recomputes the assembly CRC and then the header CRC, in that order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the image is shorter than its declared size.
    pub fn update_crcs(&mut self) -> Result<()> {
        let assembly_crc = compute_assembly_crc(&self.data, self.header.total_size())?;
        self.header.assembly_crc = assembly_crc;
        self.write_header_u32(ASSEMBLY_CRC_OFFSET, assembly_crc);

        let header_crc = compute_header_crc(&self.data)?;
        self.header.header_crc = header_crc;
        self.write_header_u32(HEADER_CRC_OFFSET, header_crc);

        Ok(())
    }

    fn write_header_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Writes the image to `path`. The file is removed again if writing fails.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteMmapFailed`] if the output cannot be created or flushed.
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let mut output = Output::create(path, self.data.len() as u64)?;
        output.write_at(0, &self.data)?;
        output.finalize()
    }

    /// Reads a little-endian `u32` at an absolute image offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset lies outside the image.
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let mut offset = offset;
        read_le_at::<u32>(&self.data, &mut offset)
    }
}

//! Assembles images in the exact runtime layout.
//!
//! The tooling consumes images produced by the managed build; [`AssemblyBuilder`] exists so
//! images can be produced without it, for tests, benchmarks and fixtures. Strings and
//! signatures are interned, each region is padded to four bytes, and the finished image carries
//! valid CRCs.
//!
//! # Examples
//!
//! ```rust
//! use nanometa::metadata::{
//!     assembly::Assembly,
//!     builder::{AssemblyBuilder, FieldDefBuilder, MethodDefBuilder, TypeDefBuilder},
//!     header::Version,
//!     signatures::{ElementType, MethodSignature},
//!     tables::TYPEREF_FLAG,
//! };
//!
//! let mut builder = AssemblyBuilder::new("Acme.Gadgets", Version::new(1, 0, 0, 0));
//! let mscorlib = builder.assembly_ref("mscorlib", Version::new(1, 0, 0, 0));
//! let object = builder.type_ref("System", "Object", mscorlib);
//!
//! builder.type_def(
//!     TypeDefBuilder::new("Acme", "Gadget")
//!         .extends(TYPEREF_FLAG | object)
//!         .instance_field(FieldDefBuilder::new("_speed", ElementType::I4))
//!         .method(MethodDefBuilder::native(
//!             "Spin",
//!             MethodSignature { has_this: true, return_type: ElementType::Void, params: vec![] },
//!         )),
//! )?;
//!
//! let assembly = Assembly::from_mem(builder.build()?)?;
//! assert_eq!(assembly.type_def_count(), 1);
//! # Ok::<(), nanometa::Error>(())
//! ```

use std::collections::HashMap;

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    metadata::{
        header::{
            compute_assembly_crc, compute_header_crc, AssemblyHeader, Version,
            ASSEMBLY_CRC_OFFSET, HEADER_CRC_OFFSET, HEADER_SIZE,
        },
        signatures::{
            encode_element, encode_field_signature, encode_method_signature, DataType,
            ElementType, FieldSignature, MethodSignature,
        },
        tables::{
            AssemblyRefRecord, AttributeRecord, FieldDefFlags, FieldDefRecord, FieldRefRecord,
            MethodDefFlags, MethodDefRecord, MethodRefRecord, Record, ResourceFileRecord,
            ResourceRecord, TableKind, TypeDefFlags, TypeDefRecord, TypeRefRecord,
            TypeSemantics, TypeSpecRecord, EMPTY_INDEX,
        },
    },
    utils::{to_index, to_u32},
    Error::OutOfBounds,
    Result,
};

/// A field to be added with its declaring type.
#[derive(Clone, Debug)]
pub struct FieldDefBuilder {
    name: String,
    element: ElementType,
    flags: FieldDefFlags,
}

impl FieldDefBuilder {
    /// A field of type `element`.
    #[must_use]
    pub fn new(name: &str, element: ElementType) -> Self {
        FieldDefBuilder {
            name: name.to_string(),
            element,
            flags: FieldDefFlags::empty(),
        }
    }

    /// Adds flags to the field.
    #[must_use]
    pub fn flags(mut self, flags: FieldDefFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// A method to be added with its declaring type.
#[derive(Clone, Debug)]
pub struct MethodDefBuilder {
    name: String,
    signature: MethodSignature,
    flags: MethodDefFlags,
    rva: u16,
}

impl MethodDefBuilder {
    /// A method without managed body. Methods without an instance argument are static.
    #[must_use]
    pub fn native(name: &str, signature: MethodSignature) -> Self {
        let flags = if signature.has_this {
            MethodDefFlags::empty()
        } else {
            MethodDefFlags::STATIC
        };

        MethodDefBuilder {
            name: name.to_string(),
            signature,
            flags,
            rva: EMPTY_INDEX,
        }
    }

    /// A method whose managed body starts at `rva` in the byte code region.
    #[must_use]
    pub fn managed(name: &str, signature: MethodSignature, rva: u16) -> Self {
        MethodDefBuilder {
            rva,
            ..Self::native(name, signature)
        }
    }

    /// Adds flags to the method.
    #[must_use]
    pub fn flags(mut self, flags: MethodDefFlags) -> Self {
        self.flags |= flags;
        self
    }

    fn is_static(&self) -> bool {
        self.flags.contains(MethodDefFlags::STATIC)
    }

    fn is_virtual(&self) -> bool {
        !self.is_static() && self.flags.contains(MethodDefFlags::VIRTUAL)
    }
}

/// A type together with its fields and methods.
///
/// Methods are stored virtual first, then instance, then static, keeping the order in which
/// they were added within each group.
#[derive(Clone, Debug)]
pub struct TypeDefBuilder {
    namespace: String,
    name: String,
    flags: TypeDefFlags,
    extends: u16,
    enclosing_type: u16,
    data_type: u8,
    static_fields: Vec<FieldDefBuilder>,
    instance_fields: Vec<FieldDefBuilder>,
    methods: Vec<MethodDefBuilder>,
}

impl TypeDefBuilder {
    /// A class without base type.
    #[must_use]
    pub fn new(namespace: &str, name: &str) -> Self {
        TypeDefBuilder {
            namespace: namespace.to_string(),
            name: name.to_string(),
            flags: TypeDefFlags::empty(),
            extends: EMPTY_INDEX,
            enclosing_type: EMPTY_INDEX,
            data_type: DataType::Class as u8,
            static_fields: Vec::new(),
            instance_fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Adds flags to the type. Value type semantics also switch the data type to `VALUETYPE`.
    #[must_use]
    pub fn flags(mut self, flags: TypeDefFlags) -> Self {
        self.flags |= flags;
        if self.flags.semantics() == TypeSemantics::ValueType {
            self.data_type = DataType::ValueType as u8;
        }
        self
    }

    /// Sets the raw base type reference (a `TypeDef` index, or a flagged `TypeRef` index).
    #[must_use]
    pub fn extends(mut self, extends: u16) -> Self {
        self.extends = extends;
        self
    }

    /// Nests the type inside `TypeDef` `enclosing`.
    #[must_use]
    pub fn enclosing(mut self, enclosing: u16) -> Self {
        self.enclosing_type = enclosing;
        self
    }

    /// Sets the runtime data type of the type.
    #[must_use]
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type as u8;
        self
    }

    /// Adds a static field.
    #[must_use]
    pub fn static_field(mut self, field: FieldDefBuilder) -> Self {
        self.static_fields.push(field.flags(FieldDefFlags::STATIC));
        self
    }

    /// Adds an instance field.
    #[must_use]
    pub fn instance_field(mut self, field: FieldDefBuilder) -> Self {
        self.instance_fields.push(field);
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: MethodDefBuilder) -> Self {
        self.methods.push(method);
        self
    }
}

/// Builds an image region by region.
pub struct AssemblyBuilder {
    name: String,
    version: Version,
    strings: Vec<u8>,
    string_map: HashMap<String, u16>,
    signatures: Vec<u8>,
    signature_map: HashMap<Vec<u8>, u16>,
    assembly_refs: Vec<AssemblyRefRecord>,
    type_refs: Vec<TypeRefRecord>,
    field_refs: Vec<FieldRefRecord>,
    method_refs: Vec<MethodRefRecord>,
    type_defs: Vec<TypeDefRecord>,
    field_defs: Vec<FieldDefRecord>,
    method_defs: Vec<MethodDefRecord>,
    attributes: Vec<AttributeRecord>,
    type_specs: Vec<TypeSpecRecord>,
    resources: Vec<ResourceRecord>,
    resources_data: Vec<u8>,
    byte_code: Vec<u8>,
    resource_files: Vec<ResourceFileRecord>,
    overflow: bool,
}

impl AssemblyBuilder {
    /// Starts an image for assembly `name`.
    #[must_use]
    pub fn new(name: &str, version: Version) -> Self {
        AssemblyBuilder {
            name: name.to_string(),
            version,
            strings: Vec::new(),
            string_map: HashMap::new(),
            signatures: Vec::new(),
            signature_map: HashMap::new(),
            assembly_refs: Vec::new(),
            type_refs: Vec::new(),
            field_refs: Vec::new(),
            method_refs: Vec::new(),
            type_defs: Vec::new(),
            field_defs: Vec::new(),
            method_defs: Vec::new(),
            attributes: Vec::new(),
            type_specs: Vec::new(),
            resources: Vec::new(),
            resources_data: Vec::new(),
            byte_code: Vec::new(),
            resource_files: Vec::new(),
            overflow: false,
        }
    }

    fn index(&mut self, position: usize) -> u16 {
        match to_index(position) {
            Ok(index) => index,
            Err(_) => {
                self.overflow = true;
                EMPTY_INDEX
            }
        }
    }

    /// Interns a string and returns its heap index. The empty string maps to [`EMPTY_INDEX`].
    pub fn string(&mut self, value: &str) -> u16 {
        if value.is_empty() {
            return EMPTY_INDEX;
        }
        if let Some(&index) = self.string_map.get(value) {
            return index;
        }

        let index = self.index(self.strings.len());
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        self.string_map.insert(value.to_string(), index);
        index
    }

    /// Interns a signature blob and returns its heap index.
    pub fn signature(&mut self, blob: &[u8]) -> u16 {
        if let Some(&index) = self.signature_map.get(blob) {
            return index;
        }

        let index = self.index(self.signatures.len());
        self.signatures.extend_from_slice(blob);
        self.signature_map.insert(blob.to_vec(), index);
        index
    }

    /// Adds an `AssemblyRef` and returns its index.
    pub fn assembly_ref(&mut self, name: &str, version: Version) -> u16 {
        let name = self.string(name);
        self.assembly_refs.push(AssemblyRefRecord { name, version });
        self.index(self.assembly_refs.len() - 1)
    }

    /// Adds a `TypeRef` with a raw resolution scope and returns its index.
    pub fn type_ref(&mut self, namespace: &str, name: &str, scope: u16) -> u16 {
        let name = self.string(name);
        let namespace = self.string(namespace);
        self.type_refs.push(TypeRefRecord {
            name,
            namespace,
            scope,
        });
        self.index(self.type_refs.len() - 1)
    }

    /// Adds a `FieldRef` on `TypeRef` `container` and returns its index.
    ///
    /// # Errors
    /// Returns an error if the signature cannot be encoded.
    pub fn field_ref(
        &mut self,
        container: u16,
        name: &str,
        signature: &FieldSignature,
    ) -> Result<u16> {
        let blob = encode_field_signature(signature)?;
        let sig = self.signature(&blob);
        let name = self.string(name);
        self.field_refs.push(FieldRefRecord {
            name,
            container,
            sig,
        });
        Ok(self.index(self.field_refs.len() - 1))
    }

    /// Adds a `MethodRef` on `TypeRef` `container` and returns its index.
    ///
    /// # Errors
    /// Returns an error if the signature cannot be encoded.
    pub fn method_ref(
        &mut self,
        container: u16,
        name: &str,
        signature: &MethodSignature,
    ) -> Result<u16> {
        let blob = encode_method_signature(signature)?;
        let sig = self.signature(&blob);
        let name = self.string(name);
        self.method_refs.push(MethodRefRecord {
            name,
            container,
            sig,
        });
        Ok(self.index(self.method_refs.len() - 1))
    }

    /// Adds a `TypeSpec` for `element` and returns its index.
    ///
    /// # Errors
    /// Returns an error if the element cannot be encoded.
    pub fn type_spec(&mut self, element: &ElementType) -> Result<u16> {
        let mut blob = Vec::new();
        encode_element(element, &mut blob)?;
        let sig = self.signature(&blob);
        self.type_specs.push(TypeSpecRecord { sig });
        Ok(self.index(self.type_specs.len() - 1))
    }

    /// Adds a custom attribute whose serialized arguments are `data`, returning its index.
    pub fn attribute(
        &mut self,
        owner_type: TableKind,
        owner_index: u16,
        constructor: u16,
        data: &[u8],
    ) -> u16 {
        let data = self.signature(data);
        self.attributes.push(AttributeRecord {
            owner_type: owner_type as u16,
            owner_index,
            constructor,
            data,
        });
        self.index(self.attributes.len() - 1)
    }

    /// Adds a resource whose payload is `data`, returning its index.
    pub fn resource(&mut self, id: i16, kind: u8, data: &[u8]) -> u16 {
        let offset = to_u32(self.resources_data.len()).unwrap_or_else(|_| {
            self.overflow = true;
            0
        });
        self.resources_data.extend_from_slice(data);
        self.resources.push(ResourceRecord {
            id,
            kind,
            flags: 0,
            offset,
        });
        self.index(self.resources.len() - 1)
    }

    /// Adds a resource file descriptor, returning its index.
    pub fn resource_file(&mut self, name: &str, number_of_resources: u32) -> u16 {
        let name = self.string(name);
        self.resource_files.push(ResourceFileRecord {
            name,
            number_of_resources,
        });
        self.index(self.resource_files.len() - 1)
    }

    /// Appends a method body to the byte code region and returns its RVA.
    pub fn byte_code(&mut self, body: &[u8]) -> u16 {
        let rva = self.index(self.byte_code.len());
        self.byte_code.extend_from_slice(body);
        rva
    }

    /// Adds a type with its fields and methods and returns its `TypeDef` index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if a member count exceeds 255, or an error if a
    /// signature cannot be encoded.
    pub fn type_def(&mut self, type_def: TypeDefBuilder) -> Result<u16> {
        let s_fields_first = self.index(self.field_defs.len());
        for field in &type_def.static_fields {
            self.add_field(field)?;
        }
        let i_fields_first = self.index(self.field_defs.len());
        for field in &type_def.instance_fields {
            self.add_field(field)?;
        }

        let (virtual_methods, rest): (Vec<_>, Vec<_>) =
            type_def.methods.iter().partition(|method| method.is_virtual());
        let (static_methods, instance_methods): (Vec<_>, Vec<_>) =
            rest.into_iter().partition(|method| method.is_static());

        let methods_first = self.index(self.method_defs.len());
        for method in virtual_methods
            .iter()
            .chain(&instance_methods)
            .chain(&static_methods)
        {
            self.add_method(method)?;
        }

        let count = |len: usize| u8::try_from(len).map_err(|_| OutOfBounds);
        let record = TypeDefRecord {
            name: self.string(&type_def.name),
            namespace: self.string(&type_def.namespace),
            extends: type_def.extends,
            enclosing_type: type_def.enclosing_type,
            flags: type_def.flags,
            interfaces: EMPTY_INDEX,
            methods_first,
            v_methods_num: count(virtual_methods.len())?,
            i_methods_num: count(instance_methods.len())?,
            s_methods_num: count(static_methods.len())?,
            data_type: type_def.data_type,
            s_fields_first,
            i_fields_first,
            s_fields_num: count(type_def.static_fields.len())?,
            i_fields_num: count(type_def.instance_fields.len())?,
        };

        self.type_defs.push(record);
        Ok(self.index(self.type_defs.len() - 1))
    }

    fn add_field(&mut self, field: &FieldDefBuilder) -> Result<()> {
        let blob = encode_field_signature(&FieldSignature {
            base: field.element.clone(),
        })?;
        let sig = self.signature(&blob);
        let name = self.string(&field.name);

        self.field_defs.push(FieldDefRecord {
            name,
            sig,
            default_value: EMPTY_INDEX,
            flags: field.flags,
        });
        Ok(())
    }

    fn add_method(&mut self, method: &MethodDefBuilder) -> Result<()> {
        let blob = encode_method_signature(&method.signature)?;
        let sig = self.signature(&blob);
        let name = self.string(&method.name);
        let num_args =
            u8::try_from(method.signature.params.len() + usize::from(method.signature.has_this))
                .map_err(|_| OutOfBounds)?;

        self.method_defs.push(MethodDefRecord {
            name,
            rva: method.rva,
            flags: method.flags,
            ret_val: method.signature.return_type.opcode(),
            num_args,
            num_locals: 0,
            length_eval_stack: 0,
            locals: EMPTY_INDEX,
            sig,
        });
        Ok(())
    }

    fn records<R: Record>(records: &[R]) -> Vec<u8> {
        let mut out = Vec::with_capacity(records.len() * R::SIZE);
        for record in records {
            record.write(&mut out);
        }
        out
    }

    /// Lays out the image and computes its CRCs.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if any heap or table outgrew its 16-bit indices.
    pub fn build(mut self) -> Result<Vec<u8>> {
        let name = self.name.clone();
        let assembly_name = self.string(&name);

        if !self.resources.is_empty() {
            // the last descriptor only closes the payload of the one before it
            let offset = to_u32(self.resources_data.len())?;
            self.resources.push(ResourceRecord {
                id: 0,
                kind: 0,
                flags: 0,
                offset,
            });
        }

        if self.overflow {
            return Err(OutOfBounds);
        }

        let mut regions: [Vec<u8>; TableKind::COUNT] = Default::default();
        regions[TableKind::AssemblyRef as usize] = Self::records(&self.assembly_refs);
        regions[TableKind::TypeRef as usize] = Self::records(&self.type_refs);
        regions[TableKind::FieldRef as usize] = Self::records(&self.field_refs);
        regions[TableKind::MethodRef as usize] = Self::records(&self.method_refs);
        regions[TableKind::TypeDef as usize] = Self::records(&self.type_defs);
        regions[TableKind::FieldDef as usize] = Self::records(&self.field_defs);
        regions[TableKind::MethodDef as usize] = Self::records(&self.method_defs);
        regions[TableKind::Attributes as usize] = Self::records(&self.attributes);
        regions[TableKind::TypeSpec as usize] = Self::records(&self.type_specs);
        regions[TableKind::Resources as usize] = Self::records(&self.resources);
        regions[TableKind::ResourcesData as usize] = std::mem::take(&mut self.resources_data);
        regions[TableKind::Strings as usize] = std::mem::take(&mut self.strings);
        regions[TableKind::Signatures as usize] = std::mem::take(&mut self.signatures);
        regions[TableKind::ByteCode as usize] = std::mem::take(&mut self.byte_code);
        regions[TableKind::ResourcesFiles as usize] = Self::records(&self.resource_files);

        let mut start_of_tables = [0u32; TableKind::COUNT];
        let mut padding_of_tables = [0u8; TableKind::COUNT];
        let mut body = Vec::new();

        for kind in TableKind::iter() {
            start_of_tables[kind as usize] = to_u32(HEADER_SIZE + body.len())?;
            if kind == TableKind::EndOfAssembly {
                break;
            }

            let region = &regions[kind as usize];
            body.extend_from_slice(region);

            let padding = (4 - region.len() % 4) % 4;
            body.resize(body.len() + padding, 0);
            padding_of_tables[kind as usize] = padding as u8;
        }

        let header = AssemblyHeader {
            header_crc: 0,
            assembly_crc: 0,
            flags: 0,
            native_methods_checksum: 0,
            patch_entry_offset: 0xFFFF_FFFF,
            version: self.version,
            assembly_name,
            string_table_version: 1,
            start_of_tables,
            num_of_patched_methods: 0,
            padding_of_tables,
        };

        let mut image = Vec::with_capacity(HEADER_SIZE + body.len());
        header.write(&mut image);
        image.extend_from_slice(&body);

        let assembly_crc = compute_assembly_crc(&image, image.len())?;
        image[ASSEMBLY_CRC_OFFSET..ASSEMBLY_CRC_OFFSET + 4]
            .copy_from_slice(&assembly_crc.to_le_bytes());
        let header_crc = compute_header_crc(&image)?;
        image[HEADER_CRC_OFFSET..HEADER_CRC_OFFSET + 4].copy_from_slice(&header_crc.to_le_bytes());

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::assembly::Assembly;

    fn sig(has_this: bool) -> MethodSignature {
        MethodSignature {
            has_this,
            return_type: ElementType::Void,
            params: vec![],
        }
    }

    #[test]
    fn empty_image() {
        let image = AssemblyBuilder::new("Empty", Version::new(1, 0, 0, 0))
            .build()
            .unwrap();
        let assembly = Assembly::from_mem(image).unwrap();

        assert_eq!(assembly.name().as_deref(), Some("Empty"));
        for kind in TableKind::iter() {
            if kind.record_size().is_some() {
                assert_eq!(assembly.count(kind), 0);
            }
        }
        assert_eq!(assembly.header().total_size(), assembly.data().len());
    }

    #[test]
    fn regions_are_aligned() {
        let mut builder = AssemblyBuilder::new("Odd", Version::default());
        builder.string("abc");
        let image = builder.build().unwrap();
        let header = AssemblyHeader::read(&image).unwrap();

        for kind in TableKind::iter() {
            assert_eq!(header.table_start(kind) % 4, 0);
        }
        // "abc\0" + "Odd\0"
        assert_eq!(header.table_size(TableKind::Strings).unwrap(), 8);
    }

    #[test]
    fn interning() {
        let mut builder = AssemblyBuilder::new("Intern", Version::default());
        let a = builder.string("Gadget");
        let b = builder.string("Widget");
        assert_eq!(builder.string("Gadget"), a);
        assert_eq!(b, 7);
        assert_eq!(builder.string(""), EMPTY_INDEX);

        let s = builder.signature(&[0x06, 0x07]);
        assert_eq!(builder.signature(&[0x06, 0x07]), s);
    }

    #[test]
    fn method_grouping() {
        let mut builder = AssemblyBuilder::new("Groups", Version::default());
        builder
            .type_def(
                TypeDefBuilder::new("", "T")
                    .method(MethodDefBuilder::native("S", sig(false)))
                    .method(MethodDefBuilder::native("I", sig(true)))
                    .method(MethodDefBuilder::native("V", sig(true)).flags(MethodDefFlags::VIRTUAL)),
            )
            .unwrap();

        let assembly = Assembly::from_mem(builder.build().unwrap()).unwrap();
        let names: Vec<_> = (0..3)
            .map(|i| {
                let method = assembly.method_def(i).unwrap();
                assembly.string(method.name).unwrap().to_string()
            })
            .collect();
        assert_eq!(names, ["V", "I", "S"]);

        let type_def = assembly.type_def(0).unwrap();
        assert_eq!(
            (type_def.v_methods_num, type_def.i_methods_num, type_def.s_methods_num),
            (1, 1, 1)
        );
        assert!(assembly.method_def(2).unwrap().is_static());
        assert_eq!(assembly.method_def(1).unwrap().num_args, 1);
    }

    #[test]
    fn resources_get_sentinel() {
        let mut builder = AssemblyBuilder::new("Res", Version::default());
        builder.resource(1, 4, b"hello");
        builder.resource(2, 4, b"!");
        let assembly = Assembly::from_mem(builder.build().unwrap()).unwrap();

        assert_eq!(assembly.count(TableKind::Resources), 3);
        assert_eq!(assembly.resource(1).unwrap().offset, 5);
        assert_eq!(assembly.resource(2).unwrap().offset, 6);
        assert_eq!(assembly.count(TableKind::ResourcesData), 6);
    }

    #[test]
    fn crcs_are_valid() {
        let mut builder = AssemblyBuilder::new("Crc", Version::default());
        builder.type_def(TypeDefBuilder::new("A", "B")).unwrap();
        let image = builder.build().unwrap();
        let header = AssemblyHeader::read(&image).unwrap();

        assert_eq!(header.header_crc, compute_header_crc(&image).unwrap());
        assert_eq!(
            header.assembly_crc,
            compute_assembly_crc(&image, header.total_size()).unwrap()
        );
    }
}

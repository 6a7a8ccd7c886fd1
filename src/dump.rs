//! Diagnostic text dump of an assembly image.
//!
//! [`dump_assembly`] renders the assembly name and version, the size of every region, and then
//! one line per record of every table. Each record is addressed by its index and by its
//! absolute byte offset inside the image (`index[offset]`), and every signature it references is
//! decoded:
//!
//! ```text
//! TypeDef 0000[000000a0] [Extends: 8000] [Enclosed: ffff] [Flags: 00000000] Acme Gadget
//! FieldDef 0000[000000b8] [Flags: 00000000] Acme.Gadget::_speed [FIELD I4]
//! MethodDef 0000[000000c0] [Flags: 00000000] [RVA: ffff] Acme.Gadget::Spin [METHOD VOID( BYREF I4 )]
//! ```
//!
//! Field names that carry compiler-reserved characters are flagged with a diagnostic and
//! replaced by [`crate::naming::DUMP_FIELD_PLACEHOLDER`].

use std::{borrow::Cow, fmt::Write};

use crate::{
    metadata::{
        assembly::Assembly,
        signatures::{parse_signature, parse_type_spec_signature, ElementType, Signature},
        tables::TableKind,
    },
    naming::{is_reserved_name, reserved_field_comment, DUMP_FIELD_PLACEHOLDER},
    Error::{self, RecursionLimit},
    Result,
};

/// Maximum nesting depth followed when rendering owner names
const MAX_OWNER_DEPTH: usize = 64;

macro_rules! emit {
    ($out:expr, $($arg:tt)*) => {
        write!($out, $($arg)*).map_err(|_| Error::Error("dump output rejected a write".to_string()))?
    };
}

/// Renders one signature element (`I4`, `BYREF I4`, `CLASS [01000002]`, ...).
///
/// # Examples
///
/// ```rust
/// use nanometa::dump::render_element;
/// use nanometa::metadata::signatures::ElementType;
///
/// let element = ElementType::SzArray(Box::new(ElementType::String));
/// assert_eq!(render_element(&element), "SZARRAY STRING");
/// assert_eq!(render_element(&ElementType::Unknown(0x0D)), "[UNKNOWN: 0000000d]");
/// ```
#[must_use]
pub fn render_element(element: &ElementType) -> String {
    match element {
        ElementType::ByRef(inner) => format!("BYREF {}", render_element(inner)),
        ElementType::SzArray(inner) => format!("SZARRAY {}", render_element(inner)),
        ElementType::ValueType(token) => format!("VALUETYPE [{:08x}]", token.value()),
        ElementType::Class(token) => format!("CLASS [{:08x}]", token.value()),
        ElementType::Unknown(byte) => format!("[UNKNOWN: {byte:08x}]"),
        other => other
            .data_type()
            .map(|data_type| data_type.tag().to_string())
            .unwrap_or_default(),
    }
}

/// Renders a whole signature.
///
/// Methods render as `METHOD <ret>( <p1>, <p2> )` (`METHOD <ret>()` without parameters),
/// fields as `FIELD <type>`. Local variable signatures and unknown calling conventions render
/// as nothing.
#[must_use]
pub fn render_signature(signature: &Signature) -> String {
    match signature {
        Signature::Field(field) => format!("FIELD {}", render_element(&field.base)),
        Signature::Method(method) => {
            let mut text = format!("METHOD {}(", render_element(&method.return_type));
            let last = method.params.len().saturating_sub(1);
            for (position, param) in method.params.iter().enumerate() {
                text.push(' ');
                text.push_str(&render_element(param));
                text.push(if position == last { ' ' } else { ',' });
            }
            text.push(')');
            text
        }
        Signature::LocalVar | Signature::Other(_) => String::new(),
    }
}

struct Dumper<'a> {
    assembly: &'a Assembly,
}

impl Dumper<'_> {
    fn signature(&self, index: u16) -> Result<String> {
        let signature = parse_signature(self.assembly.signature(index)?)?;
        Ok(render_signature(&signature))
    }

    /// `ns.name` of a `TypeDef`, prefixed by its enclosing types.
    fn type_def_token(&self, index: u16) -> Result<String> {
        let mut chain = vec![self.assembly.type_def(usize::from(index))?];
        while let Some(enclosing) = chain[chain.len() - 1].enclosing() {
            if chain.len() >= MAX_OWNER_DEPTH {
                return Err(RecursionLimit(MAX_OWNER_DEPTH));
            }
            chain.push(self.assembly.type_def(usize::from(enclosing))?);
        }

        let mut text = String::new();
        for type_def in chain.iter().rev() {
            text.push_str(&self.assembly.string(type_def.namespace)?);
            text.push('.');
            text.push_str(&self.assembly.string(type_def.name)?);
        }
        Ok(text)
    }

    fn owner(&self, owner: Option<u16>) -> Result<String> {
        match owner {
            Some(index) => self.type_def_token(index),
            None => Ok(String::new()),
        }
    }

    fn sizes(&self, out: &mut impl Write) -> Result<()> {
        let assembly = self.assembly;
        let tables = [
            ("AssemblyRef    ", TableKind::AssemblyRef),
            ("TypeRef        ", TableKind::TypeRef),
            ("FieldRef       ", TableKind::FieldRef),
            ("MethodRef      ", TableKind::MethodRef),
            ("TypeDef        ", TableKind::TypeDef),
            ("FieldDef       ", TableKind::FieldDef),
            ("MethodDef      ", TableKind::MethodDef),
            ("Attributes     ", TableKind::Attributes),
            ("TypeSpec       ", TableKind::TypeSpec),
            ("Resources Files", TableKind::ResourcesFiles),
            ("Resources      ", TableKind::Resources),
        ];
        for (label, kind) in tables {
            let count = assembly.count(kind);
            let bytes = count * kind.record_size().unwrap_or(1);
            emit!(out, "Size: {label} {bytes:6} byte(s) {count:6} item(s)\n");
        }

        let heaps = [
            ("ResourcesData  ", TableKind::ResourcesData),
            ("Strings        ", TableKind::Strings),
            ("Signatures     ", TableKind::Signatures),
            ("ByteCode       ", TableKind::ByteCode),
        ];
        for (label, kind) in heaps {
            emit!(out, "Size: {label} {:6} byte(s)\n", assembly.count(kind));
        }
        emit!(out, "\n\n");
        Ok(())
    }

    fn references(&self, out: &mut impl Write) -> Result<()> {
        let assembly = self.assembly;

        let count = assembly.count(TableKind::AssemblyRef);
        for index in 0..count {
            let record = assembly.assembly_ref(index)?;
            let offset = assembly.record_offset(TableKind::AssemblyRef, index)?;
            let version = record.version;
            emit!(
                out,
                "AssemblyRef: {index:04x}[{offset:08x}] {} ({}.{}.{}.{})\n",
                assembly.string(record.name)?,
                version.major,
                version.minor,
                version.build,
                version.revision
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        let count = assembly.count(TableKind::TypeRef);
        for index in 0..count {
            let record = assembly.type_ref(index)?;
            let offset = assembly.record_offset(TableKind::TypeRef, index)?;
            emit!(
                out,
                "TypeRef {index:04x}[{offset:08x}] [Scope: {:04x}] {} {}\n",
                record.scope,
                assembly.string(record.namespace)?,
                assembly.string(record.name)?
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        let count = assembly.count(TableKind::FieldRef);
        for index in 0..count {
            let record = assembly.field_ref(index)?;
            let offset = assembly.record_offset(TableKind::FieldRef, index)?;
            emit!(
                out,
                "FieldRef {index:04x}[{offset:08x}] [Type: {:04x}] {} [{}]\n",
                record.container,
                assembly.string(record.name)?,
                self.signature(record.sig)?
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        let count = assembly.count(TableKind::MethodRef);
        for index in 0..count {
            let record = assembly.method_ref(index)?;
            let offset = assembly.record_offset(TableKind::MethodRef, index)?;
            emit!(
                out,
                "MethodRef {index:04x}[{offset:08x}] [Type: {:04x}] {} [{}]\n",
                record.container,
                assembly.string(record.name)?,
                self.signature(record.sig)?
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        Ok(())
    }

    fn definitions(&self, out: &mut impl Write) -> Result<()> {
        let assembly = self.assembly;

        let count = assembly.type_def_count();
        for index in 0..count {
            let record = assembly.type_def(index)?;
            let offset = assembly.record_offset(TableKind::TypeDef, index)?;
            emit!(
                out,
                "TypeDef {index:04x}[{offset:08x}] [Extends: {:04x}] [Enclosed: {:04x}] [Flags: {:08x}] {} {}\n",
                record.extends,
                record.enclosing_type,
                record.flags.bits(),
                assembly.string(record.namespace)?,
                assembly.string(record.name)?
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        let count = assembly.field_def_count();
        for index in 0..count {
            let record = assembly.field_def(index)?;
            let offset = assembly.record_offset(TableKind::FieldDef, index)?;
            emit!(
                out,
                "FieldDef {index:04x}[{offset:08x}] [Flags: {:08x}] {}",
                record.flags.bits(),
                self.owner(assembly.field_owner(index))?
            );

            let mut name = assembly.string(record.name)?;
            if is_reserved_name(&name) {
                emit!(out, "{}", reserved_field_comment("    ", &name));
                name = Cow::Borrowed(DUMP_FIELD_PLACEHOLDER);
            }
            emit!(out, "::{name} [{}]\n", self.signature(record.sig)?);
        }
        if count > 0 {
            emit!(out, "\n");
        }

        // no separator between the method and attribute blocks
        for index in 0..assembly.method_def_count() {
            let record = assembly.method_def(index)?;
            let offset = assembly.record_offset(TableKind::MethodDef, index)?;
            emit!(
                out,
                "MethodDef {index:04x}[{offset:08x}] [Flags: {:08x}] [RVA: {:04x}] {}::{} [{}]\n",
                record.flags.bits(),
                record.rva,
                self.owner(assembly.method_owner(index))?,
                assembly.string(record.name)?,
                self.signature(record.sig)?
            );
        }

        Ok(())
    }

    fn extras(&self, out: &mut impl Write) -> Result<()> {
        let assembly = self.assembly;

        let count = assembly.count(TableKind::Attributes);
        for index in 0..count {
            let record = assembly.attribute(index)?;
            let offset = assembly.record_offset(TableKind::Attributes, index)?;
            emit!(
                out,
                "Attribute {index:04x}[{offset:08x}] [{:04x}:{:04x}] {:04x} {:04x}\n",
                record.owner_type,
                record.owner_index,
                record.constructor,
                record.data
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        let count = assembly.count(TableKind::TypeSpec);
        for index in 0..count {
            let record = assembly.type_spec(index)?;
            let offset = assembly.record_offset(TableKind::TypeSpec, index)?;
            let signature = parse_type_spec_signature(assembly.signature(record.sig)?)?;
            emit!(
                out,
                "TypeSpec {index:04x}[{offset:08x}] [{}]\n",
                render_element(&signature.base)
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        let count = assembly.count(TableKind::ResourcesFiles);
        for index in 0..count {
            let record = assembly.resource_file(index)?;
            let offset = assembly.record_offset(TableKind::ResourcesFiles, index)?;
            emit!(
                out,
                "ResourceFile {index:04x}[{offset:08x}] {} [Resources: {}]\n",
                assembly.string(record.name)?,
                record.number_of_resources
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        // the last descriptor is a sentinel closing the payload of the one before it
        let count = assembly.count(TableKind::Resources).saturating_sub(1);
        let data_start = assembly.header().table_start(TableKind::ResourcesData);
        for index in 0..count {
            let record = assembly.resource(index)?;
            let next = assembly.resource(index + 1)?;
            let offset = assembly.record_offset(TableKind::Resources, index)?;
            let size = next.offset.wrapping_sub(record.offset) as u16;
            emit!(
                out,
                "Resource {index:04x}[{offset:08x}] [{:08x}:{}] {size:04x} {:08x}[{:08x}]\n",
                i32::from(record.id),
                record.kind,
                record.offset,
                data_start + record.offset as usize
            );
        }
        if count > 0 {
            emit!(out, "\n");
        }

        Ok(())
    }
}

/// Writes the complete dump of `assembly` to `out`.
///
/// # Errors
/// Returns an error if a record references a string or signature that does not decode, if
/// an enclosing chain is cyclic, or if `out` rejects a write.
///
/// # Examples
///
/// ```rust
/// use nanometa::dump::dump_assembly;
/// use nanometa::metadata::{assembly::Assembly, builder::AssemblyBuilder, header::Version};
///
/// let mut builder = AssemblyBuilder::new("Acme", Version::new(1, 2, 0, 0));
/// builder.assembly_ref("mscorlib", Version::new(1, 0, 0, 0));
/// let assembly = Assembly::from_mem(builder.build()?)?;
///
/// let mut text = String::new();
/// dump_assembly(&assembly, &mut text)?;
///
/// assert!(text.starts_with("Assembly: Acme (1.2.0.0)\n\n"));
/// assert!(text.contains("Size: AssemblyRef         12 byte(s)      1 item(s)\n"));
/// # Ok::<(), nanometa::Error>(())
/// ```
pub fn dump_assembly(assembly: &Assembly, out: &mut impl Write) -> Result<()> {
    let version = assembly.version();
    emit!(
        out,
        "Assembly: {} ({}.{}.{}.{})\n\n",
        assembly.name().unwrap_or_default(),
        version.major,
        version.minor,
        version.build,
        version.revision
    );

    let dumper = Dumper { assembly };
    dumper.sizes(out)?;
    dumper.references(out)?;
    dumper.definitions(out)?;
    dumper.extras(out)
}

use std::borrow::Cow;

use tracing::warn;

use crate::{
    interop::{plan::TypePlan, templates, GenerationMode},
    metadata::assembly::Assembly,
    naming::{is_reserved_name, reserved_field_comment, INVALID_FIELD_PLACEHOLDER},
    Result,
};

/// Class names containing this marker describe static data blobs, not types.
const PRIVATE_IMPLEMENTATION_DETAILS: &str = "<PrivateImplementationDetails>";

/// Resolves a field name for use inside a native identifier.
///
/// Compiler-synthesized names get the diagnostic comment appended to `out` and are replaced by
/// a placeholder that stops the native build at this line.
pub(crate) fn field_identifier<'a>(
    assembly: &'a Assembly,
    field: usize,
    indent: &str,
    out: &mut String,
) -> Result<Cow<'a, str>> {
    let name = assembly.string(assembly.field_def(field)?.name)?;
    if is_reserved_name(&name) {
        warn!(field, name = %name, "field has a compiler-synthesized name");
        out.push_str(&reserved_field_comment(indent, &name));
        return Ok(Cow::Borrowed(INVALID_FIELD_PLACEHOLDER));
    }

    Ok(name)
}

/// The struct block of one type, empty if it declares nothing.
fn type_block(
    assembly: &Assembly,
    plan: &TypePlan,
    file_name: &str,
    static_base: usize,
) -> Result<String> {
    let mut body = String::new();

    let statics = plan.record.static_fields();
    if !statics.is_empty() {
        for (position, field) in statics.enumerate() {
            let name = field_identifier(assembly, field, "    ", &mut body)?;
            body.push_str(&templates::static_field(&name, static_base + position));
        }
        body.push('\n');
    }

    let instances = plan.record.instance_fields();
    if !instances.is_empty() {
        for field in instances {
            let name = field_identifier(assembly, field, "    ", &mut body)?;
            let offset = assembly
                .instance_field_offset(field)
                .ok_or_else(|| malformed_error!("field {} has no storage offset", field))?;
            body.push_str(&templates::instance_field(&name, offset));
        }
        body.push('\n');
    }

    for (_, native) in plan.native_methods() {
        body.push_str(&templates::native_declare(&native.identifier));
    }

    if body.is_empty() {
        return Ok(body);
    }

    let mut block = templates::type_begin(file_name, &plan.class);
    block.push_str(&body);
    block.push_str(templates::TYPE_END);
    Ok(block)
}

/// Renders `<path>.h`: one `Library_<file>_<class>` struct per eligible type with its field
/// indices and native method declarations.
///
/// Static field indices are global across the assembly; every type advances the running index
/// by its static field count, whether or not it is emitted. `<PrivateImplementationDetails>`
/// types hold static data blobs rather than fields and do not take part in the count.
pub(crate) fn render_header(
    assembly: &Assembly,
    plans: &[TypePlan],
    mode: GenerationMode,
    file_name: &str,
    guard: &str,
    assembly_id: &str,
) -> Result<String> {
    let mut out = String::new();
    match mode {
        GenerationMode::Interop => out.push_str(templates::DO_NOT_EDIT_BANNER),
        GenerationMode::CoreLibrary => out.push_str(templates::WARNING_BANNER),
    }
    out.push_str(&templates::guard_open(guard));
    if mode == GenerationMode::Interop {
        out.push_str(templates::INCLUDE_INTEROP);
    }

    let mut static_base = 0;
    for plan in plans {
        if plan.class.contains(PRIVATE_IMPLEMENTATION_DETAILS) {
            continue;
        }
        if plan.eligible {
            out.push_str(&type_block(assembly, plan, file_name, static_base)?);
        }
        static_base += usize::from(plan.record.s_fields_num);
    }

    out.push_str(&templates::assembly_extern(assembly_id));
    out.push_str(&templates::guard_close(guard));
    Ok(out)
}

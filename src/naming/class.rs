use crate::{
    metadata::{assembly::Assembly, tables::TypeOrigin},
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth followed when walking enclosing types
const MAX_NESTING_DEPTH: usize = 64;

/// How a qualified class name is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// `Acme.Widgets.Outer.Gadget`
    Dotted,
    /// `Acme_Widgets_Outer_Gadget`, usable inside a native identifier
    Identifier,
}

impl RenderMode {
    fn finish(self, dotted: String) -> String {
        match self {
            RenderMode::Dotted => dotted,
            RenderMode::Identifier => dotted.replace('.', "_"),
        }
    }
}

/// Appends `segment` followed by a dot, skipping empty segments.
fn push_segment(out: &mut String, segment: &str) {
    if !segment.is_empty() {
        out.push_str(segment);
        out.push('.');
    }
}

/// The qualified name of `TypeDef` `index`: enclosing types, then namespace, then name.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] for an index outside the table and
/// [`crate::Error::RecursionLimit`] for a cyclic enclosing chain.
///
/// # Examples
///
/// ```rust
/// use nanometa::metadata::{
///     assembly::Assembly,
///     builder::{AssemblyBuilder, TypeDefBuilder},
///     header::Version,
/// };
/// use nanometa::naming::{class_name, RenderMode};
///
/// let mut builder = AssemblyBuilder::new("Acme", Version::default());
/// let outer = builder.type_def(TypeDefBuilder::new("Acme.Widgets", "Outer"))?;
/// builder.type_def(TypeDefBuilder::new("", "Gadget").enclosing(outer))?;
/// let assembly = Assembly::from_mem(builder.build()?)?;
///
/// assert_eq!(class_name(&assembly, 1, RenderMode::Dotted)?, "Acme.Widgets.Outer.Gadget");
/// assert_eq!(class_name(&assembly, 1, RenderMode::Identifier)?, "Acme_Widgets_Outer_Gadget");
/// # Ok::<(), nanometa::Error>(())
/// ```
pub fn class_name(assembly: &Assembly, index: usize, mode: RenderMode) -> Result<String> {
    let mut chain = vec![assembly.type_def(index)?];
    while let Some(enclosing) = chain[chain.len() - 1].enclosing() {
        if chain.len() >= MAX_NESTING_DEPTH {
            return Err(RecursionLimit(MAX_NESTING_DEPTH));
        }
        chain.push(assembly.type_def(usize::from(enclosing))?);
    }

    let mut dotted = String::new();
    for type_def in chain.iter().rev() {
        push_segment(&mut dotted, &assembly.string(type_def.namespace)?);
        push_segment(&mut dotted, &assembly.string(type_def.name)?);
    }
    dotted.pop();

    Ok(mode.finish(dotted))
}

/// The qualified name of `TypeRef` `index`, rooted at its resolution scope: the enclosing
/// reference for nested types, otherwise the referenced assembly's name.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] for an index outside its table and
/// [`crate::Error::RecursionLimit`] for a cyclic scope chain.
pub fn type_ref_class_name(assembly: &Assembly, index: usize, mode: RenderMode) -> Result<String> {
    let mut chain = vec![assembly.type_ref(index)?];
    let mut root = None;

    loop {
        match chain[chain.len() - 1].resolution_scope() {
            Some(TypeOrigin::TypeRef(scope)) => {
                if chain.len() >= MAX_NESTING_DEPTH {
                    return Err(RecursionLimit(MAX_NESTING_DEPTH));
                }
                chain.push(assembly.type_ref(usize::from(scope))?);
            }
            Some(TypeOrigin::Local(assembly_ref)) => {
                root = Some(assembly.assembly_ref(usize::from(assembly_ref))?);
                break;
            }
            None => break,
        }
    }

    let mut dotted = String::new();
    if let Some(assembly_ref) = root {
        push_segment(&mut dotted, &assembly.string(assembly_ref.name)?);
    }
    for type_ref in chain.iter().rev() {
        push_segment(&mut dotted, &assembly.string(type_ref.namespace)?);
        push_segment(&mut dotted, &assembly.string(type_ref.name)?);
    }
    dotted.pop();

    Ok(mode.finish(dotted))
}

/// The type name used to derive native namespaces: enclosing types joined by `_`, namespace and
/// name joined by `.`.
///
/// `Acme.Widgets.Outer` nesting `Gadget` yields `Acme.Widgets.Outer_Gadget`, which splits into
/// the namespaces `Acme`, `Widgets` and the struct `Outer_Gadget`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] for an index outside the table and
/// [`crate::Error::RecursionLimit`] for a cyclic enclosing chain.
pub fn type_name(assembly: &Assembly, index: usize) -> Result<String> {
    let mut chain = vec![assembly.type_def(index)?];
    while let Some(enclosing) = chain[chain.len() - 1].enclosing() {
        if chain.len() >= MAX_NESTING_DEPTH {
            return Err(RecursionLimit(MAX_NESTING_DEPTH));
        }
        chain.push(assembly.type_def(usize::from(enclosing))?);
    }

    let mut name = String::new();
    for (depth, type_def) in chain.iter().rev().enumerate() {
        if depth > 0 {
            name.push('_');
        }
        push_segment(&mut name, &assembly.string(type_def.namespace)?);
        name.push_str(&assembly.string(type_def.name)?);
    }

    Ok(name)
}

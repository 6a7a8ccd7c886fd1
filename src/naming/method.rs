use std::collections::{HashMap, HashSet};

use crate::{
    metadata::{
        assembly::Assembly,
        signatures::{ElementType, MethodSignature},
        tables::{MethodDefRecord, TableKind},
        token::Token,
    },
    naming::{class_name, type_ref_class_name, RenderMode},
    Result,
};

/// Separator between the method name and its signature tags
const NAME_SEPARATOR: &str = "___";
/// Marker for methods without instance argument
const STATIC_MARKER: &str = "STATIC__";
/// Separator between two signature elements
const ELEMENT_SEPARATOR: &str = "__";

/// How a method's own name is turned into the head of its identifier.
///
/// The two policies agree on every name whose only non-identifier character is `.`, which
/// covers constructors, explicit interface implementations and ordinary C# names.
/// They differ on names carrying other punctuation (`<`, `>`, `` ` ``, `$`, `-`), which
/// compilers emit for generated members:
///
/// ```rust
/// use nanometa::naming::NamingPolicy;
///
/// assert_eq!(NamingPolicy::Interop.escape("I.Get"), NamingPolicy::Plain.escape("I.Get"));
/// assert_eq!(NamingPolicy::Interop.escape("<Run>b__0"), "_Run_b__0");
/// assert_eq!(NamingPolicy::Plain.escape("<Run>b__0"), "<Run>b__0");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Every character outside `[A-Za-z0-9_]` becomes `_`.
    ///
    /// This is stricter than the dot-only rule of [`NamingPolicy::Plain`]: a generated name
    /// like `<Run>b__0` yields `_Run_b__0` here, which compiles as a C++ identifier, where
    /// the dot-only rule would leave the angle brackets in the emitted symbol. Native
    /// implementations written against the dot-only rule must be renamed for such methods,
    /// or the generator configured with [`NamingPolicy::Plain`].
    #[default]
    Interop,
    /// Only dots become `_`; everything else is kept as is.
    ///
    /// Used for class libraries, whose lookup names must match the runtime's own native
    /// sources byte for byte.
    Plain,
}

impl NamingPolicy {
    /// Applies the policy to a method name.
    #[must_use]
    pub fn escape(self, name: &str) -> String {
        match self {
            NamingPolicy::Interop => name
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect(),
            NamingPolicy::Plain => name.replace('.', "_"),
        }
    }
}

fn push_element(assembly: &Assembly, element: &ElementType, out: &mut String) -> Result<()> {
    match element {
        ElementType::ByRef(inner) | ElementType::SzArray(inner) => {
            if let Some(data_type) = element.data_type() {
                out.push_str(data_type.tag());
            }
            out.push('_');
            push_element(assembly, inner, out)
        }
        ElementType::ValueType(token) | ElementType::Class(token) => {
            let referenced = referenced_class(assembly, *token)?;
            out.extend(referenced.chars().filter(|&c| c != '_'));
            Ok(())
        }
        ElementType::Unknown(_) => Ok(()),
        primitive => {
            if let Some(data_type) = primitive.data_type() {
                out.push_str(data_type.tag());
            }
            Ok(())
        }
    }
}

/// The identifier-form name of a type referenced from a signature.
fn referenced_class(assembly: &Assembly, token: Token) -> Result<String> {
    let index = token.index() as usize;
    match token.table() {
        Some(TableKind::TypeDef) => class_name(assembly, index, RenderMode::Identifier),
        Some(TableKind::TypeRef) => type_ref_class_name(assembly, index, RenderMode::Identifier),
        Some(TableKind::TypeSpec) => Ok(format!("_{:08X}", token.value())),
        _ => Ok(String::new()),
    }
}

/// Builds the undisambiguated identifier of a method from its record and decoded signature.
///
/// The identifier is the escaped method name, `___`, `STATIC__` for static methods, then one
/// tag per element (the return type first) separated by `__`. `BYREF` and `SZARRAY` emit their
/// tag, `_` and the inner element; `CLASS` and `VALUETYPE` emit the referenced class name with
/// every `_` removed.
///
/// # Errors
/// Returns an error if a referenced type cannot be resolved.
pub fn method_identifier(
    assembly: &Assembly,
    method: &MethodDefRecord,
    signature: &MethodSignature,
    policy: NamingPolicy,
) -> Result<String> {
    let mut name = policy.escape(&assembly.string(method.name)?);
    name.push_str(NAME_SEPARATOR);
    if method.is_static() {
        name.push_str(STATIC_MARKER);
    }

    let elements = std::iter::once(&signature.return_type).chain(&signature.params);
    for (position, element) in elements.enumerate() {
        if position > 0 {
            name.push_str(ELEMENT_SEPARATOR);
        }
        push_element(assembly, element, &mut name)?;
    }

    Ok(name)
}

/// Disambiguates the method identifiers of one type.
///
/// The first occurrence of an identifier is kept as is, the `K`th repeat gets the suffix `_K`.
/// A suffixed identifier that happens to equal one already handed out moves on to the next
/// suffix, so every identifier returned by one namer is unique.
///
/// # Examples
///
/// ```rust
/// use nanometa::naming::MethodNamer;
///
/// let mut namer = MethodNamer::new();
/// assert_eq!(namer.disambiguate("Foo___STATIC__VOID".to_string()), "Foo___STATIC__VOID");
/// assert_eq!(namer.disambiguate("Foo___STATIC__VOID".to_string()), "Foo___STATIC__VOID_2");
/// assert_eq!(namer.disambiguate("Foo___STATIC__VOID".to_string()), "Foo___STATIC__VOID_3");
/// ```
#[derive(Debug, Default)]
pub struct MethodNamer {
    occurrences: HashMap<String, u32>,
    issued: HashSet<String>,
}

impl MethodNamer {
    /// Creates an empty namer; use one per type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the final identifier for the next method whose base identifier is `base`.
    pub fn disambiguate(&mut self, base: String) -> String {
        let occurrence = self.occurrences.entry(base.clone()).or_insert(0);
        *occurrence += 1;

        let mut candidate = if *occurrence == 1 {
            base.clone()
        } else {
            format!("{base}_{occurrence}")
        };

        while self.issued.contains(&candidate) {
            *occurrence += 1;
            candidate = format!("{base}_{occurrence}");
        }

        self.issued.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        builder::{AssemblyBuilder, MethodDefBuilder, TypeDefBuilder},
        header::Version,
        signatures::parse_method_signature,
        tables::TYPEREF_FLAG,
    };

    fn identifiers(methods: Vec<MethodDefBuilder>, policy: NamingPolicy) -> Vec<String> {
        let mut builder = AssemblyBuilder::new("Acme", Version::default());
        let mscorlib = builder.assembly_ref("mscorlib", Version::default());
        builder.type_ref("System", "Span_Of", mscorlib);

        let mut type_def = TypeDefBuilder::new("Acme.Widgets", "Gadget");
        for method in methods {
            type_def = type_def.method(method);
        }
        builder.type_def(type_def).unwrap();
        builder.type_def(TypeDefBuilder::new("Acme.Widgets", "Cog")).unwrap();
        builder
            .type_spec(&ElementType::SzArray(Box::new(ElementType::I4)))
            .unwrap();

        let assembly = Assembly::from_mem(builder.build().unwrap()).unwrap();
        let mut namer = MethodNamer::new();
        (0..assembly.method_def_count())
            .map(|index| {
                let method = assembly.method_def(index).unwrap();
                let signature =
                    parse_method_signature(assembly.signature(method.sig).unwrap()).unwrap();
                namer.disambiguate(
                    method_identifier(&assembly, &method, &signature, policy).unwrap(),
                )
            })
            .collect()
    }

    fn sig(has_this: bool, return_type: ElementType, params: Vec<ElementType>) -> MethodSignature {
        MethodSignature {
            has_this,
            return_type,
            params,
        }
    }

    #[test]
    fn static_void_collides() {
        let names = identifiers(
            vec![
                MethodDefBuilder::native("Foo", sig(false, ElementType::Void, vec![])),
                MethodDefBuilder::native("Foo", sig(false, ElementType::Void, vec![])),
            ],
            NamingPolicy::Interop,
        );
        assert_eq!(names, ["Foo___STATIC__VOID", "Foo___STATIC__VOID_2"]);
    }

    #[test]
    fn element_tags() {
        let names = identifiers(
            vec![MethodDefBuilder::native(
                "Spin",
                sig(
                    true,
                    ElementType::Boolean,
                    vec![
                        ElementType::I4,
                        ElementType::SzArray(Box::new(ElementType::String)),
                        ElementType::ByRef(Box::new(ElementType::R8)),
                        ElementType::Object,
                    ],
                ),
            )],
            NamingPolicy::Interop,
        );
        assert_eq!(
            names,
            ["Spin___BOOLEAN__I4__SZARRAY_STRING__BYREF_R8__OBJECT"]
        );
    }

    #[test]
    fn referenced_types() {
        let names = identifiers(
            vec![MethodDefBuilder::native(
                "Link",
                sig(
                    true,
                    ElementType::Void,
                    vec![
                        ElementType::Class(Token::encode(TableKind::TypeDef, 1)),
                        ElementType::ValueType(Token::encode(TableKind::TypeRef, 0)),
                        ElementType::SzArray(Box::new(ElementType::Class(Token::encode(
                            TableKind::TypeSpec,
                            0,
                        )))),
                        ElementType::Unknown(13),
                    ],
                ),
            )],
            NamingPolicy::Interop,
        );
        assert_eq!(
            names,
            ["Link___VOID__AcmeWidgetsCog__mscorlibSystemSpanOf__SZARRAY_08000000__"]
        );
    }

    #[test]
    fn policies() {
        assert_eq!(NamingPolicy::Interop.escape("op.Add<T>"), "op_Add_T_");
        assert_eq!(NamingPolicy::Plain.escape("op.Add<T>"), "op_Add<T>");
        assert_eq!(NamingPolicy::Plain.escape(".ctor"), "_ctor");
        assert_eq!(NamingPolicy::default(), NamingPolicy::Interop);
    }

    #[test]
    fn policies_agree_on_dotted_names() {
        for name in [".ctor", ".cctor", "System.IDisposable.Dispose", "Read_Value"] {
            assert_eq!(
                NamingPolicy::Interop.escape(name),
                NamingPolicy::Plain.escape(name),
                "{name}"
            );
        }

        assert_eq!(NamingPolicy::Interop.escape("<Run>b__0"), "_Run_b__0");
        assert_eq!(NamingPolicy::Plain.escape("<Run>b__0"), "<Run>b__0");
        assert_eq!(NamingPolicy::Interop.escape("Map`2"), "Map_2");
    }

    #[test]
    fn constructor_identifier() {
        let names = identifiers(
            vec![MethodDefBuilder::native(
                ".ctor",
                sig(true, ElementType::Void, vec![ElementType::U1]),
            )],
            NamingPolicy::Plain,
        );
        assert_eq!(names, ["_ctor___VOID__U1"]);
    }

    #[test]
    fn collision_law() {
        let mut namer = MethodNamer::new();
        let issued: Vec<_> = ["A", "A", "A_2", "A", "B", "A_2"]
            .iter()
            .map(|base| namer.disambiguate(base.to_string()))
            .collect();

        assert_eq!(issued, ["A", "A_2", "A_2_2", "A_3", "B", "A_2_3"]);
        let unique: HashSet<_> = issued.iter().collect();
        assert_eq!(unique.len(), issued.len());
    }

    #[test]
    fn namer_is_per_instance() {
        let mut first = MethodNamer::new();
        let mut second = MethodNamer::new();
        assert_eq!(first.disambiguate("X".into()), "X");
        assert_eq!(second.disambiguate("X".into()), "X");
    }

    #[test]
    fn type_ref_with_nested_scope() {
        let mut builder = AssemblyBuilder::new("Acme", Version::default());
        let mscorlib = builder.assembly_ref("mscorlib", Version::default());
        let outer = builder.type_ref("System", "Outer", mscorlib);
        let inner = builder.type_ref("", "Inner", TYPEREF_FLAG | outer);
        builder
            .type_def(TypeDefBuilder::new("", "T").method(MethodDefBuilder::native(
                "M",
                sig(
                    false,
                    ElementType::ValueType(Token::encode(TableKind::TypeRef, u32::from(inner))),
                    vec![],
                ),
            )))
            .unwrap();
        let assembly = Assembly::from_mem(builder.build().unwrap()).unwrap();

        let method = assembly.method_def(0).unwrap();
        let signature = parse_method_signature(assembly.signature(method.sig).unwrap()).unwrap();
        assert_eq!(
            method_identifier(&assembly, &method, &signature, NamingPolicy::Interop).unwrap(),
            "M___STATIC__mscorlibSystemOuterInner"
        );
    }
}

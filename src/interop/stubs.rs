use std::path::Path;

use crate::{
    interop::{
        header::field_identifier,
        native::{Marshaled, NativeType},
        plan::{NativeMethod, TypePlan},
        sink::{suffixed, Artifact, ArtifactKind},
        templates,
    },
    metadata::{
        assembly::Assembly,
        signatures::{parse_field_signature, MethodSignature},
    },
    naming::{header_guard, type_name, NamingPolicy},
    Result,
};

const INDENT: &str = "    ";

/// A method as the developer's stub sees it.
struct StubMethod {
    name: String,
    is_static: bool,
    ret: NativeType,
    params: Vec<Marshaled>,
}

impl StubMethod {
    fn new(
        assembly: &Assembly,
        name: &str,
        is_static: bool,
        signature: &MethodSignature,
        policy: NamingPolicy,
    ) -> Result<Self> {
        let ret = Marshaled::classify(assembly, &signature.return_type)?.return_type();
        let params = signature
            .params
            .iter()
            .map(|param| Marshaled::classify(assembly, param))
            .collect::<Result<Vec<_>>>()?;

        Ok(StubMethod {
            name: policy.escape(name),
            is_static,
            ret,
            params,
        })
    }

    /// `ret [owner::]name( [CLR_RT_HeapBlock* pMngObj, ]T0 param0, ..., HRESULT &hr )`
    fn declaration(&self, owner: Option<&str>) -> String {
        let mut decl = format!("{} ", self.ret.std_name());
        if let Some(owner) = owner {
            decl.push_str(owner);
            decl.push_str("::");
        }
        decl.push_str(&self.name);
        decl.push_str("( ");
        if !self.is_static {
            decl.push_str("CLR_RT_HeapBlock* pMngObj, ");
        }
        for (position, param) in self.params.iter().enumerate() {
            decl.push_str(&format!("{} param{position}, ", param.variable_decl()));
        }
        decl.push_str("HRESULT &hr )");
        decl
    }

    /// The call of the developer's stub from the marshaling function.
    fn call(&self, owner: &str) -> String {
        let mut args = Vec::with_capacity(self.params.len() + 2);
        if !self.is_static {
            args.push("pMngObj".to_string());
        }
        args.extend(
            self.params
                .iter()
                .enumerate()
                .map(|(position, param)| param.call_arg(position)),
        );
        args.push("hr".to_string());

        let assign = if self.ret.is_void() {
            String::new()
        } else {
            format!("{} retVal = ", self.ret.std_name())
        };

        format!("{assign}{owner}::{}( {} );", self.name, args.join(", "))
    }

    /// The body of the marshaling function: fetch the instance, marshal the arguments in,
    /// call the stub, store the result and write references back.
    fn marshal_body(&self, owner: &str) -> String {
        let mut body = String::from("    NANOCLR_HEADER(); hr = S_OK;\n    {\n");
        if !self.is_static {
            body.push_str(
                "        CLR_RT_HeapBlock* pMngObj = Interop_Marshal_RetrieveManagedObject( stack );\n\n",
            );
            body.push_str("        FAULT_ON_NULL(pMngObj);\n\n");
        }

        let first_slot = usize::from(!self.is_static);
        for (position, param) in self.params.iter().enumerate() {
            body.push_str(&param.marshal_in(position, first_slot + position));
            body.push('\n');
        }

        body.push_str(&format!("        {}\n", self.call(owner)));
        body.push_str("        NANOCLR_CHECK_HRESULT( hr );\n");
        if !self.ret.is_void() {
            body.push_str(&format!(
                "        SetResult_{}( stack, retVal );\n\n",
                self.ret.native_name()
            ));
        }

        for (position, param) in self.params.iter().enumerate() {
            body.push_str(&param.marshal_out(position, first_slot + position));
        }

        body.push_str("    }\n    NANOCLR_NOCLEANUP();\n");
        body
    }

    fn empty_definition(&self, owner: &str) -> String {
        let mut out = self.declaration(Some(owner));
        if self.ret.is_void() {
            out.push_str("\n{\n}\n\n");
        } else {
            out.push_str(&format!(
                "\n{{\n    {} retVal = 0; \n    return retVal;\n}}\n\n",
                self.ret.std_name()
            ));
        }
        out
    }
}

/// The native namespaces and struct name of a type, from its dotted type name.
fn native_scope(assembly: &Assembly, index: usize) -> Result<(Vec<String>, String)> {
    let name = type_name(assembly, index)?;
    let mut parts: Vec<String> = name
        .split('.')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    let class = parts.pop().unwrap_or_default();
    Ok((parts, class))
}

fn using_namespace(namespaces: &[String]) -> String {
    if namespaces.is_empty() {
        String::new()
    } else {
        format!("using namespace {};\n\n", namespaces.join("::"))
    }
}

/// Shared inputs of the per-type emitters.
pub(crate) struct StubContext<'a> {
    pub assembly: &'a Assembly,
    pub prefix: &'a Path,
    pub file_name: &'a str,
    pub policy: NamingPolicy,
}

impl StubContext<'_> {
    fn stub_methods<'p>(
        &self,
        plan: &'p TypePlan,
    ) -> Result<Vec<(&'p NativeMethod, StubMethod)>> {
        plan.native_methods()
            .map(|(method, native)| {
                let name = self.assembly.string(method.record.name)?;
                let stub = StubMethod::new(
                    self.assembly,
                    &name,
                    method.record.is_static(),
                    &native.signature,
                    self.policy,
                )?;
                Ok((native, stub))
            })
            .collect()
    }

    fn field_accessors(&self, plan: &TypePlan, indent: &str, library: &str) -> Result<String> {
        let mut out = String::new();
        for field in plan.record.instance_fields() {
            let record = self.assembly.field_def(field)?;
            let signature = parse_field_signature(self.assembly.signature(record.sig)?)?;
            let native = match Marshaled::classify(self.assembly, &signature.base)? {
                Marshaled::Value(native) => native,
                Marshaled::ByRef(_) | Marshaled::Array(_) => NativeType::Unsupported,
            };

            let name = field_identifier(self.assembly, field, indent, &mut out)?;
            out.push_str(&format!(
                "{indent}static {std}& Get_{name}( CLR_RT_HeapBlock* pMngObj )    {{ return Interop_Marshal_GetField_{suffix}( pMngObj, {library}::FIELD__{name} ); }}\n\n",
                std = native.std_name(),
                suffix = native.native_name(),
            ));
        }
        Ok(out)
    }

    /// Renders the marshaling source, the stub header and the stub source of an interop type,
    /// in that order.
    pub(crate) fn interop_artifacts(&self, plan: &TypePlan) -> Result<Vec<Artifact>> {
        let class = &plan.class;
        let file_name = self.file_name;
        let library = format!("Library_{file_name}_{class}");
        let (namespaces, struct_name) = native_scope(self.assembly, plan.index)?;
        let methods = self.stub_methods(plan)?;

        let header_path = suffixed(self.prefix, &format!("_{class}.h"));
        let guard = header_guard(&header_path);
        let includes = format!("#include \"{file_name}.h\"\n#include \"{file_name}_{class}.h\"\n\n");
        let using = using_namespace(&namespaces);

        let mut marshal = String::from(templates::DO_NOT_EDIT_BANNER);
        marshal.push_str(&includes);
        marshal.push_str(&using);

        let mut source = String::from(templates::WARNING_BANNER);
        source.push_str(&includes);
        source.push_str(&using);

        let mut header = String::from(templates::WARNING_BANNER);
        header.push_str(&templates::guard_open(&guard));

        let mut indent = String::new();
        let mut closing = Vec::with_capacity(namespaces.len() + 1);
        for namespace in &namespaces {
            header.push_str(&format!("{indent}namespace {namespace}\n{indent}{{\n"));
            closing.push(format!("{indent}}}\n"));
            indent.push_str(INDENT);
        }
        header.push_str(&format!("{indent}struct {struct_name}\n{indent}{{\n"));
        closing.push(format!("{indent}}};\n"));
        indent.push_str(INDENT);

        header.push_str(&format!(
            "{indent}// Helper Functions to access fields of managed object\n"
        ));
        header.push_str(&self.field_accessors(plan, &indent, &library)?);
        header.push_str(&format!(
            "{indent}// Declaration of stubs. These functions are implemented by Interop code developers\n"
        ));

        for (native, stub) in &methods {
            header.push_str(&format!("{indent}static {};\n", stub.declaration(None)));
            source.push_str(&stub.empty_definition(&struct_name));
            marshal.push_str(&templates::method(
                file_name,
                class,
                &native.identifier,
                &stub.marshal_body(&struct_name),
            ));
        }

        for bracket in closing.iter().rev() {
            header.push_str(bracket);
        }
        header.push_str(&templates::guard_close(&guard));

        Ok(vec![
            Artifact::new(
                ArtifactKind::Marshal,
                suffixed(self.prefix, &format!("_{class}_mshl.cpp")),
                marshal,
            ),
            Artifact::new(ArtifactKind::StubHeader, header_path, header),
            Artifact::new(
                ArtifactKind::StubSource,
                suffixed(self.prefix, &format!("_{class}.cpp")),
                source,
            ),
        ])
    }

    /// Renders the class-library source of a type: every native method reports
    /// "not implemented".
    pub(crate) fn library_artifact(&self, plan: &TypePlan, project: &str) -> Artifact {
        let mut source = String::from(templates::WARNING_BANNER);
        source.push_str(&templates::include_header(&format!(
            "{}.h",
            project.to_lowercase()
        )));

        for (_, native) in plan.native_methods() {
            source.push_str(&templates::method(
                self.file_name,
                &plan.class,
                &native.identifier,
                templates::METHOD_NOT_IMPLEMENTED,
            ));
        }

        Artifact::new(
            ArtifactKind::LibrarySource,
            suffixed(self.prefix, &format!("_{}.cpp", plan.class)),
            source,
        )
    }
}

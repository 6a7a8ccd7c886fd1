//! Integration tests for native skeleton generation.
//!
//! Every test builds a synthetic image with `AssemblyBuilder`, renders or generates the
//! skeleton and inspects the artifacts as the native build would see them.

use std::path::{Path, PathBuf};

use nanometa::{
    metadata::header::{compute_assembly_crc, compute_header_crc},
    naming::INVALID_FIELD_PLACEHOLDER,
    prelude::*,
    utils::crc::compute_crc,
};

const GADGET: &str = "Library_Acme_Widgets_Acme_Widgets_Outer_Gadget";

fn sig(has_this: bool, return_type: ElementType, params: Vec<ElementType>) -> MethodSignature {
    MethodSignature {
        has_this,
        return_type,
        params,
    }
}

/// `Acme.Widgets` with three types:
///
/// - `Acme.Widgets.Outer` - one static field, no methods
/// - `Outer/Gadget` - two instance fields (one reserved), `Spin` (native), `Stop` (managed),
///   two identical native `Foo` overloads
/// - `Acme.Widgets.Callback` - a delegate with a bodiless `Invoke`
fn fixture(spin_rva: Option<u16>) -> Result<Assembly> {
    let mut builder = AssemblyBuilder::new("Acme.Widgets", Version::new(1, 2, 3, 4));
    let mscorlib = builder.assembly_ref("mscorlib", Version::new(1, 0, 0, 0));
    let object = builder.type_ref("System", "Object", mscorlib);

    let outer = builder.type_def(
        TypeDefBuilder::new("Acme.Widgets", "Outer")
            .extends(TYPEREF_FLAG | object)
            .static_field(FieldDefBuilder::new("Count", ElementType::I4)),
    )?;

    let spin_sig = sig(
        true,
        ElementType::Boolean,
        vec![
            ElementType::I4,
            ElementType::SzArray(Box::new(ElementType::String)),
        ],
    );
    let spin = match spin_rva {
        Some(rva) => MethodDefBuilder::managed("Spin", spin_sig, rva),
        None => MethodDefBuilder::native("Spin", spin_sig),
    };

    builder.type_def(
        TypeDefBuilder::new("", "Gadget")
            .enclosing(outer)
            .extends(TYPEREF_FLAG | object)
            .instance_field(FieldDefBuilder::new("_speed", ElementType::I4))
            .instance_field(FieldDefBuilder::new("<Speed>k__BackingField", ElementType::I4))
            .method(spin)
            .method(MethodDefBuilder::managed(
                "Stop",
                sig(true, ElementType::Void, vec![]),
                0,
            ))
            .method(MethodDefBuilder::native(
                "Foo",
                sig(false, ElementType::Void, vec![]),
            ))
            .method(MethodDefBuilder::native(
                "Foo",
                sig(false, ElementType::Void, vec![]),
            )),
    )?;

    builder.type_def(
        TypeDefBuilder::new("Acme.Widgets", "Callback")
            .flags(TypeDefFlags::DELEGATE)
            .method(MethodDefBuilder::native(
                "Invoke",
                sig(true, ElementType::Void, vec![]),
            )),
    )?;

    Assembly::from_mem(builder.build()?)
}

fn contents(skeleton: &Skeleton, kind: ArtifactKind) -> &str {
    &skeleton.artifact(kind).unwrap().contents
}

#[test]
fn interop_artifact_set() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let paths: Vec<&Path> = skeleton
        .artifacts
        .iter()
        .map(|artifact| artifact.path.as_path())
        .collect();
    assert_eq!(
        paths,
        vec![
            Path::new("out/Acme_Widgets.h"),
            Path::new("out/Acme_Widgets.cpp"),
            Path::new("out/Acme_Widgets_Acme_Widgets_Outer_Gadget_mshl.cpp"),
            Path::new("out/Acme_Widgets_Acme_Widgets_Outer_Gadget.h"),
            Path::new("out/Acme_Widgets_Acme_Widgets_Outer_Gadget.cpp"),
            Path::new("out/FindINTEROP-Acme.Widgets.cmake"),
        ]
    );

    let kinds: Vec<ArtifactKind> = skeleton.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ArtifactKind::Header,
            ArtifactKind::Lookup,
            ArtifactKind::Marshal,
            ArtifactKind::StubHeader,
            ArtifactKind::StubSource,
            ArtifactKind::BuildModule,
        ]
    );

    let cmake = contents(&skeleton, ArtifactKind::BuildModule);
    assert!(cmake.contains(concat!(
        "set(Acme.Widgets_SRCS\n\n",
        "    Acme_Widgets.cpp\n",
        "    Acme_Widgets_Acme_Widgets_Outer_Gadget_mshl.cpp\n",
        "    Acme_Widgets_Acme_Widgets_Outer_Gadget.cpp\n",
        "\n)\n",
    )));

    Ok(())
}

#[test]
fn scenario_a_colliding_overloads() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let header = contents(&skeleton, ArtifactKind::Header);
    assert!(header.contains("    NANOCLR_NATIVE_DECLARE(Foo___STATIC__VOID);\n"));
    assert!(header.contains("    NANOCLR_NATIVE_DECLARE(Foo___STATIC__VOID_2);\n"));

    let lookup = contents(&skeleton, ArtifactKind::Lookup);
    let first = lookup
        .find(&format!("{GADGET}::Foo___STATIC__VOID,\n"))
        .unwrap();
    let second = lookup
        .find(&format!("{GADGET}::Foo___STATIC__VOID_2,\n"))
        .unwrap();
    assert!(first < second);

    Ok(())
}

#[test]
fn collision_law_holds_per_type() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let lookup = contents(&skeleton, ArtifactKind::Lookup);
    let identifiers: Vec<&str> = lookup
        .lines()
        .filter_map(|line| line.trim().strip_prefix(&format!("{GADGET}::")))
        .collect();
    assert_eq!(identifiers.len(), 3);

    let mut unique = identifiers.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), identifiers.len());

    Ok(())
}

#[test]
fn scenario_b_nested_class_names() -> Result<()> {
    let assembly = fixture(None)?;

    assert_eq!(
        class_name(&assembly, 1, RenderMode::Dotted)?,
        "Acme.Widgets.Outer.Gadget"
    );
    assert_eq!(
        class_name(&assembly, 1, RenderMode::Identifier)?,
        "Acme_Widgets_Outer_Gadget"
    );

    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;
    let stub_header = contents(&skeleton, ArtifactKind::StubHeader);
    assert!(stub_header.contains("namespace Acme\n{\n"));
    assert!(stub_header.contains("    namespace Widgets\n    {\n"));
    assert!(stub_header.contains("        struct Outer_Gadget\n        {\n"));
    assert!(stub_header.contains("#ifndef _ACME_WIDGETS_ACME_WIDGETS_OUTER_GADGET_H_\n"));

    Ok(())
}

#[test]
fn scenario_c_instance_method_with_array() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let stub_header = contents(&skeleton, ArtifactKind::StubHeader);
    assert!(stub_header.contains(
        "static bool Spin( CLR_RT_HeapBlock* pMngObj, int32_t param0, CLR_RT_TypedArray_LPCSTR param1, HRESULT &hr );\n"
    ));

    let marshal = contents(&skeleton, ArtifactKind::Marshal);
    assert!(marshal.starts_with("//-----------------------------------------------------------------------------\n//\n//    ** DO NOT EDIT THIS FILE! **\n"));
    assert!(marshal.contains(&format!(
        "HRESULT {GADGET}::Spin___BOOLEAN__I4__SZARRAY_STRING( CLR_RT_StackFrame& stack )\n"
    )));
    assert!(marshal.contains("Interop_Marshal_INT32( stack, 1, param0 )"));
    assert!(marshal.contains("Interop_Marshal_LPCSTR_ARRAY( stack, 2, param1 )"));
    assert!(marshal.contains("bool retVal = Outer_Gadget::Spin( pMngObj, param0, param1, hr );"));
    assert!(marshal.contains("SetResult_bool( stack, retVal );"));
    assert!(marshal.contains("using namespace Acme::Widgets;\n"));

    let stub_source = contents(&skeleton, ArtifactKind::StubSource);
    assert!(stub_source.contains("** WARNING! **"));
    assert!(stub_source.contains(
        "bool Outer_Gadget::Spin( CLR_RT_HeapBlock* pMngObj, int32_t param0, CLR_RT_TypedArray_LPCSTR param1, HRESULT &hr )\n{\n    bool retVal = 0; \n    return retVal;\n}\n"
    ));

    // Spin is the first MethodDef, so it owns slot 0
    let lookup = contents(&skeleton, ArtifactKind::Lookup);
    let slots: Vec<&str> = lookup
        .lines()
        .skip_while(|line| *line != "{")
        .skip(1)
        .take_while(|line| *line != "};")
        .collect();
    assert_eq!(
        slots,
        vec![
            format!("    {GADGET}::Spin___BOOLEAN__I4__SZARRAY_STRING,"),
            "    NULL,".to_string(),
            format!("    {GADGET}::Foo___STATIC__VOID,"),
            format!("    {GADGET}::Foo___STATIC__VOID_2,"),
            "    NULL,".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn scenario_d_reserved_field_name() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let header = contents(&skeleton, ArtifactKind::Header);
    assert!(header.contains(&format!(
        concat!(
            "    static const int FIELD___speed = 1;\n",
            "    // Something wrong with this field. Possibly its backing field is missing (mandatory for nanoFramework).\n",
            "    // <Speed>k__BackingField\n",
            "    static const int FIELD__{} = 2;\n",
        ),
        INVALID_FIELD_PLACEHOLDER
    )));

    // the placeholder is not a valid identifier, so the native build stops right there
    assert!(INVALID_FIELD_PLACEHOLDER
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && c != '_'));

    let stub_header = contents(&skeleton, ArtifactKind::StubHeader);
    assert!(stub_header.contains(&format!("Get_{INVALID_FIELD_PLACEHOLDER}(")));

    Ok(())
}

#[test]
fn header_layout() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let header = contents(&skeleton, ArtifactKind::Header);
    assert!(header.contains(concat!(
        "#ifndef _ACME_WIDGETS_H_\n#define _ACME_WIDGETS_H_\n\n",
        "#include <nanoCLR_Interop.h>\n#include <nanoCLR_Runtime.h>\n",
        "struct Library_Acme_Widgets_Acme_Widgets_Outer\n{\n",
        "    static const int FIELD_STATIC__Count = 0;\n\n",
        "\n    //--//\n\n};\n\n",
    )));
    assert!(header.ends_with(concat!(
        "\n\nextern const CLR_RT_NativeAssemblyData g_CLR_AssemblyNative_Acme_Widgets;\n\n",
        "#endif  //_ACME_WIDGETS_H_\n",
    )));

    let lookup = contents(&skeleton, ArtifactKind::Lookup);
    assert!(lookup.contains("#include \"Acme_Widgets.h\"\n"));
    assert!(lookup.contains("const CLR_RT_NativeAssemblyData g_CLR_AssemblyNative_Acme_Widgets =\n"));
    assert!(lookup.contains("    \"Acme.Widgets\", \n"));
    assert!(lookup.contains("    { 1, 2, 3, 4 }\n"));
    assert!(lookup.contains(&format!("    0x{:08X},\n", skeleton.checksum)));

    Ok(())
}

#[test]
fn delegates_are_excluded() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    for artifact in &skeleton.artifacts {
        assert!(!artifact.contents.contains("Callback"), "{}", artifact.path.display());
        assert!(!artifact.path.to_string_lossy().contains("Callback"));
    }

    // Invoke occupies the last slot
    let lookup = contents(&skeleton, ArtifactKind::Lookup);
    assert!(lookup.contains(&format!(
        "{GADGET}::Foo___STATIC__VOID_2,\n    NULL,\n}};\n"
    )));

    Ok(())
}

#[test]
fn checksum_chains_eligible_triples() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let triple = |identifier: &str| format!("Acme.WidgetsAcme_Widgets_Outer_Gadget{identifier}");
    let text = [
        triple("Spin___BOOLEAN__I4__SZARRAY_STRING"),
        "NULL".to_string(),
        triple("Foo___STATIC__VOID"),
        triple("Foo___STATIC__VOID_2"),
        "NULL".to_string(),
    ]
    .concat();

    assert_eq!(skeleton.checksum, compute_crc(text.as_bytes(), 0));
    Ok(())
}

#[test]
fn checksum_tracks_eligibility() -> Result<()> {
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let native = SkeletonGenerator::new(&options).render(&fixture(None)?)?;
    let managed = SkeletonGenerator::new(&options).render(&fixture(Some(4))?)?;

    assert_ne!(native.checksum, managed.checksum);
    assert!(contents(&managed, ArtifactKind::Lookup).starts_with(concat!(
        "//-----------------------------------------------------------------------------\n"
    )));
    assert!(!contents(&managed, ArtifactKind::Lookup).contains("Spin___"));

    Ok(())
}

#[test]
fn rendering_is_deterministic() -> Result<()> {
    let assembly = fixture(None)?;
    let parallel = GeneratorOptions::new("out/Acme_Widgets");
    let sequential = GeneratorOptions::new("out/Acme_Widgets").parallel(false);

    let first = SkeletonGenerator::new(&parallel).render(&assembly)?;
    let second = SkeletonGenerator::new(&parallel).render(&assembly)?;
    let third = SkeletonGenerator::new(&sequential).render(&assembly)?;

    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first.artifacts, third.artifacts);
    assert_eq!(first.checksum, third.checksum);

    Ok(())
}

#[test]
fn generate_writes_back_header() -> Result<()> {
    let mut assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let mut sink = MemorySink::new();

    let report = SkeletonGenerator::new(&options).generate(&mut assembly, &mut sink)?;

    assert!(report.skipped.is_empty());
    assert_eq!(report.written.len(), 6);
    assert_eq!(sink.len(), 6);
    assert!(sink
        .get("out/Acme_Widgets.cpp")
        .unwrap()
        .contains(&format!("0x{:08X}", report.checksum)));

    assert_eq!(assembly.native_checksum(), report.checksum);
    let reloaded = Assembly::from_mem(assembly.data().to_vec())?;
    assert_eq!(reloaded.native_checksum(), report.checksum);
    assert_eq!(
        reloaded.header().header_crc,
        compute_header_crc(reloaded.data())?
    );
    assert_eq!(
        reloaded.header().assembly_crc,
        compute_assembly_crc(reloaded.data(), reloaded.header().total_size())?
    );

    Ok(())
}

/// Refuses every header, accepts everything else.
struct NoHeaders {
    accepted: Vec<PathBuf>,
}

impl ArtifactSink for NoHeaders {
    fn write_artifact(&mut self, path: &Path, _contents: &str) -> Result<()> {
        if path.extension().is_some_and(|extension| extension == "h") {
            return Err(Error::Error(format!("read-only: {}", path.display())));
        }
        self.accepted.push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn sink_failures_skip_single_artifacts() -> Result<()> {
    let mut assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets");
    let mut sink = NoHeaders {
        accepted: Vec::new(),
    };

    let report = SkeletonGenerator::new(&options).generate(&mut assembly, &mut sink)?;

    let skipped: Vec<&Path> = report.skipped.iter().map(|s| s.path.as_path()).collect();
    assert_eq!(
        skipped,
        vec![
            Path::new("out/Acme_Widgets.h"),
            Path::new("out/Acme_Widgets_Acme_Widgets_Outer_Gadget.h"),
        ]
    );
    assert!(report.skipped[0].reason.contains("read-only"));
    assert_eq!(report.written, sink.accepted);
    assert_eq!(report.written.len(), 4);

    // the run still completes
    assert_eq!(assembly.native_checksum(), report.checksum);
    Ok(())
}

#[test]
fn core_library_mode() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("out/Acme_Widgets")
        .project_name("Acme.Widgets")
        .mode(GenerationMode::CoreLibrary);
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let kinds: Vec<ArtifactKind> = skeleton.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ArtifactKind::Header,
            ArtifactKind::Lookup,
            ArtifactKind::LibrarySource,
        ]
    );

    let header = contents(&skeleton, ArtifactKind::Header);
    assert!(header.contains("** WARNING! **"));
    assert!(!header.contains("nanoCLR_Interop.h"));

    let lookup = contents(&skeleton, ArtifactKind::Lookup);
    assert!(lookup.starts_with("#include \"Acme_Widgets.h\"\n"));
    assert!(lookup.contains("    { 0, 0, 0, 0 }\n"));

    let library = skeleton.artifact(ArtifactKind::LibrarySource).unwrap();
    assert_eq!(
        library.path,
        PathBuf::from("out/Acme_Widgets_Acme_Widgets_Outer_Gadget.cpp")
    );
    assert!(library.contents.contains("\n#include \"acme_widgets.h\"\n\n"));
    assert!(library.contents.contains(&format!(
        "\nHRESULT {GADGET}::Spin___BOOLEAN__I4__SZARRAY_STRING( CLR_RT_StackFrame& stack )\n{{\n    NANOCLR_HEADER();\n"
    )));
    assert_eq!(library.contents.matches("NotImplementedStub").count(), 3);

    Ok(())
}

#[test]
fn writes_to_the_filesystem() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut assembly = fixture(None)?;
    let options = GeneratorOptions::new(dir.path().join("native").join("Acme.Widgets"));

    let report = SkeletonGenerator::new(&options).generate(&mut assembly, &mut FsSink::new())?;
    assert!(report.skipped.is_empty());

    let native = dir.path().join("native");
    for name in [
        "Acme_Widgets.h",
        "Acme_Widgets.cpp",
        "Acme_Widgets_Acme_Widgets_Outer_Gadget_mshl.cpp",
        "Acme_Widgets_Acme_Widgets_Outer_Gadget.h",
        "Acme_Widgets_Acme_Widgets_Outer_Gadget.cpp",
        "FindINTEROP-Acme.Widgets.cmake",
    ] {
        assert!(native.join(name).is_file(), "{name} missing");
    }

    let image = dir.path().join("Acme.Widgets.pe");
    assembly.to_file(&image)?;
    assert_eq!(Assembly::from_file(&image)?.native_checksum(), report.checksum);

    Ok(())
}

#[test]
fn path_without_file_name_is_rejected() -> Result<()> {
    let assembly = fixture(None)?;
    let options = GeneratorOptions::new("/");

    assert!(matches!(
        SkeletonGenerator::new(&options).render(&assembly),
        Err(Error::Error(_))
    ));
    Ok(())
}

/// Points the name of `TypeDef` `index` at entry `id` of the runtime's built-in string table.
fn name_from_builtin_table(assembly: &Assembly, index: usize, id: u16) -> Result<Assembly> {
    let mut data = assembly.data().to_vec();
    let offset = assembly.record_offset(TableKind::TypeDef, index)?;
    data[offset..offset + 2].copy_from_slice(&(0xFFFF - id).to_le_bytes());
    Assembly::from_mem(data)
}

#[test]
fn builtin_string_names_render() -> Result<()> {
    // 0x58 is "DateTime" in the runtime's table
    let assembly = name_from_builtin_table(&fixture(None)?, 1, 0x58)?;
    assert_eq!(
        class_name(&assembly, 1, RenderMode::Dotted)?,
        "Acme.Widgets.Outer.BUILTIN_STRING_0058"
    );

    let options = GeneratorOptions::new("out/Acme_Widgets");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let lookup = contents(&skeleton, ArtifactKind::Lookup);
    assert!(lookup.contains(
        "    Library_Acme_Widgets_Acme_Widgets_Outer_BUILTIN_STRING_0058::Spin___BOOLEAN__I4__SZARRAY_STRING,\n"
    ));
    assert!(skeleton
        .artifacts
        .iter()
        .any(|artifact| artifact.path
            == Path::new("out/Acme_Widgets_Acme_Widgets_Outer_BUILTIN_STRING_0058.h")));

    Ok(())
}

/// `Acme.Io.Port` with static natives returning an array, returning a reference and taking
/// a reference.
fn port_fixture() -> Result<Assembly> {
    let mut builder = AssemblyBuilder::new("Acme.Io", Version::new(1, 0, 0, 0));
    builder.type_def(
        TypeDefBuilder::new("Acme.Io", "Port")
            .method(MethodDefBuilder::native(
                "Read",
                sig(false, ElementType::SzArray(Box::new(ElementType::I4)), vec![]),
            ))
            .method(MethodDefBuilder::native(
                "Peek",
                sig(false, ElementType::ByRef(Box::new(ElementType::R8)), vec![]),
            ))
            .method(MethodDefBuilder::native(
                "Fill",
                sig(
                    false,
                    ElementType::Void,
                    vec![ElementType::ByRef(Box::new(ElementType::I4))],
                ),
            )),
    )?;
    Assembly::from_mem(builder.build()?)
}

#[test]
fn composite_returns_fail_the_native_build() -> Result<()> {
    let assembly = port_fixture()?;
    let options = GeneratorOptions::new("out/Acme_Io");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let stub_header = contents(&skeleton, ArtifactKind::StubHeader);
    assert!(stub_header.contains("static UNSUPPORTED_TYPE Read( HRESULT &hr );\n"));
    assert!(stub_header.contains("static UNSUPPORTED_TYPE Peek( HRESULT &hr );\n"));
    assert!(!stub_header.contains("int32_t Read"));
    assert!(!stub_header.contains("double Peek"));

    let marshal = contents(&skeleton, ArtifactKind::Marshal);
    assert_eq!(
        marshal
            .matches("SetResult_UNSUPPORTED_TYPE( stack, retVal );")
            .count(),
        2
    );
    assert!(!marshal.contains("SetResult_INT32"));

    Ok(())
}

#[test]
fn reference_parameters_pass_by_reference() -> Result<()> {
    let assembly = port_fixture()?;
    let options = GeneratorOptions::new("out/Acme_Io");
    let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

    let stub_header = contents(&skeleton, ArtifactKind::StubHeader);
    assert!(stub_header.contains("static void Fill( int32_t& param0, HRESULT &hr );\n"));

    let marshal = contents(&skeleton, ArtifactKind::Marshal);
    assert!(marshal.contains("        int32_t* param0;\n"));
    assert!(marshal.contains("Interop_Marshal_INT32_ByRef( stack, heapblock0, 0, param0 )"));
    assert!(marshal.contains("        Port::Fill( *param0, hr );\n"));
    assert!(marshal.contains("Interop_Marshal_StoreRef( stack, heapblock0, 0 )"));

    let stub_source = contents(&skeleton, ArtifactKind::StubSource);
    assert!(stub_source.contains("void Port::Fill( int32_t& param0, HRESULT &hr )\n{\n}\n"));

    Ok(())
}

#[test]
fn private_implementation_details_take_no_static_slots() -> Result<()> {
    let mut builder = AssemblyBuilder::new("Acme.Widgets", Version::new(1, 0, 0, 0));
    builder.type_def(
        TypeDefBuilder::new("", "<PrivateImplementationDetails>")
            .static_field(FieldDefBuilder::new("Blob0", ElementType::I4))
            .static_field(FieldDefBuilder::new("Blob1", ElementType::I4)),
    )?;
    builder.type_def(
        TypeDefBuilder::new("Acme.Widgets", "Holder")
            .static_field(FieldDefBuilder::new("Total", ElementType::I4)),
    )?;
    let assembly = Assembly::from_mem(builder.build()?)?;

    for mode in [GenerationMode::Interop, GenerationMode::CoreLibrary] {
        let options = GeneratorOptions::new("out/Acme_Widgets").mode(mode);
        let skeleton = SkeletonGenerator::new(&options).render(&assembly)?;

        let header = contents(&skeleton, ArtifactKind::Header);
        assert!(header.contains(concat!(
            "struct Library_Acme_Widgets_Acme_Widgets_Holder\n{\n",
            "    static const int FIELD_STATIC__Total = 0;\n",
        )));
        assert!(!header.contains("PrivateImplementationDetails"));
        assert!(!header.contains("Blob0"));
    }

    Ok(())
}

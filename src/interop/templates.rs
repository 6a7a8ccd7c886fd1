//! Fixed text of the generated native sources.
//!
//! The runtime build consumes these files verbatim, so every newline and space here is part of
//! the output format.

/// Banner of files that are rewritten on every run.
pub(crate) const DO_NOT_EDIT_BANNER: &str = concat!(
    "//-----------------------------------------------------------------------------\n",
    "//\n",
    "//    ** DO NOT EDIT THIS FILE! **\n",
    "//    This file was generated by a tool\n",
    "//    re-running the tool will overwrite this file.\n",
    "//\n",
    "//-----------------------------------------------------------------------------\n",
    "\n\n",
);

/// Banner of files the native developer copies and fills in.
pub(crate) const WARNING_BANNER: &str = concat!(
    "//-----------------------------------------------------------------------------\n",
    "//\n",
    "//                   ** WARNING! ** \n",
    "//    This file was generated automatically by a tool.\n",
    "//    Re-running the tool will overwrite this file.\n",
    "//    You should copy this file to a custom location\n",
    "//    before adding any customization in the copy to\n",
    "//    prevent loss of your changes when the tool is\n",
    "//    re-run.\n",
    "//\n",
    "//-----------------------------------------------------------------------------\n",
);

pub(crate) const INCLUDE_INTEROP: &str =
    "#include <nanoCLR_Interop.h>\n#include <nanoCLR_Runtime.h>\n";

pub(crate) const TYPE_END: &str = "\n    //--//\n\n};\n\n";

pub(crate) const LOOKUP_NULL: &str = "    NULL,\n";

pub(crate) const METHOD_NOT_IMPLEMENTED: &str = concat!(
    "    NANOCLR_HEADER();\n",
    "\n",
    "    NANOCLR_SET_AND_LEAVE(stack.NotImplementedStub());\n",
    "\n",
    "    NANOCLR_NOCLEANUP();\n",
);

pub(crate) fn guard_open(guard: &str) -> String {
    format!("#ifndef {guard}\n#define {guard}\n\n")
}

pub(crate) fn guard_close(guard: &str) -> String {
    format!("#endif  //{guard}\n")
}

pub(crate) fn include_header(name: &str) -> String {
    format!("\n#include \"{name}\"\n\n")
}

pub(crate) fn type_begin(file: &str, class: &str) -> String {
    format!("struct Library_{file}_{class}\n{{\n")
}

pub(crate) fn static_field(name: &str, index: usize) -> String {
    format!("    static const int FIELD_STATIC__{name} = {index};\n")
}

pub(crate) fn instance_field(name: &str, offset: u16) -> String {
    format!("    static const int FIELD__{name} = {offset};\n")
}

pub(crate) fn native_declare(identifier: &str) -> String {
    format!("    NANOCLR_NATIVE_DECLARE({identifier});\n")
}

pub(crate) fn assembly_extern(assembly_id: &str) -> String {
    format!("\n\nextern const CLR_RT_NativeAssemblyData g_CLR_AssemblyNative_{assembly_id};\n\n")
}

pub(crate) fn lookup_begin(include: &str) -> String {
    format!(
        concat!(
            "#include \"{include}\"\n",
            "\n",
            "\n",
            "static const CLR_RT_MethodHandler method_lookup[] =\n",
            "{{\n",
        ),
        include = include
    )
}

pub(crate) fn lookup_entry(file: &str, class: &str, identifier: &str) -> String {
    format!("    Library_{file}_{class}::{identifier},\n")
}

pub(crate) fn lookup_end(
    assembly_id: &str,
    assembly_name: &str,
    checksum: u32,
    version: [u16; 4],
) -> String {
    format!(
        concat!(
            "}};\n",
            "\n",
            "const CLR_RT_NativeAssemblyData g_CLR_AssemblyNative_{id} =\n",
            "{{\n",
            "    \"{name}\", \n",
            "    0x{checksum:08X},\n",
            "    method_lookup,\n",
            "    ////////////////////////////////////////////////////////////////////////////////////\n",
            "    // check if the version bellow matches the one in AssemblyNativeVersion attribute //\n",
            "    ////////////////////////////////////////////////////////////////////////////////////\n",
            "    {{ {major}, {minor}, {build}, {revision} }}\n",
            "}};\n",
        ),
        id = assembly_id,
        name = assembly_name,
        checksum = checksum,
        major = version[0],
        minor = version[1],
        build = version[2],
        revision = version[3],
    )
}

pub(crate) fn method(file: &str, class: &str, identifier: &str, body: &str) -> String {
    format!(
        "\nHRESULT Library_{file}_{class}::{identifier}( CLR_RT_StackFrame& stack )\n{{\n{body}}}\n"
    )
}

pub(crate) const CMAKE_OPEN: &str = concat!(
    "#\n",
    "# Copyright(c) 2018 The nanoFramework project contributors\n",
    "# See LICENSE file in the project root for full license information.\n",
    "#\n\n\n",
);

pub(crate) fn cmake_preamble(name: &str) -> String {
    format!(
        concat!(
            "#################################################################################################\n",
            "# make sure that a valid path is set bellow                                                     #\n",
            "# if this is for a class library it's OK to leave it as it is                                   #\n",
            "# if this is an Interop module the path has to be set where the build can find the source files #\n",
            "#################################################################################################\n",
            "\n",
            "# native code directory\n",
            "set(BASE_PATH_FOR_THIS_MODULE \"${{BASE_PATH_FOR_CLASS_LIBRARIES_MODULES}}/{name}\")\n",
            "\n\n",
            "# set include directories\n",
            "list(APPEND {name}_INCLUDE_DIRS \"${{PROJECT_SOURCE_DIR}}/src/CLR/Core\")\n",
            "list(APPEND {name}_INCLUDE_DIRS \"${{PROJECT_SOURCE_DIR}}/src/CLR/Include\")\n",
            "list(APPEND {name}_INCLUDE_DIRS \"${{PROJECT_SOURCE_DIR}}/src/HAL/Include\")\n",
            "list(APPEND {name}_INCLUDE_DIRS \"${{PROJECT_SOURCE_DIR}}/src/PAL/Include\")\n",
            "list(APPEND {name}_INCLUDE_DIRS \"${{BASE_PATH_FOR_THIS_MODULE}}\")\n",
        ),
        name = name
    )
}

pub(crate) fn cmake_sources_begin(name: &str) -> String {
    format!("\n# source files\nset({name}_SRCS\n\n")
}

pub(crate) fn cmake_source(file: &str) -> String {
    format!("    {file}\n")
}

pub(crate) const CMAKE_SOURCES_END: &str = "\n)\n\n";

pub(crate) fn cmake_epilogue(name: &str) -> String {
    format!(
        concat!(
            "foreach(SRC_FILE ${{{name}_SRCS}})\n",
            "    set({name}_SRC_FILE SRC_FILE-NOTFOUND)\n",
            "    find_file({name}_SRC_FILE ${{SRC_FILE}}\n",
            "\t    PATHS\n",
            "\t        \"${{BASE_PATH_FOR_THIS_MODULE}}\"\n",
            "\t        \"${{TARGET_BASE_LOCATION}}\"\n",
            "\n",
            "\t    CMAKE_FIND_ROOT_PATH_BOTH\n",
            "    )\n",
            "# message(\"${{SRC_FILE}} >> ${{{name}_SRC_FILE}}\") # debug helper\n",
            "list(APPEND {name}_SOURCES ${{{name}_SRC_FILE}})\n",
            "endforeach()\n",
            "\n",
            "include(FindPackageHandleStandardArgs)\n",
            "\n",
            "FIND_PACKAGE_HANDLE_STANDARD_ARGS({name} DEFAULT_MSG {name}_INCLUDE_DIRS {name}_SOURCES)\n\n",
        ),
        name = name
    )
}

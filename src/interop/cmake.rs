use crate::interop::templates;

/// Renders `FindINTEROP-<assembly>.cmake` listing `sources` in order.
pub(crate) fn render_build_module(assembly_name: &str, sources: &[String]) -> String {
    let mut out = String::from(templates::CMAKE_OPEN);
    out.push_str(&templates::cmake_preamble(assembly_name));
    out.push_str(&templates::cmake_sources_begin(assembly_name));
    for source in sources {
        out.push_str(&templates::cmake_source(source));
    }
    out.push_str(templates::CMAKE_SOURCES_END);
    out.push_str(&templates::cmake_epilogue(assembly_name));
    out
}

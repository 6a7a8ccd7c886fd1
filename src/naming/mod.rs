//! Deterministic names for classes, methods and generated files.
//!
//! Everything the native side binds to by name is derived here:
//!
//! - [`class_name`] / [`type_ref_class_name`] - qualified class names, rendered dotted for
//!   display or with `_` separators for use inside native identifiers ([`RenderMode`])
//! - [`type_name`] - the name native namespaces and stub structs are derived from
//! - [`method_identifier`] - the signature-encoding identifier of a method, disambiguated per
//!   type by a [`MethodNamer`]
//! - [`is_reserved_name`] - detection of compiler-synthesized member names
//! - [`fix_identifier`] / [`header_guard`] - identifiers derived from file and project names
//!
//! All functions are pure over the [`crate::metadata::assembly::Assembly`]; identical images
//! always yield identical names.

mod class;
mod method;

pub use class::{class_name, type_name, type_ref_class_name, RenderMode};
pub use method::{method_identifier, MethodNamer, NamingPolicy};

use std::path::Path;

/// Identifier substituted in generated headers for a field whose name is compiler-synthesized.
///
/// It is deliberately not a valid C++ identifier so the native build fails at that line.
pub const INVALID_FIELD_PLACEHOLDER: &str = "**THIS_FIELD_IS_NOT_CORRECT_CHECK_MANAGED_CODE**";

/// Name substituted in the dump for a field whose name is compiler-synthesized.
pub const DUMP_FIELD_PLACEHOLDER: &str =
    ">>>>>>>>>>>>>>>>>>>>>>>>>>>>SOMETHING_WRONG_WITH_THIS_FIELD_POSSIBLY_MISSING_BACKING_FIELD";

/// First line of the diagnostic emitted above a substituted field.
pub const RESERVED_FIELD_DIAGNOSTIC: &str =
    "// Something wrong with this field. Possibly its backing field is missing (mandatory for nanoFramework).";

/// `true` if `name` carries the characters compilers reserve for synthesized members.
///
/// Such names show up when an auto-property lost its backing field; the storage slot the
/// native code would bind to does not exist.
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    name.contains(['<', '>'])
}

/// Diagnostic lines for a reserved field name, each prefixed with `indent`.
#[must_use]
pub fn reserved_field_comment(indent: &str, name: &str) -> String {
    format!("{indent}{RESERVED_FIELD_DIAGNOSTIC}\n{indent}// {name}\n")
}

/// Turns an arbitrary name into a C identifier: every character that is not an ASCII letter or
/// digit becomes `_`, and so does a leading digit.
///
/// ```rust
/// use nanometa::naming::fix_identifier;
///
/// assert_eq!(fix_identifier("Acme.Widgets"), "Acme_Widgets");
/// assert_eq!(fix_identifier("3d-Engine"), "_d_Engine");
/// ```
#[must_use]
pub fn fix_identifier(name: &str) -> String {
    name.chars()
        .enumerate()
        .map(|(position, c)| {
            if !c.is_ascii_alphanumeric() || (position == 0 && c.is_ascii_digit()) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// The include guard of a header: `_<FILE STEM>_H_`, upper case.
///
/// ```rust
/// use nanometa::naming::header_guard;
/// use std::path::Path;
///
/// assert_eq!(header_guard(Path::new("out/acme_widgets.h")), "_ACME_WIDGETS_H_");
/// ```
#[must_use]
pub fn header_guard(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!("_{stem}_H_").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved() {
        assert!(is_reserved_name("<Speed>k__BackingField"));
        assert!(is_reserved_name("a>b"));
        assert!(!is_reserved_name("_speed"));
        assert!(!is_reserved_name(""));
    }

    #[test]
    fn reserved_comment() {
        assert_eq!(
            reserved_field_comment("    ", "<X>k__BackingField"),
            format!("    {RESERVED_FIELD_DIAGNOSTIC}\n    // <X>k__BackingField\n")
        );
    }

    #[test]
    fn placeholder_is_not_an_identifier() {
        assert_ne!(fix_identifier(INVALID_FIELD_PLACEHOLDER), INVALID_FIELD_PLACEHOLDER);
        assert!(INVALID_FIELD_PLACEHOLDER.contains('*'));
    }

    #[test]
    fn identifiers() {
        assert_eq!(fix_identifier("Acme.Widgets"), "Acme_Widgets");
        assert_eq!(fix_identifier("9lives"), "_lives");
        assert_eq!(fix_identifier(""), "");
        assert_eq!(fix_identifier("ok_1"), "ok_1");
    }

    #[test]
    fn guards() {
        assert_eq!(header_guard(Path::new("Acme.Widgets.h")), "_ACME.WIDGETS_H_");
        assert_eq!(header_guard(Path::new("dir/gadget")), "_GADGET_H_");
    }
}

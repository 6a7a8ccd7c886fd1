use crate::metadata::tables::{MethodDefRecord, TypeDefRecord, TypeSemantics};

/// `true` if native scaffolding is generated for the type.
///
/// Only classes and value types qualify; delegates, interfaces and enums never do.
#[must_use]
pub fn is_eligible_type(type_def: &TypeDefRecord) -> bool {
    if type_def.is_delegate() {
        return false;
    }

    matches!(
        type_def.semantics(),
        TypeSemantics::Class | TypeSemantics::ValueType
    )
}

/// `true` if the method is implemented natively: it has no managed body and is not abstract.
#[must_use]
pub fn is_eligible_method(method: &MethodDefRecord) -> bool {
    !method.has_body() && !method.is_abstract()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MethodDefFlags, TypeDefFlags, EMPTY_INDEX};

    fn type_def(flags: TypeDefFlags) -> TypeDefRecord {
        TypeDefRecord {
            name: 0,
            namespace: EMPTY_INDEX,
            extends: EMPTY_INDEX,
            enclosing_type: EMPTY_INDEX,
            flags,
            interfaces: EMPTY_INDEX,
            methods_first: 0,
            v_methods_num: 0,
            i_methods_num: 0,
            s_methods_num: 0,
            data_type: 0,
            s_fields_first: 0,
            i_fields_first: 0,
            s_fields_num: 0,
            i_fields_num: 0,
        }
    }

    fn method(rva: u16, flags: MethodDefFlags) -> MethodDefRecord {
        MethodDefRecord {
            name: 0,
            rva,
            flags,
            ret_val: 0,
            num_args: 0,
            num_locals: 0,
            length_eval_stack: 0,
            locals: EMPTY_INDEX,
            sig: 0,
        }
    }

    #[test]
    fn types() {
        assert!(is_eligible_type(&type_def(TypeDefFlags::empty())));
        assert!(is_eligible_type(&type_def(TypeDefFlags::from_bits_retain(0x10))));
        assert!(!is_eligible_type(&type_def(TypeDefFlags::from_bits_retain(0x20))));
        assert!(!is_eligible_type(&type_def(TypeDefFlags::SEMANTICS_MASK)));
        assert!(!is_eligible_type(&type_def(TypeDefFlags::DELEGATE)));
        assert!(!is_eligible_type(&type_def(TypeDefFlags::MULTICAST_DELEGATE)));
    }

    #[test]
    fn methods() {
        assert!(is_eligible_method(&method(EMPTY_INDEX, MethodDefFlags::STATIC)));
        assert!(!is_eligible_method(&method(0x0010, MethodDefFlags::empty())));
        assert!(!is_eligible_method(&method(EMPTY_INDEX, MethodDefFlags::ABSTRACT)));
    }
}

use rayon::prelude::*;

use crate::{
    interop::eligibility::{is_eligible_method, is_eligible_type},
    metadata::{
        assembly::Assembly,
        signatures::{parse_method_signature, MethodSignature},
        tables::{MethodDefRecord, TypeDefRecord},
    },
    naming::{class_name, method_identifier, MethodNamer, NamingPolicy, RenderMode},
    Result,
};

/// A native method with its final identifier.
#[derive(Debug, Clone)]
pub(crate) struct NativeMethod {
    pub identifier: String,
    pub signature: MethodSignature,
}

#[derive(Debug, Clone)]
pub(crate) struct MethodPlan {
    pub record: MethodDefRecord,
    /// `Some` only for eligible methods of eligible types
    pub native: Option<NativeMethod>,
}

/// Everything the emitters need to know about one `TypeDef`, computed once.
#[derive(Debug, Clone)]
pub(crate) struct TypePlan {
    pub index: usize,
    pub record: TypeDefRecord,
    /// Identifier-form class name
    pub class: String,
    pub eligible: bool,
    pub methods: Vec<MethodPlan>,
}

impl TypePlan {
    pub fn native_methods(&self) -> impl Iterator<Item = (&MethodPlan, &NativeMethod)> {
        self.methods
            .iter()
            .filter_map(|method| method.native.as_ref().map(|native| (method, native)))
    }

    /// `true` if the type gets per-type marshaling and stub files.
    pub fn has_native_methods(&self) -> bool {
        self.native_methods().next().is_some()
    }
}

fn plan_type(assembly: &Assembly, index: usize, policy: NamingPolicy) -> Result<TypePlan> {
    let record = assembly.type_def(index)?;
    let class = class_name(assembly, index, RenderMode::Identifier)?;
    let eligible = is_eligible_type(&record);

    let mut namer = MethodNamer::new();
    let mut methods = Vec::with_capacity(record.method_count());
    for method_index in record.methods() {
        let method = assembly.method_def(method_index)?;

        let native = if eligible && is_eligible_method(&method) {
            let signature = parse_method_signature(assembly.signature(method.sig)?)?;
            let base = method_identifier(assembly, &method, &signature, policy)?;
            Some(NativeMethod {
                identifier: namer.disambiguate(base),
                signature,
            })
        } else {
            None
        };

        methods.push(MethodPlan {
            record: method,
            native,
        });
    }

    Ok(TypePlan {
        index,
        record,
        class,
        eligible,
        methods,
    })
}

/// Plans every `TypeDef` in table order.
///
/// Types are independent of each other, so the parallel path only changes how the work is
/// scheduled; `collect` keeps the table order.
pub(crate) fn plan_types(
    assembly: &Assembly,
    policy: NamingPolicy,
    parallel: bool,
) -> Result<Vec<TypePlan>> {
    let count = assembly.type_def_count();
    if parallel {
        (0..count)
            .into_par_iter()
            .map(|index| plan_type(assembly, index, policy))
            .collect()
    } else {
        (0..count)
            .map(|index| plan_type(assembly, index, policy))
            .collect()
    }
}

use crate::{
    interop::{plan::TypePlan, templates},
    utils::crc::update_crc,
};

/// Stand-in hashed for every method slot that has no native implementation.
const NULL_ENTRY: &str = "NULL";

/// Computes the native methods checksum over the planned types.
///
/// Walks every method of every type in table order, chaining the CRC of the assembly name, the
/// class name and the method identifier for native methods, and of `NULL` for all others. The
/// result changes whenever a native method is renamed, re-signatured, added or removed, or a
/// method gains or loses eligibility.
pub(crate) fn native_checksum(plans: &[TypePlan], assembly_name: &str) -> u32 {
    let mut crc = 0;
    for plan in plans {
        for method in &plan.methods {
            match &method.native {
                Some(native) => {
                    update_crc(&mut crc, assembly_name);
                    update_crc(&mut crc, &plan.class);
                    update_crc(&mut crc, &native.identifier);
                }
                None => update_crc(&mut crc, NULL_ENTRY),
            }
        }
    }
    crc
}

/// The fixed parts of the lookup source that do not come from the type plans.
pub(crate) struct LookupTable<'a> {
    pub banner: Option<&'static str>,
    pub include: &'a str,
    pub file_name: &'a str,
    pub assembly_id: &'a str,
    pub assembly_name: &'a str,
    pub checksum: u32,
    pub version: [u16; 4],
}

impl LookupTable<'_> {
    /// Renders `<path>.cpp`: one handler slot per method in `MethodDef` order, `NULL` for
    /// methods without a native implementation, then the assembly descriptor.
    pub(crate) fn render(&self, plans: &[TypePlan]) -> String {
        let mut out = String::new();
        if let Some(banner) = self.banner {
            out.push_str(banner);
        }
        out.push_str(&templates::lookup_begin(self.include));

        for plan in plans {
            for method in &plan.methods {
                match &method.native {
                    Some(native) => out.push_str(&templates::lookup_entry(
                        self.file_name,
                        &plan.class,
                        &native.identifier,
                    )),
                    None => out.push_str(templates::LOOKUP_NULL),
                }
            }
        }

        out.push_str(&templates::lookup_end(
            self.assembly_id,
            self.assembly_name,
            self.checksum,
            self.version,
        ));
        out
    }
}

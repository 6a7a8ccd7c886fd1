use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind, TypeOrigin},
    Result,
};

/// A reference to a type defined in another assembly. `TableKind` = 1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeRefRecord {
    /// String heap index of the type name
    pub name: u16,
    /// String heap index of the namespace
    pub namespace: u16,
    /// Resolution scope: an `AssemblyRef` index, or a `TypeRef` index when flagged with `0x8000`
    /// (the enclosing type of a nested reference)
    pub scope: u16,
}

impl TypeRefRecord {
    /// Decoded resolution scope. [`TypeOrigin::Local`] indexes the `AssemblyRef` table.
    #[must_use]
    pub fn resolution_scope(&self) -> Option<TypeOrigin> {
        TypeOrigin::from_raw(self.scope)
    }
}

impl Record for TypeRefRecord {
    const KIND: TableKind = TableKind::TypeRef;
    const SIZE: usize = 8;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        let name = read_le_at::<u16>(data, offset)?;
        let namespace = read_le_at::<u16>(data, offset)?;
        let scope = read_le_at::<u16>(data, offset)?;
        let _pad = read_le_at::<u16>(data, offset)?;

        Ok(TypeRefRecord {
            name,
            namespace,
            scope,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.name);
        push_le(out, self.namespace);
        push_le(out, self.scope);
        push_le(out, 0u16);
    }
}

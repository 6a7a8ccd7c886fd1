use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind},
    Result,
};

/// A reference to a field of an external type. `TableKind` = 2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRefRecord {
    /// String heap index of the field name
    pub name: u16,
    /// `TypeRef` index of the declaring type
    pub container: u16,
    /// Signature heap index
    pub sig: u16,
}

/// A reference to a method of an external type. `TableKind` = 3
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodRefRecord {
    /// String heap index of the method name
    pub name: u16,
    /// `TypeRef` index of the declaring type
    pub container: u16,
    /// Signature heap index
    pub sig: u16,
}

macro_rules! impl_member_ref {
    ($record:ident, $kind:expr) => {
        impl Record for $record {
            const KIND: TableKind = $kind;
            const SIZE: usize = 8;

            fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
                let name = read_le_at::<u16>(data, offset)?;
                let container = read_le_at::<u16>(data, offset)?;
                let sig = read_le_at::<u16>(data, offset)?;
                let _pad = read_le_at::<u16>(data, offset)?;

                Ok($record {
                    name,
                    container,
                    sig,
                })
            }

            fn write(&self, out: &mut Vec<u8>) {
                push_le(out, self.name);
                push_le(out, self.container);
                push_le(out, self.sig);
                push_le(out, 0u16);
            }
        }
    };
}

impl_member_ref!(FieldRefRecord, TableKind::FieldRef);
impl_member_ref!(MethodRefRecord, TableKind::MethodRef);

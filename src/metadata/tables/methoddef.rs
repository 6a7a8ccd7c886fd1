use bitflags::bitflags;

use crate::{
    file::io::{push_le, read_le_at},
    metadata::tables::{Record, TableKind, EMPTY_INDEX},
    Result,
};

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// Flags of a `MethodDef` record
    pub struct MethodDefFlags : u32 {
        /// Member access mask
        const SCOPE_MASK = 0x0000_0007;
        /// Method belongs to the type, not the instance
        const STATIC = 0x0000_0010;
        /// Method cannot be overridden
        const FINAL = 0x0000_0020;
        /// Method is virtual
        const VIRTUAL = 0x0000_0040;
        /// Method hides by name and signature
        const HIDE_BY_SIG = 0x0000_0080;
        /// Method always gets a new vtable slot
        const NEW_SLOT = 0x0000_0100;
        /// Method has no implementation
        const ABSTRACT = 0x0000_0200;
        /// Name is special
        const SPECIAL_NAME = 0x0000_0400;
        /// Method is profiled natively
        const NATIVE_PROFILED = 0x0000_0800;
        /// Instance constructor
        const CONSTRUCTOR = 0x0000_1000;
        /// Type initializer
        const STATIC_CONSTRUCTOR = 0x0000_2000;
        /// Finalizer
        const FINALIZER = 0x0000_4000;
        /// Delegate constructor
        const DELEGATE_CONSTRUCTOR = 0x0001_0000;
        /// Delegate `Invoke`
        const DELEGATE_INVOKE = 0x0002_0000;
        /// Delegate `BeginInvoke`
        const DELEGATE_BEGIN_INVOKE = 0x0004_0000;
        /// Delegate `EndInvoke`
        const DELEGATE_END_INVOKE = 0x0008_0000;
        /// Method is synchronized on its instance
        const SYNCHRONIZED = 0x0100_0000;
        /// Method is synchronized globally
        const GLOBALLY_SYNCHRONIZED = 0x0200_0000;
        /// Method has been patched
        const PATCHED = 0x0400_0000;
        /// Assembly entry point
        const ENTRY_POINT = 0x0800_0000;
        /// Method requires a security object
        const REQUIRE_SEC_OBJECT = 0x1000_0000;
        /// Method carries security information
        const HAS_SECURITY = 0x2000_0000;
        /// Method body has exception handlers
        const HAS_EXCEPTION_HANDLERS = 0x4000_0000;
        /// Method carries custom attributes
        const HAS_ATTRIBUTES = 0x8000_0000;
    }
}

/// A method defined in this assembly. `TableKind` = 6
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodDefRecord {
    /// String heap index of the method name
    pub name: u16,
    /// Byte code offset of the body; [`EMPTY_INDEX`] when the body is supplied natively
    pub rva: u16,
    /// Method flags
    pub flags: MethodDefFlags,
    /// Runtime data type of the return value
    pub ret_val: u8,
    /// Number of arguments, including the implicit instance
    pub num_args: u8,
    /// Number of locals
    pub num_locals: u8,
    /// Maximum evaluation stack depth
    pub length_eval_stack: u8,
    /// Signature heap index of the locals signature
    pub locals: u16,
    /// Signature heap index of the method signature
    pub sig: u16,
}

impl MethodDefRecord {
    /// `true` for static methods.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodDefFlags::STATIC)
    }

    /// `true` for abstract methods.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MethodDefFlags::ABSTRACT)
    }

    /// `true` when the method has managed byte code.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.rva != EMPTY_INDEX
    }
}

impl Record for MethodDefRecord {
    const KIND: TableKind = TableKind::MethodDef;
    const SIZE: usize = 16;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(MethodDefRecord {
            name: read_le_at::<u16>(data, offset)?,
            rva: read_le_at::<u16>(data, offset)?,
            flags: MethodDefFlags::from_bits_retain(read_le_at::<u32>(data, offset)?),
            ret_val: read_le_at::<u8>(data, offset)?,
            num_args: read_le_at::<u8>(data, offset)?,
            num_locals: read_le_at::<u8>(data, offset)?,
            length_eval_stack: read_le_at::<u8>(data, offset)?,
            locals: read_le_at::<u16>(data, offset)?,
            sig: read_le_at::<u16>(data, offset)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.name);
        push_le(out, self.rva);
        push_le(out, self.flags.bits());
        push_le(out, self.ret_val);
        push_le(out, self.num_args);
        push_le(out, self.num_locals);
        push_le(out, self.length_eval_stack);
        push_le(out, self.locals);
        push_le(out, self.sig);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x03, 0x00,                 // name
            0xFF, 0xFF,                 // no body
            0x10, 0x02, 0x00, 0x80,     // static | abstract | has attributes
            0x01, 0x02, 0x00, 0x04,
            0xFF, 0xFF,
            0x09, 0x00,
        ];

        let mut offset = 0;
        let record = MethodDefRecord::read(&data, &mut offset).unwrap();
        assert_eq!(offset, 16);
        assert!(!record.has_body());
        assert!(record.is_static());
        assert!(record.is_abstract());
        assert!(record.flags.contains(MethodDefFlags::HAS_ATTRIBUTES));
        assert_eq!(record.num_args, 2);
        assert_eq!(record.sig, 9);

        let mut out = Vec::new();
        record.write(&mut out);
        assert_eq!(out, data);
    }
}

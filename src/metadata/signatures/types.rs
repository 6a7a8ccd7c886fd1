use strum::{FromRepr, IntoStaticStr};

use crate::metadata::token::Token;

/// Calling convention values carried by the first byte of a signature.
#[allow(non_snake_case)]
pub mod CALLING_CONVENTION {
    /// Mask selecting the signature kind
    pub const KIND_MASK: u8 = 0x0F;
    /// Method signature
    pub const DEFAULT: u8 = 0x00;
    /// Field signature
    pub const FIELD: u8 = 0x06;
    /// Local variable signature
    pub const LOCAL_SIG: u8 = 0x07;
    /// Method takes an implicit instance argument
    pub const HAS_THIS: u8 = 0x20;
}

/// The runtime data types a signature element byte can name.
///
/// The runtime also defines `DATETIME` (13) and `TIMESPAN` (14); neither is decoded by the
/// tooling, so both come out of [`DataType::from_repr`] as `None` and surface as
/// [`ElementType::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum DataType {
    /// No value
    Void = 0,
    /// bool
    Boolean = 1,
    /// signed 8bit integer
    I1 = 2,
    /// unsigned 8bit integer
    U1 = 3,
    /// 16bit character
    Char = 4,
    /// signed 16bit integer
    I2 = 5,
    /// unsigned 16bit integer
    U2 = 6,
    /// signed 32bit integer
    I4 = 7,
    /// unsigned 32bit integer
    U4 = 8,
    /// 32bit floating-point
    R4 = 9,
    /// signed 64bit integer
    I8 = 10,
    /// unsigned 64bit integer
    U8 = 11,
    /// 64bit floating-point
    R8 = 12,
    /// System.String
    String = 15,
    /// System.Object
    Object = 16,
    /// Reference type, followed by a compressed token
    Class = 17,
    /// Value type, followed by a compressed token
    ValueType = 18,
    /// Single dimension zero based array, followed by the element type
    SzArray = 19,
    /// Managed reference, followed by the referenced type
    ByRef = 20,
}

impl DataType {
    /// The tag used in dumps and method identifiers (`I4`, `SZARRAY`, ...).
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.into()
    }
}

/// One decoded signature element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Managed reference to the inner element
    ByRef(Box<ElementType>),
    /// Single dimension array of the inner element
    SzArray(Box<ElementType>),
    /// Value type referenced by token
    ValueType(Token),
    /// Reference type referenced by token
    Class(Token),
    /// An element byte that is not decoded; carries the raw byte
    Unknown(u8),
}

impl ElementType {
    /// The primitive element for a data type that carries no payload.
    ///
    /// Returns `None` for the composite kinds (`CLASS`, `VALUETYPE`, `SZARRAY`, `BYREF`).
    #[must_use]
    pub fn primitive(data_type: DataType) -> Option<ElementType> {
        match data_type {
            DataType::Void => Some(ElementType::Void),
            DataType::Boolean => Some(ElementType::Boolean),
            DataType::Char => Some(ElementType::Char),
            DataType::I1 => Some(ElementType::I1),
            DataType::U1 => Some(ElementType::U1),
            DataType::I2 => Some(ElementType::I2),
            DataType::U2 => Some(ElementType::U2),
            DataType::I4 => Some(ElementType::I4),
            DataType::U4 => Some(ElementType::U4),
            DataType::I8 => Some(ElementType::I8),
            DataType::U8 => Some(ElementType::U8),
            DataType::R4 => Some(ElementType::R4),
            DataType::R8 => Some(ElementType::R8),
            DataType::String => Some(ElementType::String),
            DataType::Object => Some(ElementType::Object),
            DataType::Class | DataType::ValueType | DataType::SzArray | DataType::ByRef => None,
        }
    }

    /// The data type of this element, `None` for [`ElementType::Unknown`].
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ElementType::Void => Some(DataType::Void),
            ElementType::Boolean => Some(DataType::Boolean),
            ElementType::Char => Some(DataType::Char),
            ElementType::I1 => Some(DataType::I1),
            ElementType::U1 => Some(DataType::U1),
            ElementType::I2 => Some(DataType::I2),
            ElementType::U2 => Some(DataType::U2),
            ElementType::I4 => Some(DataType::I4),
            ElementType::U4 => Some(DataType::U4),
            ElementType::I8 => Some(DataType::I8),
            ElementType::U8 => Some(DataType::U8),
            ElementType::R4 => Some(DataType::R4),
            ElementType::R8 => Some(DataType::R8),
            ElementType::String => Some(DataType::String),
            ElementType::Object => Some(DataType::Object),
            ElementType::ByRef(_) => Some(DataType::ByRef),
            ElementType::SzArray(_) => Some(DataType::SzArray),
            ElementType::ValueType(_) => Some(DataType::ValueType),
            ElementType::Class(_) => Some(DataType::Class),
            ElementType::Unknown(_) => None,
        }
    }

    /// The raw element byte.
    #[must_use]
    pub fn opcode(&self) -> u8 {
        match self {
            ElementType::Unknown(byte) => *byte,
            known => known.data_type().map_or(0xFF, |data_type| data_type as u8),
        }
    }

    /// `true` for `VOID`.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, ElementType::Void)
    }
}

/// A decoded method signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Method takes an implicit instance argument
    pub has_this: bool,
    /// The return type
    pub return_type: ElementType,
    /// The declared parameters, in order
    pub params: Vec<ElementType>,
}

/// A decoded field signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSignature {
    /// The field type
    pub base: ElementType,
}

/// A decoded type specification signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpecSignature {
    /// The specified type
    pub base: ElementType,
}

/// Any signature, classified by its calling convention byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// A method signature
    Method(MethodSignature),
    /// A field signature
    Field(FieldSignature),
    /// A local variable signature; its elements are not decoded
    LocalVar,
    /// Any other calling convention byte
    Other(u8),
}

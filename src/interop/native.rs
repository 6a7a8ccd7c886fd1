use strum::IntoStaticStr;

use crate::{
    metadata::{
        assembly::Assembly,
        signatures::{DataType, ElementType},
        tables::TableKind,
        token::Token,
    },
    Result,
};

/// The native representation of a managed scalar.
///
/// Every variant has two spellings: the C++ type the developer's stub sees
/// ([`NativeType::std_name`]) and the suffix of the runtime's marshaling helpers
/// ([`NativeType::native_name`], e.g. `Interop_Marshal_INT32`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum NativeType {
    /// No value
    #[strum(serialize = "void")]
    Void,
    /// bool
    #[strum(serialize = "bool")]
    Bool,
    /// 16bit character
    #[strum(serialize = "CHAR")]
    Char,
    /// signed 8bit integer
    #[strum(serialize = "INT8")]
    Int8,
    /// unsigned 8bit integer
    #[strum(serialize = "UINT8")]
    UInt8,
    /// signed 16bit integer
    #[strum(serialize = "INT16")]
    Int16,
    /// unsigned 16bit integer
    #[strum(serialize = "UINT16")]
    UInt16,
    /// signed 32bit integer
    #[strum(serialize = "INT32")]
    Int32,
    /// unsigned 32bit integer
    #[strum(serialize = "UINT32")]
    UInt32,
    /// signed 64bit integer
    #[strum(serialize = "INT64")]
    Int64,
    /// unsigned 64bit integer
    #[strum(serialize = "UINT64")]
    UInt64,
    /// 32bit floating-point
    #[strum(serialize = "float")]
    Float,
    /// 64bit floating-point
    #[strum(serialize = "double")]
    Double,
    /// NUL-terminated string
    #[strum(serialize = "LPCSTR")]
    String,
    /// Anything the marshaling helpers cannot carry
    #[strum(serialize = "UNSUPPORTED_TYPE")]
    Unsupported,
}

impl NativeType {
    /// Maps a runtime data type. Objects, classes and composites are unsupported.
    #[must_use]
    pub fn from_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Void => NativeType::Void,
            DataType::Boolean => NativeType::Bool,
            DataType::Char => NativeType::Char,
            DataType::I1 => NativeType::Int8,
            DataType::U1 => NativeType::UInt8,
            DataType::I2 => NativeType::Int16,
            DataType::U2 => NativeType::UInt16,
            DataType::I4 => NativeType::Int32,
            DataType::U4 => NativeType::UInt32,
            DataType::I8 => NativeType::Int64,
            DataType::U8 => NativeType::UInt64,
            DataType::R4 => NativeType::Float,
            DataType::R8 => NativeType::Double,
            DataType::String => NativeType::String,
            DataType::Object
            | DataType::Class
            | DataType::ValueType
            | DataType::SzArray
            | DataType::ByRef => NativeType::Unsupported,
        }
    }

    /// The C++ type used in stub declarations.
    #[must_use]
    pub fn std_name(self) -> &'static str {
        match self {
            NativeType::Void => "void",
            NativeType::Bool => "bool",
            NativeType::Char => "char",
            NativeType::Int8 => "int8_t",
            NativeType::UInt8 => "uint8_t",
            NativeType::Int16 => "int16_t",
            NativeType::UInt16 => "uint16_t",
            NativeType::Int32 => "int32_t",
            NativeType::UInt32 => "uint32_t",
            NativeType::Int64 => "int64_t",
            NativeType::UInt64 => "uint64_t",
            NativeType::Float => "float",
            NativeType::Double => "double",
            NativeType::String => "const char*",
            NativeType::Unsupported => "UNSUPPORTED_TYPE",
        }
    }

    /// The suffix of the runtime's marshaling helpers.
    #[must_use]
    pub fn native_name(self) -> &'static str {
        self.into()
    }

    /// `true` for [`NativeType::Void`].
    #[must_use]
    pub fn is_void(self) -> bool {
        self == NativeType::Void
    }
}

/// How one argument or return value crosses the managed/native boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marshaled {
    /// Passed by value
    Value(NativeType),
    /// Passed by reference, written back after the call
    ByRef(NativeType),
    /// A typed array referencing managed memory
    Array(NativeType),
}

impl Marshaled {
    /// Classifies a decoded signature element.
    ///
    /// Value types defined in this assembly marshal as the data type recorded on their
    /// `TypeDef` (an enum over `I4` marshals as `INT32`). A reference or array whose element
    /// is itself unsupported collapses to an unsupported value.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if a referenced `TypeDef` does not exist.
    pub fn classify(assembly: &Assembly, element: &ElementType) -> Result<Self> {
        let wrapped = match element {
            ElementType::ByRef(inner) => Some((true, scalar(assembly, inner)?)),
            ElementType::SzArray(inner) => Some((false, scalar(assembly, inner)?)),
            _ => None,
        };

        Ok(match wrapped {
            Some((_, NativeType::Unsupported)) => Marshaled::Value(NativeType::Unsupported),
            Some((true, native)) => Marshaled::ByRef(native),
            Some((false, native)) => Marshaled::Array(native),
            None => Marshaled::Value(scalar(assembly, element)?),
        })
    }

    /// The type of a return value.
    ///
    /// The runtime only sets scalar results, so a returned reference or array is
    /// [`NativeType::Unsupported`].
    #[must_use]
    pub fn return_type(self) -> NativeType {
        match self {
            Marshaled::Value(native) => native,
            Marshaled::ByRef(_) | Marshaled::Array(_) => NativeType::Unsupported,
        }
    }

    /// The C++ type of a stub parameter.
    #[must_use]
    pub fn variable_decl(self) -> String {
        match self {
            Marshaled::Value(native) => native.std_name().to_string(),
            Marshaled::ByRef(native) => format!("{}&", native.std_name()),
            Marshaled::Array(native) => format!("CLR_RT_TypedArray_{}", native.native_name()),
        }
    }

    /// The argument passed to the stub for `param{param}`; references are dereferenced.
    #[must_use]
    pub fn call_arg(self, param: usize) -> String {
        match self {
            Marshaled::ByRef(_) => format!("*param{param}"),
            Marshaled::Value(_) | Marshaled::Array(_) => format!("param{param}"),
        }
    }

    /// Code that declares `param{param}` and fills it from stack slot `slot`.
    #[must_use]
    pub fn marshal_in(self, param: usize, slot: usize) -> String {
        match self {
            Marshaled::Value(native) => format!(
                "        {std} param{param};\n        NANOCLR_CHECK_HRESULT( Interop_Marshal_{suffix}( stack, {slot}, param{param} ) );\n",
                std = native.std_name(),
                suffix = native.native_name(),
            ),
            Marshaled::ByRef(native) => format!(
                "        {std}* param{param};\n        uint8_t heapblock{param}[CLR_RT_HEAP_BLOCK_SIZE];\n        NANOCLR_CHECK_HRESULT( Interop_Marshal_{suffix}_ByRef( stack, heapblock{param}, {slot}, param{param} ) );\n",
                std = native.std_name(),
                suffix = native.native_name(),
            ),
            Marshaled::Array(native) => format!(
                "        CLR_RT_TypedArray_{suffix} param{param};\n        NANOCLR_CHECK_HRESULT( Interop_Marshal_{suffix}_ARRAY( stack, {slot}, param{param} ) );\n",
                suffix = native.native_name(),
            ),
        }
    }

    /// Code run after the native call; only references are written back.
    #[must_use]
    pub fn marshal_out(self, param: usize, slot: usize) -> String {
        match self {
            Marshaled::ByRef(_) => format!(
                "        NANOCLR_CHECK_HRESULT( Interop_Marshal_StoreRef( stack, heapblock{param}, {slot} ) );\n"
            ),
            Marshaled::Value(_) | Marshaled::Array(_) => String::new(),
        }
    }
}

fn scalar(assembly: &Assembly, element: &ElementType) -> Result<NativeType> {
    match element {
        ElementType::ValueType(token) => value_type(assembly, *token),
        ElementType::Unknown(_) => Ok(NativeType::Unsupported),
        other => Ok(other
            .data_type()
            .map_or(NativeType::Unsupported, NativeType::from_data_type)),
    }
}

fn value_type(assembly: &Assembly, token: Token) -> Result<NativeType> {
    if token.table() != Some(TableKind::TypeDef) {
        return Ok(NativeType::Unsupported);
    }

    let type_def = assembly.type_def(token.index() as usize)?;
    Ok(DataType::from_repr(type_def.data_type)
        .map_or(NativeType::Unsupported, NativeType::from_data_type))
}

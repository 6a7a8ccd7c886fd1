use crate::{
    file::parser::Parser,
    metadata::signatures::{
        DataType, ElementType, FieldSignature, MethodSignature, Signature, TypeSpecSignature,
        CALLING_CONVENTION,
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth of `BYREF` / `SZARRAY` elements
const MAX_RECURSION_DEPTH: usize = 50;

/// Decodes one element starting at `pos`.
///
/// Returns the element and the position just past it. Composite kinds recurse into their inner
/// element (`BYREF`, `SZARRAY`) or read one compressed token (`CLASS`, `VALUETYPE`); nothing
/// beyond what the element requires is read. A byte that names no decodable kind comes back as
/// [`ElementType::Unknown`] and consumes only that byte.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] on truncated input or
/// [`crate::Error::RecursionLimit`] for pathologically nested elements.
///
/// # Example
///
/// ```rust
/// use nanometa::metadata::signatures::{decode_element, ElementType};
///
/// // SZARRAY of STRING, then I4
/// let data = [0x13, 0x0F, 0x07];
/// let (element, pos) = decode_element(&data, 0)?;
/// assert_eq!(element, ElementType::SzArray(Box::new(ElementType::String)));
/// assert_eq!(pos, 2);
///
/// let (element, pos) = decode_element(&data, pos)?;
/// assert_eq!(element, ElementType::I4);
/// assert_eq!(pos, 3);
/// # Ok::<(), nanometa::Error>(())
/// ```
pub fn decode_element(data: &[u8], pos: usize) -> Result<(ElementType, usize)> {
    let mut parser = SignatureParser::new_at(data, pos)?;
    let element = parser.parse_element()?;
    Ok((element, parser.pos()))
}

/// Signature parser for the compressed signature heap.
///
/// # Example
///
/// ```rust
/// use nanometa::metadata::signatures::{ElementType, SignatureParser};
///
/// // instance BOOLEAN (I4, STRING[])
/// let data = [0x20, 0x02, 0x01, 0x07, 0x13, 0x0F];
/// let mut parser = SignatureParser::new(&data);
/// let sig = parser.parse_method_signature()?;
///
/// assert!(sig.has_this);
/// assert_eq!(sig.return_type, ElementType::Boolean);
/// assert_eq!(sig.params.len(), 2);
/// # Ok::<(), nanometa::Error>(())
/// ```
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` at the start of `data`
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
        }
    }

    /// Create a new `SignatureParser` positioned at `pos`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` lies beyond the end of `data`.
    pub fn new_at(data: &'a [u8], pos: usize) -> Result<Self> {
        Ok(SignatureParser {
            parser: Parser::new_at(data, pos)?,
            depth: 0,
        })
    }

    /// Current position within the data.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.parser.pos()
    }

    /// Parse a single element.
    ///
    /// # Errors
    /// Returns an error on truncated input or excessive nesting.
    pub fn parse_element(&mut self) -> Result<ElementType> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let opcode = self.parser.read_le::<u8>()?;
        let element = match DataType::from_repr(opcode) {
            Some(DataType::ByRef) => ElementType::ByRef(Box::new(self.parse_element()?)),
            Some(DataType::SzArray) => ElementType::SzArray(Box::new(self.parse_element()?)),
            Some(DataType::ValueType) => {
                ElementType::ValueType(self.parser.read_compressed_token()?)
            }
            Some(DataType::Class) => ElementType::Class(self.parser.read_compressed_token()?),
            Some(data_type) => {
                ElementType::primitive(data_type).unwrap_or(ElementType::Unknown(opcode))
            }
            None => ElementType::Unknown(opcode),
        };

        self.depth -= 1;
        Ok(element)
    }

    /// Parse a method signature: calling convention, a one byte parameter count `N`, then the
    /// return type followed by `N` parameters.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the calling convention is not a method
    /// convention, or an error if an element cannot be decoded.
    pub fn parse_method_signature(&mut self) -> Result<MethodSignature> {
        let convention = self.parser.read_le::<u8>()?;
        if convention & CALLING_CONVENTION::KIND_MASK != CALLING_CONVENTION::DEFAULT {
            return Err(malformed_error!(
                "MethodSignature - invalid calling convention - {}",
                convention
            ));
        }

        self.parse_method_body(convention)
    }

    fn parse_method_body(&mut self, convention: u8) -> Result<MethodSignature> {
        let param_count = self.parser.read_le::<u8>()?;
        let return_type = self.parse_element()?;

        let mut params = Vec::with_capacity(usize::from(param_count));
        for _ in 0..param_count {
            params.push(self.parse_element()?);
        }

        Ok(MethodSignature {
            has_this: convention & CALLING_CONVENTION::HAS_THIS != 0,
            return_type,
            params,
        })
    }

    /// Parse a field signature: the field calling convention followed by one element.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the signature does not start with the field
    /// convention, or an error if the element cannot be decoded.
    pub fn parse_field_signature(&mut self) -> Result<FieldSignature> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte & CALLING_CONVENTION::KIND_MASK != CALLING_CONVENTION::FIELD {
            return Err(malformed_error!(
                "FieldSignature - invalid start - {}",
                head_byte
            ));
        }

        Ok(FieldSignature {
            base: self.parse_element()?,
        })
    }

    /// Parse a type specification signature: a single element without a convention byte.
    ///
    /// # Errors
    /// Returns an error if the element cannot be decoded.
    pub fn parse_type_spec_signature(&mut self) -> Result<TypeSpecSignature> {
        Ok(TypeSpecSignature {
            base: self.parse_element()?,
        })
    }

    /// Parse whichever signature the calling convention byte announces.
    ///
    /// # Errors
    /// Returns an error if the announced signature cannot be decoded.
    pub fn parse_signature(&mut self) -> Result<Signature> {
        let convention = self.parser.peek_byte()?;

        match convention & CALLING_CONVENTION::KIND_MASK {
            CALLING_CONVENTION::DEFAULT => {
                self.parser.advance()?;
                Ok(Signature::Method(self.parse_method_body(convention)?))
            }
            CALLING_CONVENTION::FIELD => Ok(Signature::Field(self.parse_field_signature()?)),
            CALLING_CONVENTION::LOCAL_SIG => {
                self.parser.advance()?;
                Ok(Signature::LocalVar)
            }
            _ => {
                self.parser.advance()?;
                Ok(Signature::Other(convention))
            }
        }
    }
}

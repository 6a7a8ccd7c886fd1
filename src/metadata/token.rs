use std::fmt;
use std::hash::{Hash, Hasher};

use crate::metadata::tables::TableKind;

/// A metadata token: a table kind and a zero-based index packed into one 32-bit value.
///
/// - The high byte (bits 24-31) holds the table id (the [`TableKind`] discriminant)
/// - The low 24 bits (bits 0-23) hold the index within that table
///
/// Tokens decoded from signatures may carry the table id `0xFF` (the fourth, unassigned
/// compressed-token tag); [`Token::table`] returns `None` for those.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Packs a table kind and index into a token. Index bits above 24 are discarded.
    #[must_use]
    pub fn encode(kind: TableKind, index: u32) -> Self {
        Token(((kind as u32) << 24) | (index & 0x00FF_FFFF))
    }

    /// Splits the token into its table kind and index.
    ///
    /// Returns `None` when the high byte is not a known table id.
    #[must_use]
    pub fn decode(&self) -> Option<(TableKind, u32)> {
        self.table().map(|kind| (kind, self.index()))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the raw table id from the token (high byte)
    #[must_use]
    pub fn table_id(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Resolves the table id to a [`TableKind`]
    #[must_use]
    pub fn table(&self) -> Option<TableKind> {
        TableKind::from_repr(self.table_id())
    }

    /// Extracts the index from the token (low 24 bits)
    #[must_use]
    pub fn index(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns `true` if the token refers to `kind`
    #[must_use]
    pub fn is_table(&self, kind: TableKind) -> bool {
        self.table_id() == kind as u8
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, index: {})",
            self.0,
            self.table_id(),
            self.index()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

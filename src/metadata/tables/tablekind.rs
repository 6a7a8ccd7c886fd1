use strum::{EnumCount, EnumIter, FromRepr};

/// Identifiers of the sixteen regions of an assembly image.
///
/// The discriminant is both the region's slot in the header's table-offset array and the table
/// id carried in the high byte of a [`crate::metadata::token::Token`]. The order is part of the
/// binary contract with the runtime and must never change.
///
/// The first nine kinds are fixed-size record tables; `ResourcesData`, `Strings`, `Signatures`
/// and `ByteCode` are byte heaps; `EndOfAssembly` only marks the end of the image.
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, FromRepr, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TableKind {
    /// References to other assemblies (name and version)
    AssemblyRef = 0,
    /// References to types defined in other assemblies
    TypeRef = 1,
    /// References to fields of external types
    FieldRef = 2,
    /// References to methods of external types
    MethodRef = 3,
    /// Types defined in this assembly
    TypeDef = 4,
    /// Fields defined in this assembly
    FieldDef = 5,
    /// Methods defined in this assembly
    MethodDef = 6,
    /// Custom attribute applications
    Attributes = 7,
    /// Type specifications (constructed types referenced from signatures)
    TypeSpec = 8,
    /// Embedded resource descriptors
    Resources = 9,
    /// Raw resource payload bytes
    ResourcesData = 10,
    /// The string heap
    Strings = 11,
    /// The compressed signature heap
    Signatures = 12,
    /// Method bodies
    ByteCode = 13,
    /// Resource file descriptors
    ResourcesFiles = 14,
    /// End marker; its start offset is the total image size
    EndOfAssembly = 15,
}

impl TableKind {
    /// Size in bytes of one record of this kind, or `None` for heaps and the end marker.
    #[must_use]
    pub fn record_size(self) -> Option<usize> {
        match self {
            TableKind::AssemblyRef => Some(12),
            TableKind::TypeRef
            | TableKind::FieldRef
            | TableKind::MethodRef
            | TableKind::FieldDef
            | TableKind::Attributes
            | TableKind::Resources
            | TableKind::ResourcesFiles => Some(8),
            TableKind::TypeDef => Some(24),
            TableKind::MethodDef => Some(16),
            TableKind::TypeSpec => Some(4),
            TableKind::ResourcesData
            | TableKind::Strings
            | TableKind::Signatures
            | TableKind::ByteCode
            | TableKind::EndOfAssembly => None,
        }
    }
}

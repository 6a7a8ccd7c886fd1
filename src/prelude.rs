//! # nanometa Prelude
//!
//! The types most callers need, in one import:
//!
//! ```rust,no_run
//! use nanometa::prelude::*;
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all nanometa operations
pub use crate::Error;

/// The result type used throughout nanometa
pub use crate::Result;

// ================================================================================================
// Images
// ================================================================================================

/// A loaded assembly image and the layout hook for external base types
pub use crate::metadata::assembly::{Assembly, BaseLayout, ObjectLayout};

/// Building images in the runtime layout
pub use crate::metadata::builder::{
    AssemblyBuilder, FieldDefBuilder, MethodDefBuilder, TypeDefBuilder,
};

/// Header types
pub use crate::metadata::header::{AssemblyHeader, Version};

/// Table records and their kinds
pub use crate::metadata::tables::{
    FieldDefFlags, FieldDefRecord, MethodDefFlags, MethodDefRecord, Record, TableKind,
    TypeDefFlags, TypeDefRecord, EMPTY_INDEX, TYPEREF_FLAG,
};

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

// ================================================================================================
// Signatures
// ================================================================================================

/// Decoded signatures and their parsers
pub use crate::metadata::signatures::{
    decode_element, parse_field_signature, parse_method_signature, parse_signature, DataType,
    ElementType, FieldSignature, MethodSignature, Signature, SignatureParser,
};

// ================================================================================================
// Naming
// ================================================================================================

/// Class names and method identifiers
pub use crate::naming::{
    class_name, fix_identifier, method_identifier, MethodNamer, NamingPolicy, RenderMode,
};

// ================================================================================================
// Interop Generation
// ================================================================================================

/// Skeleton generation
pub use crate::interop::{
    Artifact, ArtifactKind, ArtifactSink, FsSink, GenerationMode, GenerationReport,
    GeneratorOptions, MemorySink, Skeleton, SkeletonGenerator,
};

// ================================================================================================
// Dump
// ================================================================================================

/// The diagnostic table dump
pub use crate::dump::dump_assembly;

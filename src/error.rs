use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The generator runs against trusted, already-compiled images. Most variants therefore
/// describe a *precondition violation* (a truncated image, an index outside its table, a token
/// pointing into the wrong table). These abort the current run; there is no attempt to
/// recover from them.
///
/// Two failure classes are deliberately **not** represented here:
/// - naming anomalies (a field or method name carrying compiler-reserved characters) are
///   recovered locally by the name synthesizer and surface as diagnostics in the generated text
/// - failure to create a single output artifact is reported through
///   [`crate::interop::GenerationReport`] while the remaining artifacts are still produced
///
/// # Examples
///
/// ```rust,no_run
/// use nanometa::{Error, metadata::assembly::Assembly};
/// use std::path::Path;
///
/// match Assembly::from_file(Path::new("Acme.Widgets.pe")) {
///     Ok(assembly) => println!("Loaded {}", assembly.name().as_deref().unwrap_or("?")),
///     Err(Error::NotSupported) => eprintln!("Not an assembly image"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed image: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The image is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading the image.
    ///
    /// Raised for truncated images and for table indices beyond the declared element count.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The input does not carry the assembly marker this library understands.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// A token referenced a table that is not valid in its context.
    ///
    /// For example a signature `VALUETYPE` token that points at a `MethodDef`.
    #[error("Unexpected token in this context - {0}")]
    UnexpectedToken(Token),

    /// Recursion limit reached.
    ///
    /// Signature decoding and enclosing-type resolution recurse; a maximum depth is enforced
    /// so a cyclic or corrupted image cannot overflow the stack.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to create or finalize a memory-mapped output file.
    #[error("Memory mapped output failed - {message}")]
    WriteMmapFailed {
        /// Description of the failing step
        message: String,
    },
}

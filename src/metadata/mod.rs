//! Assembly images: header, tables, heaps and signatures.
//!
//! This module contains everything needed to read an image and to assemble one:
//!
//! - [`assembly`] - the loaded image with bounds-checked accessors per table kind
//! - [`header`] - the fixed 124-byte header and its integrity values
//! - [`tables`] - the record layouts of the fixed-size tables
//! - [`streams`] - the string and signature heaps
//! - [`signatures`] - decoding and encoding of compressed signatures
//! - [`token`] - packed (table, index) references
//! - [`builder`] - writes images in the runtime layout
//!
//! # Examples
//!
//! ```rust,no_run
//! use nanometa::metadata::{assembly::Assembly, signatures::parse_method_signature};
//!
//! let assembly = Assembly::from_file("Acme.Gadgets.pe".as_ref())?;
//!
//! for index in 0..assembly.method_def_count() {
//!     let method = assembly.method_def(index)?;
//!     let signature = parse_method_signature(assembly.signature(method.sig)?)?;
//!     println!("{} takes {} argument(s)", assembly.string(method.name)?, signature.params.len());
//! }
//! # Ok::<(), nanometa::Error>(())
//! ```

/// The loaded assembly image
pub mod assembly;
/// Image assembly for tests and fixtures
pub mod builder;
/// The assembly header
pub mod header;
/// Compressed signature decoding and encoding
pub mod signatures;
/// The string and signature heaps
pub mod streams;
/// Record tables
pub mod tables;
/// Metadata tokens
pub mod token;

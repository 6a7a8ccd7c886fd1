//! Byte-level access to assembly images and generated output.
//!
//! This module holds the small set of binary primitives everything else is built on:
//!
//! - [`io`] - bounds-checked little-endian reads and writes of primitive values
//! - [`parser`] - a cursor over a byte slice with the compressed-integer and
//!   compressed-token decoders the signature heap needs
//! - [`output`] - a memory-mapped output file that is removed again unless it is finalized,
//!   used to persist an image after its header has been updated
//!
//! Nothing in here knows about tables or signatures; those live in [`crate::metadata`].

pub mod io;
pub mod output;
pub mod parser;

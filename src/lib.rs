// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # nanometa
//!
//! Offline tooling for the compact assembly images executed by embedded managed runtimes
//! (the trimmed `NFMRK1` metadata format: type/method/field tables, a string heap and a
//! compressed signature heap).
//!
//! `nanometa` does two things with an image:
//!
//! - **Dump** - render every table entry and every decoded signature as text, addressed by
//!   token index and by byte offset inside the image ([`dump`]).
//! - **Interop skeleton generation** - derive everything the native side of the runtime needs
//!   for methods that have no managed body ([`interop`]): deterministic collision-free method
//!   identifiers, the positional native-method lookup table the interpreter dispatches through,
//!   argument marshaling glue, developer stubs, a CMake module, and the checksum that binds the
//!   managed declarations to the compiled native implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nanometa::prelude::*;
//! use std::path::Path;
//!
//! let mut assembly = Assembly::from_file(Path::new("Acme.Widgets.pe"))?;
//!
//! // Diagnostic dump
//! let mut text = String::new();
//! nanometa::dump::dump_assembly(&assembly, &mut text)?;
//!
//! // Native skeleton
//! let options = GeneratorOptions::new("out/Acme_Widgets").project_name("Acme.Widgets");
//! let mut sink = FsSink::new();
//! let report = SkeletonGenerator::new(&options).generate(&mut assembly, &mut sink)?;
//! println!("checksum 0x{:08X}, {} artifact(s) skipped", report.checksum, report.skipped.len());
//!
//! // The native checksum and CRCs were written back into the header
//! assembly.to_file(Path::new("Acme.Widgets.pe"))?;
//! # Ok::<(), nanometa::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - bounds-checked little-endian I/O, a cursor parser, memory-mapped output
//! - [`metadata`] - header, table records, tokens, string heap, signature decoder, image builder
//! - [`naming`] - qualified class names and method identifier synthesis
//! - [`interop`] - eligibility, marshaling, lookup table, checksum and artifact emission
//! - [`dump`] - the diagnostic table dump
//! - [`Error`] and [`Result`] - error handling

#[macro_use]
pub(crate) mod error;

pub mod dump;
pub mod file;
pub mod interop;
pub mod metadata;
pub mod naming;
pub mod prelude;
pub mod utils;

pub use error::Error;
pub use file::parser::Parser;

/// `nanometa` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`crate::Error`]. Used consistently throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

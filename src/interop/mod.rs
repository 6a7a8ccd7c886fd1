//! Native interop skeleton generation.
//!
//! Methods declared in managed code without a body (no RVA, not abstract) are implemented by
//! the runtime in native code. The interpreter finds those implementations through a lookup
//! table indexed by `MethodDef` position, and refuses to bind an assembly whose declared native
//! surface does not match the checksum compiled into that table. This module derives both
//! from an [`crate::metadata::assembly::Assembly`], along with everything around them:
//!
//! - `<path>.h` - one `Library_<file>_<class>` struct per eligible type with static field
//!   indices, instance field offsets and `NANOCLR_NATIVE_DECLARE` lines
//! - `<path>.cpp` - the positional handler table (`NULL` for managed methods), the checksum and
//!   the version quad
//! - `<path>_<class>_mshl.cpp` - marshaling glue moving arguments between the interpreter stack
//!   and the developer's stub (interop modules only)
//! - `<path>_<class>.h` / `.cpp` - developer stubs to copy and fill in (interop modules), or
//!   "not implemented" bodies (class libraries)
//! - `FindINTEROP-<assembly>.cmake` - the build descriptor listing the sources
//!
//! Every native method gets an identifier that encodes its signature (see
//! [`crate::naming::method_identifier`]); the same identifiers feed the header, the lookup
//! table, the marshaling code and the checksum, computed once per type.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nanometa::interop::{FsSink, GenerationMode, GeneratorOptions, SkeletonGenerator};
//! use nanometa::metadata::assembly::Assembly;
//! use std::path::Path;
//!
//! let mut assembly = Assembly::from_file(Path::new("Acme.Widgets.pe"))?;
//! let options = GeneratorOptions::new("native/Acme_Widgets")
//!     .project_name("Acme.Widgets")
//!     .mode(GenerationMode::Interop);
//!
//! let report = SkeletonGenerator::new(&options).generate(&mut assembly, &mut FsSink::new())?;
//! for skipped in &report.skipped {
//!     eprintln!("could not write {}: {}", skipped.path.display(), skipped.reason);
//! }
//! assembly.to_file(Path::new("Acme.Widgets.pe"))?;
//! # Ok::<(), nanometa::Error>(())
//! ```

mod cmake;
mod eligibility;
mod generator;
mod header;
mod lookup;
mod native;
mod options;
mod plan;
mod sink;
mod stubs;
mod templates;

pub use eligibility::{is_eligible_method, is_eligible_type};
pub use generator::{GenerationReport, Skeleton, SkeletonGenerator, SkippedArtifact};
pub use native::{Marshaled, NativeType};
pub use options::{GenerationMode, GeneratorOptions};
pub use sink::{Artifact, ArtifactKind, ArtifactSink, FsSink, MemorySink};

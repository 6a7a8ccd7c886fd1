use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    interop::{
        cmake::render_build_module,
        header::render_header,
        lookup::{native_checksum, LookupTable},
        plan::{plan_types, TypePlan},
        sink::{suffixed, Artifact, ArtifactKind, ArtifactSink},
        stubs::StubContext,
        templates, GenerationMode, GeneratorOptions,
    },
    metadata::assembly::Assembly,
    naming::header_guard,
    Result,
};

/// The rendered skeleton of one assembly, before anything is written.
#[derive(Clone, Debug)]
pub struct Skeleton {
    /// The native methods checksum the lookup table was rendered with
    pub checksum: u32,
    /// Every artifact, in emission order
    pub artifacts: Vec<Artifact>,
}

impl Skeleton {
    /// The first artifact of `kind`.
    #[must_use]
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.kind == kind)
    }
}

/// An artifact the sink refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedArtifact {
    /// The destination that failed
    pub path: PathBuf,
    /// The sink's error, rendered
    pub reason: String,
}

/// Outcome of [`SkeletonGenerator::generate`].
#[derive(Clone, Debug, Default)]
pub struct GenerationReport {
    /// The native methods checksum written into the header
    pub checksum: u32,
    /// Artifacts written successfully, in order
    pub written: Vec<PathBuf>,
    /// Artifacts that could not be written
    pub skipped: Vec<SkippedArtifact>,
}

/// Generates the native skeleton of an assembly.
///
/// Rendering is a pure function of the image and the options: identical inputs always produce
/// byte-identical artifacts and the same checksum.
///
/// # Examples
///
/// ```rust
/// use nanometa::interop::{ArtifactKind, GeneratorOptions, MemorySink, SkeletonGenerator};
/// use nanometa::metadata::{
///     assembly::Assembly,
///     builder::{AssemblyBuilder, MethodDefBuilder, TypeDefBuilder},
///     header::Version,
///     signatures::{ElementType, MethodSignature},
/// };
///
/// let mut builder = AssemblyBuilder::new("Acme", Version::new(1, 0, 0, 0));
/// let signature = MethodSignature { has_this: false, return_type: ElementType::Void, params: vec![] };
/// builder.type_def(
///     TypeDefBuilder::new("Acme", "Gadget").method(MethodDefBuilder::native("Reset", signature)),
/// )?;
/// let mut assembly = Assembly::from_mem(builder.build()?)?;
///
/// let options = GeneratorOptions::new("Acme");
/// let mut sink = MemorySink::new();
/// let report = SkeletonGenerator::new(&options).generate(&mut assembly, &mut sink)?;
///
/// assert!(report.skipped.is_empty());
/// assert_eq!(assembly.native_checksum(), report.checksum);
/// assert!(sink.get("Acme.cpp").unwrap().contains("Library_Acme_Acme_Gadget::Reset___STATIC__VOID,"));
/// # Ok::<(), nanometa::Error>(())
/// ```
pub struct SkeletonGenerator<'a> {
    options: &'a GeneratorOptions,
}

impl<'a> SkeletonGenerator<'a> {
    /// Creates a generator for `options`.
    #[must_use]
    pub fn new(options: &'a GeneratorOptions) -> Self {
        SkeletonGenerator { options }
    }

    /// Renders every artifact without writing anything or touching the image.
    ///
    /// # Errors
    /// Returns an error if the output path has no file name, the assembly name does not
    /// resolve, or a table index, name or signature the skeleton depends on is malformed.
    pub fn render(&self, assembly: &Assembly) -> Result<Skeleton> {
        let options = self.options;
        let mode = options.generation_mode();
        let policy = options.policy();
        let file_name = options.file_name()?;
        let prefix = options.prefix()?;
        let assembly_name = assembly
            .name()
            .ok_or_else(|| malformed_error!("assembly name does not resolve"))?
            .to_string();
        let assembly_id = assembly_name.replace('.', "_");

        let plans = plan_types(assembly, policy, options.is_parallel())?;
        let checksum = native_checksum(&plans, &assembly_name);

        let header_path = suffixed(&prefix, ".h");
        let header = render_header(
            assembly,
            &plans,
            mode,
            &file_name,
            &header_guard(&header_path),
            &assembly_id,
        )?;

        let project = options.project()?;
        let (lookup_include, banner, version) = match mode {
            GenerationMode::Interop => {
                let version = assembly.version();
                (
                    format!("{file_name}.h"),
                    Some(templates::DO_NOT_EDIT_BANNER),
                    [version.major, version.minor, version.build, version.revision],
                )
            }
            GenerationMode::CoreLibrary => (format!("{project}.h"), None, [0; 4]),
        };
        let lookup = LookupTable {
            banner,
            include: &lookup_include,
            file_name: &file_name,
            assembly_id: &assembly_id,
            assembly_name: &assembly_name,
            checksum,
            version,
        }
        .render(&plans);

        let mut artifacts = vec![
            Artifact::new(ArtifactKind::Header, header_path, header),
            Artifact::new(ArtifactKind::Lookup, suffixed(&prefix, ".cpp"), lookup),
        ];

        let context = StubContext {
            assembly,
            prefix: &prefix,
            file_name: &file_name,
            policy,
        };
        let native_types: Vec<&TypePlan> =
            plans.iter().filter(|plan| plan.has_native_methods()).collect();

        match mode {
            GenerationMode::Interop => {
                let per_type: Vec<Vec<Artifact>> = if options.is_parallel() {
                    native_types
                        .par_iter()
                        .map(|plan| context.interop_artifacts(plan))
                        .collect::<Result<_>>()?
                } else {
                    native_types
                        .iter()
                        .map(|plan| context.interop_artifacts(plan))
                        .collect::<Result<_>>()?
                };
                artifacts.extend(per_type.into_iter().flatten());

                let sources: Vec<String> = artifacts
                    .iter()
                    .filter(|artifact| {
                        matches!(
                            artifact.kind,
                            ArtifactKind::Lookup | ArtifactKind::Marshal | ArtifactKind::StubSource
                        )
                    })
                    .map(Artifact::file_name)
                    .collect();
                let module_path = match prefix.parent() {
                    Some(parent) => parent.join(format!("FindINTEROP-{assembly_name}.cmake")),
                    None => PathBuf::from(format!("FindINTEROP-{assembly_name}.cmake")),
                };
                artifacts.push(Artifact::new(
                    ArtifactKind::BuildModule,
                    module_path,
                    render_build_module(&assembly_name, &sources),
                ));
            }
            GenerationMode::CoreLibrary => {
                artifacts.extend(
                    native_types
                        .iter()
                        .map(|plan| context.library_artifact(plan, &project)),
                );
            }
        }

        Ok(Skeleton {
            checksum,
            artifacts,
        })
    }

    /// Renders the skeleton, writes every artifact through `sink` and stores the checksum and
    /// the recomputed CRCs in the assembly header.
    ///
    /// A sink failure skips that one artifact; it is logged and listed in the report while the
    /// remaining artifacts are still written.
    ///
    /// # Errors
    /// Returns the errors of [`SkeletonGenerator::render`], in which case nothing is written,
    /// or an error if the image is too short for its CRCs to be recomputed.
    pub fn generate(
        &self,
        assembly: &mut Assembly,
        sink: &mut dyn ArtifactSink,
    ) -> Result<GenerationReport> {
        let skeleton = self.render(assembly)?;

        let mut report = GenerationReport {
            checksum: skeleton.checksum,
            ..GenerationReport::default()
        };

        for artifact in &skeleton.artifacts {
            match sink.write_artifact(&artifact.path, &artifact.contents) {
                Ok(()) => {
                    debug!(path = %artifact.path.display(), kind = ?artifact.kind, "wrote artifact");
                    report.written.push(artifact.path.clone());
                }
                Err(error) => {
                    warn!(path = %artifact.path.display(), %error, "skipping artifact");
                    report.skipped.push(SkippedArtifact {
                        path: artifact.path.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        assembly.set_native_checksum(skeleton.checksum);
        assembly.update_crcs()?;

        info!(
            checksum = skeleton.checksum,
            written = report.written.len(),
            skipped = report.skipped.len(),
            "generated native skeleton"
        );

        Ok(report)
    }
}

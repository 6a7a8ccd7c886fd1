use std::{
    collections::BTreeMap,
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::Result;

/// The role of a generated file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// `<path>.h`, the struct declarations
    Header,
    /// `<path>.cpp`, the native method lookup table
    Lookup,
    /// `<path>_<type>_mshl.cpp`, marshaling glue
    Marshal,
    /// `<path>_<type>.h`, developer stub declarations
    StubHeader,
    /// `<path>_<type>.cpp`, developer stub definitions
    StubSource,
    /// `<path>_<type>.cpp` of a class library
    LibrarySource,
    /// `FindINTEROP-<assembly>.cmake`
    BuildModule,
}

/// One rendered output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// What the file is
    pub kind: ArtifactKind,
    /// Where it goes
    pub path: PathBuf,
    /// The complete file contents
    pub contents: String,
}

impl Artifact {
    /// Creates a new artifact.
    #[must_use]
    pub fn new(kind: ArtifactKind, path: PathBuf, contents: String) -> Self {
        Artifact {
            kind,
            path,
            contents,
        }
    }

    /// The file name including extension, as listed in build descriptors.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Appends `suffix` to the last component of `prefix` (`out/Acme` + `.h` = `out/Acme.h`).
pub(crate) fn suffixed(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

/// Destination of generated artifacts.
///
/// Each call receives one complete file; implementations acquire and release whatever they
/// write to within the call.
pub trait ArtifactSink {
    /// Stores `contents` under `path`, replacing anything already there.
    ///
    /// # Errors
    /// Returns an error if the destination cannot be written. The generator records the
    /// failure and continues with the next artifact.
    fn write_artifact(&mut self, path: &Path, contents: &str) -> Result<()>;
}

/// Writes artifacts to the filesystem, creating missing parent directories.
#[derive(Debug, Default)]
pub struct FsSink;

impl FsSink {
    /// Creates a filesystem sink.
    #[must_use]
    pub fn new() -> Self {
        FsSink
    }
}

impl ArtifactSink for FsSink {
    fn write_artifact(&mut self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by path.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents written to `path`, if any.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.artifacts.get(path.as_ref()).map(String::as_str)
    }

    /// All written paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.artifacts.keys().map(PathBuf::as_path)
    }

    /// Number of stored artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// `true` if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn write_artifact(&mut self, path: &Path, contents: &str) -> Result<()> {
        self.artifacts.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes() {
        assert_eq!(
            suffixed(Path::new("out/Acme"), ".h"),
            PathBuf::from("out/Acme.h")
        );
        assert_eq!(
            suffixed(Path::new("Acme"), "_Acme_Gadget_mshl.cpp"),
            PathBuf::from("Acme_Acme_Gadget_mshl.cpp")
        );
    }

    #[test]
    fn artifact_file_name() {
        let artifact = Artifact::new(
            ArtifactKind::Lookup,
            PathBuf::from("out/native/Acme.cpp"),
            String::new(),
        );
        assert_eq!(artifact.file_name(), "Acme.cpp");
    }

    #[test]
    fn memory_sink_replaces() {
        let mut sink = MemorySink::new();
        sink.write_artifact(Path::new("a.h"), "one").unwrap();
        sink.write_artifact(Path::new("a.h"), "two").unwrap();
        sink.write_artifact(Path::new("b.h"), "three").unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.get("a.h"), Some("two"));
        assert_eq!(sink.paths().count(), 2);
        assert!(sink.get("c.h").is_none());
    }

    #[test]
    fn fs_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("Acme.h");

        FsSink::new().write_artifact(&path, "// header\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "// header\n");
    }

    #[test]
    fn fs_sink_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let result = FsSink::new().write_artifact(&blocker.join("Acme.h"), "");
        assert!(result.is_err());
    }
}

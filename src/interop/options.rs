use std::path::{Path, PathBuf};

use crate::{naming::fix_identifier, naming::NamingPolicy, Error, Result};

/// What kind of native skeleton is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenerationMode {
    /// A native interop module: struct header, lookup table, marshaling glue, developer
    /// stubs and a CMake module.
    #[default]
    Interop,
    /// A core class library: struct header, lookup table with a zero version and one source
    /// per type whose method bodies report "not implemented". No marshaling.
    CoreLibrary,
}

/// Settings of one skeleton generation run.
///
/// ```rust
/// use nanometa::interop::{GenerationMode, GeneratorOptions};
///
/// let options = GeneratorOptions::new("out/Acme.Widgets")
///     .project_name("Acme Widgets")
///     .mode(GenerationMode::CoreLibrary);
///
/// assert_eq!(options.file_name().unwrap(), "Acme_Widgets");
/// assert_eq!(options.project().unwrap(), "Acme_Widgets");
/// ```
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    path: PathBuf,
    project_name: Option<String>,
    mode: GenerationMode,
    naming_policy: Option<NamingPolicy>,
    parallel: bool,
}

impl GeneratorOptions {
    /// Options writing every artifact under the path prefix `path`.
    ///
    /// The last component names the generated files (`<path>.h`, `<path>.cpp`,
    /// `<path>_<type>.cpp`, ...) after being turned into a C identifier.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GeneratorOptions {
            path: path.into(),
            project_name: None,
            mode: GenerationMode::default(),
            naming_policy: None,
            parallel: true,
        }
    }

    /// Sets the project name used by class-library includes. Defaults to the file name.
    #[must_use]
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Selects the generation mode.
    #[must_use]
    pub fn mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the naming policy implied by the mode.
    #[must_use]
    pub fn naming_policy(mut self, policy: NamingPolicy) -> Self {
        self.naming_policy = Some(policy);
        self
    }

    /// Enables or disables parallel rendering of independent types. Output is identical
    /// either way.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The selected mode.
    #[must_use]
    pub fn generation_mode(&self) -> GenerationMode {
        self.mode
    }

    /// The naming policy in effect: the override, or [`NamingPolicy::Interop`] for interop
    /// modules and [`NamingPolicy::Plain`] for class libraries.
    #[must_use]
    pub fn policy(&self) -> NamingPolicy {
        self.naming_policy.unwrap_or(match self.mode {
            GenerationMode::Interop => NamingPolicy::Interop,
            GenerationMode::CoreLibrary => NamingPolicy::Plain,
        })
    }

    /// `true` if types are rendered in parallel.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// The path as given.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The identifier-safe file name every artifact name starts with.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if the path has no file name component.
    pub fn file_name(&self) -> Result<String> {
        let name = self
            .path
            .file_name()
            .map(|name| fix_identifier(&name.to_string_lossy()))
            .unwrap_or_default();

        if name.is_empty() {
            return Err(Error::Error(format!(
                "output path '{}' has no file name",
                self.path.display()
            )));
        }

        Ok(name)
    }

    /// The path prefix with its file name made identifier-safe.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if the path has no file name component.
    pub fn prefix(&self) -> Result<PathBuf> {
        let file_name = self.file_name()?;
        Ok(match self.path.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        })
    }

    /// The identifier-safe project name.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if no project name was set and the path has no file
    /// name component.
    pub fn project(&self) -> Result<String> {
        match &self.project_name {
            Some(name) => Ok(fix_identifier(name)),
            None => self.file_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_fixed() {
        let options = GeneratorOptions::new("out/native/Acme.Widgets-1");
        assert_eq!(options.file_name().unwrap(), "Acme_Widgets_1");
        assert_eq!(
            options.prefix().unwrap(),
            Path::new("out/native").join("Acme_Widgets_1")
        );
    }

    #[test]
    fn bare_file_name() {
        let options = GeneratorOptions::new("Gadgets");
        assert_eq!(options.prefix().unwrap(), PathBuf::from("Gadgets"));
        assert_eq!(options.project().unwrap(), "Gadgets");
    }

    #[test]
    fn missing_file_name() {
        assert!(GeneratorOptions::new("").file_name().is_err());
        assert!(GeneratorOptions::new("/").prefix().is_err());
    }

    #[test]
    fn policy_follows_mode() {
        let options = GeneratorOptions::new("a");
        assert_eq!(options.policy(), NamingPolicy::Interop);
        assert_eq!(
            options.clone().mode(GenerationMode::CoreLibrary).policy(),
            NamingPolicy::Plain
        );
        assert_eq!(
            options
                .mode(GenerationMode::CoreLibrary)
                .naming_policy(NamingPolicy::Interop)
                .policy(),
            NamingPolicy::Interop
        );
    }

    #[test]
    fn project_name_is_fixed() {
        let options = GeneratorOptions::new("x").project_name("9.Lives");
        assert_eq!(options.project().unwrap(), "__Lives");
    }
}

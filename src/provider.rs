//! Sources of named directive configurations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::FormatConfig;
use crate::error::ConfigError;

/// Supplies directive configurations by name.
///
/// # Example
///
/// ```
/// use rowfmt::{ConfigError, ConfigProvider, FormatConfig};
///
/// struct Fixed;
///
/// impl ConfigProvider for Fixed {
///     fn load(&self, name: &str) -> Result<Option<FormatConfig>, ConfigError> {
///         match name {
///             "table" => Ok(Some(FormatConfig::new().with("email", "strtolower"))),
///             _ => Ok(None),
///         }
///     }
/// }
/// ```
pub trait ConfigProvider {
    /// Load the configuration called `name`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(config))` - Configuration found
    /// * `Ok(None)` - No configuration with that name; callers treat this as empty
    /// * `Err(ConfigError)` - Configuration exists but couldn't be loaded
    fn load(&self, name: &str) -> Result<Option<FormatConfig>, ConfigError>;
}

/// Loads `<dir>/<name>.yaml` (or `.yml`).
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    dir: PathBuf,
}

impl DirectoryProvider {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        ["yaml", "yml"]
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file())
    }
}

impl ConfigProvider for DirectoryProvider {
    fn load(&self, name: &str) -> Result<Option<FormatConfig>, ConfigError> {
        match self.locate(name) {
            Some(path) => FormatConfig::load_from_file(path).map(Some),
            None => Ok(None),
        }
    }
}

/// In-memory named configurations, the way to configure inline directives.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    configs: HashMap<String, FormatConfig>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, config: FormatConfig) {
        self.configs.insert(name.into(), config);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, config: FormatConfig) -> Self {
        self.insert(name, config);
        self
    }
}

impl ConfigProvider for MemoryProvider {
    fn load(&self, name: &str) -> Result<Option<FormatConfig>, ConfigError> {
        Ok(self.configs.get(name).cloned())
    }
}

//! Error types for formatting and configuration loading.

use std::fmt;
use std::path::PathBuf;

/// Error returned by a formatting function.
///
/// Any `Err` from a step is a hard failure: the chain for that field stops
/// and the field keeps its original value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    NotFound(String),
    InvalidArgs(String),
    ExecutionError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::NotFound(name) => write!(f, "Format function not found: {}", name),
            FormatError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            FormatError::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

/// Error raised while loading options or directive files.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(String),
    InvalidDirective {
        field: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse(msg) => write!(f, "Failed to parse YAML: {}", msg),
            ConfigError::InvalidDirective { field, reason } => {
                write!(f, "Invalid directive for field '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

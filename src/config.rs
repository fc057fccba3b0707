//! Formatter options and per-field directive configurations.
//!
//! Both are loaded from YAML. The options file mirrors:
//!
//! ```yaml
//! default_format_config: format_general
//! enable_psuedo_bool_conversion: true
//! parse_types_supported:
//!   "true": true
//!   "false": false
//!   "null": null
//! method_map:
//!   convert_sql_date: utilities
//! ```
//!
//! A directive configuration is a flat mapping of field name to directive:
//!
//! ```yaml
//! email: strtolower|mailto
//! bio: wordwrap.100|trim|ucwords
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::coercion::TypeCoercionTable;
use crate::directive::Directive;
use crate::error::ConfigError;

/// Name of the configuration used when none is selected explicitly
pub const DEFAULT_FORMAT_CONFIG: &str = "format_general";

/// Formatter-wide options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    /// Configuration loaded by `run` when none was selected
    pub default_format_config: String,

    /// Coerce `true`/`false`/`null` parameters before invoking a step
    #[serde(
        rename = "enable_psuedo_bool_conversion",
        alias = "enable_pseudo_bool_conversion"
    )]
    pub enable_pseudo_bool_conversion: bool,

    /// Token to typed value table used by the coercion
    pub parse_types_supported: TypeCoercionTable,

    /// Step name -> owning method object name
    pub method_map: IndexMap<String, String>,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        let mut method_map = IndexMap::new();
        method_map.insert("convert_sql_date".to_string(), "utilities".to_string());

        Self {
            default_format_config: DEFAULT_FORMAT_CONFIG.to_string(),
            enable_pseudo_bool_conversion: true,
            parse_types_supported: TypeCoercionTable::default(),
            method_map,
        }
    }
}

impl FormatterOptions {
    /// Load options from a YAML file.
    ///
    /// Every key is optional; missing keys take their default.
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid YAML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse options from YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// Field name -> directive mapping, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FormatConfig {
    directives: IndexMap<String, Directive>,
}

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directive for a field, replacing any previous one
    pub fn insert(&mut self, field: impl Into<String>, directive: impl Into<Directive>) {
        self.directives.insert(field.into(), directive.into());
    }

    /// Builder-style [`insert`](Self::insert)
    ///
    /// # Example
    ///
    /// ```
    /// use rowfmt::{Directive, FormatConfig};
    /// use serde_json::Value;
    ///
    /// let config = FormatConfig::new()
    ///     .with("email", "strtolower|mailto")
    ///     .with("greeting", Directive::inline(|v: &Value| Value::String(format!("Hi {}", v))));
    /// assert_eq!(config.len(), 2);
    /// ```
    pub fn with(mut self, field: impl Into<String>, directive: impl Into<Directive>) -> Self {
        self.insert(field, directive);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Directive> {
        self.directives.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.directives.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.directives.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Load a directive configuration from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid YAML, or a
    /// directive isn't a string
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse a directive configuration from YAML text.
    ///
    /// Scalar keys (numbers, booleans) are accepted and used as their text,
    /// so positional fields such as `0` can be configured. A `null` directive
    /// is an empty chain.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }

        let yaml: serde_yaml::Value = serde_yaml::from_str(contents)?;

        let mapping = match yaml {
            serde_yaml::Value::Null => return Ok(Self::new()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => {
                return Err(ConfigError::Parse(
                    "Directive config must be a mapping of field names to directives".to_string(),
                ))
            }
        };

        let mut config = Self::new();
        for (key, value) in mapping {
            let field = scalar_to_string(&key).ok_or_else(|| ConfigError::InvalidDirective {
                field: format!("{:?}", key),
                reason: "field name must be a scalar".to_string(),
            })?;

            let directive = match value {
                serde_yaml::Value::String(text) => Directive::parse(&text),
                serde_yaml::Value::Null => Directive::Chain(Vec::new()),
                other => {
                    return Err(ConfigError::InvalidDirective {
                        field,
                        reason: format!("expected a string, got {:?}", other),
                    })
                }
            };

            config.insert(field, directive);
        }

        Ok(config)
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

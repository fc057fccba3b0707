//! The formatter: configuration selection plus in-place row formatting.
//!
//! ```
//! use rowfmt::{builtins, Formatter, FormatterOptions, FormatConfig, MemoryProvider};
//! use serde_json::json;
//!
//! let provider = MemoryProvider::new()
//!     .with("format_general", FormatConfig::new().with("email", "trim|strtolower"));
//!
//! let mut formatter = Formatter::new(FormatterOptions::default(), provider, builtins::default_registry());
//!
//! let mut rows = json!([{"email": "  ADA@EXAMPLE.COM "}, {"email": "Grace@Example.com"}]);
//! formatter.run(&mut rows);
//!
//! assert_eq!(rows, json!([{"email": "ada@example.com"}, {"email": "grace@example.com"}]));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::{FormatConfig, FormatterOptions};
use crate::engine::FilterEngine;
use crate::error::ConfigError;
use crate::provider::ConfigProvider;
use crate::registry::Registry;
use crate::rows::Rows;

/// A loaded configuration and the name it was selected under.
#[derive(Debug, Clone)]
pub struct ActiveConfig {
    pub name: String,
    pub config: FormatConfig,
}

/// Formats rows according to the selected directive configuration.
///
/// Holds its own selection state; use one instance per thread. The
/// registry is shared through an `Arc`.
pub struct Formatter {
    options: FormatterOptions,
    provider: Box<dyn ConfigProvider>,
    registry: Arc<Registry>,
    active: Option<ActiveConfig>,
    // One level only: a second save overwrites the first.
    saved: Option<ActiveConfig>,
    suspended: bool,
}

impl Formatter {
    pub fn new<P>(options: FormatterOptions, provider: P, registry: impl Into<Arc<Registry>>) -> Self
    where
        P: ConfigProvider + 'static,
    {
        Self {
            options,
            provider: Box::new(provider),
            registry: registry.into(),
            active: None,
            saved: None,
            suspended: false,
        }
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The active configuration, `None` until one is selected
    pub fn active_config(&self) -> Option<&ActiveConfig> {
        self.active.as_ref()
    }

    pub fn is_config_set(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Select the configuration to format with.
    ///
    /// `None` selects `default_format_config`. Once a configuration is set,
    /// further calls are no-ops unless `force_reset` is true, in which case
    /// the new configuration replaces the old one and the old one is kept in
    /// the save slot for [`enable_formatting`](Self::enable_formatting).
    ///
    /// A missing configuration selects an empty one. A configuration that
    /// fails to load is logged and also selects an empty one.
    pub fn select_config(&mut self, name: Option<&str>, force_reset: bool) -> &mut Self {
        if self.active.is_some() && !force_reset {
            return self;
        }

        let name = name.unwrap_or(&self.options.default_format_config).to_string();

        match self.load(&name) {
            Ok(config) => self.install(name, config),
            Err(err) => {
                tracing::warn!("Format config '{}' could not be loaded, using none: {}", name, err);
                self.install(name, FormatConfig::new());
            }
        }

        self
    }

    /// Like [`select_config`](Self::select_config), but a configuration that
    /// fails to load is returned as an error and leaves the state untouched.
    pub fn try_select_config(
        &mut self,
        name: Option<&str>,
        force_reset: bool,
    ) -> Result<&mut Self, ConfigError> {
        if self.active.is_some() && !force_reset {
            return Ok(self);
        }

        let name = name.unwrap_or(&self.options.default_format_config).to_string();
        let config = self.load(&name)?;
        self.install(name, config);

        Ok(self)
    }

    /// Install a configuration directly, replacing (and saving) the active one.
    pub fn use_config(&mut self, name: impl Into<String>, config: FormatConfig) -> &mut Self {
        self.install(name.into(), config);
        self
    }

    /// Clear the active configuration.
    ///
    /// The cleared configuration goes to the save slot. With
    /// `suspend_formatting`, the next [`run`](Self::run) formats nothing.
    pub fn reset_config(&mut self, suspend_formatting: bool) -> &mut Self {
        self.saved = self.active.take();
        self.suspended = suspend_formatting;

        tracing::debug!(
            "Format config reset (saved: {}, suspended: {})",
            self.saved.as_ref().map_or("-", |saved| saved.name.as_str()),
            suspend_formatting
        );

        self
    }

    /// Lift a suspension, optionally restoring the saved configuration.
    pub fn enable_formatting(&mut self, restore_previous: bool) -> &mut Self {
        self.suspended = false;

        if restore_previous {
            if let Some(saved) = self.saved.take() {
                tracing::debug!("Restoring format config '{}'", saved.name);
                self.active = Some(saved);
            }
        }

        self
    }

    /// Format every configured field of `rows` in place.
    ///
    /// While suspended, this call only re-enables formatting (restoring the
    /// saved configuration) and leaves `rows` untouched. This lets a
    /// formatting step fetch and return rows of its own without them being
    /// formatted again.
    pub fn run<R>(&mut self, rows: &mut R) -> &mut Self
    where
        R: Rows + ?Sized,
    {
        if self.suspended {
            tracing::debug!("Formatting suspended, skipping this run");
            return self.enable_formatting(true);
        }

        self.select_config(None, false);

        if let Some(active) = &self.active {
            let engine = FilterEngine::new(&self.registry, &self.options);

            rows.visit_fields(&mut |field, value| {
                if let Some(directive) = active.config.get(field) {
                    *value = engine.apply(field, directive, value);
                }
            });
        }

        self
    }

    /// Format a single value as field `field` with the active configuration.
    ///
    /// Unconfigured fields, and any field while no configuration is set,
    /// come back unchanged.
    pub fn filter(&self, field: &str, value: &Value) -> Value {
        let directive = self
            .active
            .as_ref()
            .and_then(|active| active.config.get(field));

        match directive {
            Some(directive) => FilterEngine::new(&self.registry, &self.options).apply(field, directive, value),
            None => value.clone(),
        }
    }

    fn load(&self, name: &str) -> Result<FormatConfig, ConfigError> {
        match self.provider.load(name)? {
            Some(config) => Ok(config),
            None => {
                tracing::debug!("Format config '{}' not found, no fields will be formatted", name);
                Ok(FormatConfig::new())
            }
        }
    }

    fn install(&mut self, name: String, config: FormatConfig) {
        tracing::info!("Using format config '{}' ({} fields)", name, config.len());

        if let Some(previous) = self.active.replace(ActiveConfig { name, config }) {
            self.saved = Some(previous);
        }
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("options", &self.options)
            .field("active", &self.active.as_ref().map(|a| &a.name))
            .field("saved", &self.saved.as_ref().map(|s| &s.name))
            .field("suspended", &self.suspended)
            .finish()
    }
}

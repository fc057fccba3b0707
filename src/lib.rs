//! # rowfmt: Configuration-Driven Field Formatting
//!
//! rowfmt rewrites the fields of database rows for display. A configuration
//! maps field names to a chain of named formatting functions; call sites just
//! hand their rows to a [`Formatter`].
//!
//! ## Features
//!
//! - **Directive chains**: `wordwrap.100|trim|ucwords` runs three steps left to right,
//!   each receiving the previous step's output followed by its own parameters
//! - **Inline directives**: attach a closure to a field instead of a chain
//! - **Function registry**: free functions plus named method objects routed through `method_map`
//! - **Pseudo-type coercion**: `true`, `false` and `null` parameters arrive typed
//! - **Safe failure**: a failing step leaves the field exactly as it was
//! - **Built-ins**: common display formatters (case, trimming, wrapping, links, numbers, dates)
//!
//! ## Example: directive configuration
//!
//! ```yaml
//! # config/format_general.yaml
//! email: strtolower|mailto
//! bio: wordwrap.100|trim|ucwords
//! created_at: convert_sql_date.%d %b %Y
//! ```
//!
//! ## Example: formatting rows
//!
//! ```no_run
//! use rowfmt::{builtins, DirectoryProvider, Formatter, FormatterOptions};
//! use serde_json::json;
//!
//! let options = FormatterOptions::load_from_file("config/format_config.yaml")?;
//! let mut formatter = Formatter::new(options, DirectoryProvider::new("config"), builtins::default_registry());
//!
//! let mut rows = json!([{"email": "ADA@EXAMPLE.COM", "bio": "..."}]);
//! formatter.run(&mut rows);
//!
//! // Supplement the default formatting with another configuration
//! formatter.select_config(Some("table"), true).run(&mut rows);
//! # Ok::<(), rowfmt::ConfigError>(())
//! ```

// Core modules
pub mod error;
pub mod directive;
pub mod coercion;
pub mod registry;
pub mod config;
pub mod provider;
pub mod rows;
pub mod engine;
pub mod formatter;

// Built-in formatting functions
pub mod builtins;

// JSON / NDJSON input and output
pub mod serialization;

// Re-export key types
pub use error::{ConfigError, FormatError};
pub use directive::{Directive, InlineFn, Step};
pub use coercion::TypeCoercionTable;
pub use registry::{FormatFn, FunctionRegistry, MethodObject, Registry};
pub use config::{FormatConfig, FormatterOptions, DEFAULT_FORMAT_CONFIG};
pub use provider::{ConfigProvider, DirectoryProvider, MemoryProvider};
pub use rows::Rows;
pub use engine::FilterEngine;
pub use formatter::{ActiveConfig, Formatter};

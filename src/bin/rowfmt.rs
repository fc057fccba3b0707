//! rowfmt CLI - format JSON / NDJSON rows with a directive configuration
//!
//! Reads rows from a file or stdin, formats every configured field, and
//! writes the rows to stdout.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use rowfmt::serialization::{read_json, read_ndjson, JsonWriter, NdjsonWriter};
use rowfmt::{builtins, DirectoryProvider, Formatter, FormatterOptions};
use tracing_subscriber::EnvFilter;

/// Options file looked up in the config directory when `--options` isn't given
const OPTIONS_FILE: &str = "format_config.yaml";

#[derive(Parser)]
#[command(name = "rowfmt")]
#[command(version, about = "Configuration-driven field formatting for database rows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format rows read from a file or stdin
    Format {
        /// Directory containing directive configurations (<name>.yaml)
        #[arg(short, long, env = "ROWFMT_CONFIG_DIR", default_value = "config")]
        config_dir: PathBuf,

        /// Options file (default: <config-dir>/format_config.yaml if present)
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// Directive configuration name (default: default_format_config)
        #[arg(short = 'n', long = "config")]
        config: Option<String>,

        /// Read and write NDJSON instead of a single JSON document
        #[arg(long)]
        ndjson: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Input file (default: stdin)
        input: Option<PathBuf>,
    },

    /// List registered functions and method objects
    Functions,
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Format {
            config_dir,
            options,
            config,
            ndjson,
            pretty,
            input,
        } => format_rows(&config_dir, options, config, ndjson, pretty, input),
        Commands::Functions => {
            list_functions();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_options(config_dir: &Path, options: Option<PathBuf>) -> Result<FormatterOptions, String> {
    let path = match options {
        Some(path) => path,
        None => {
            let default_path = config_dir.join(OPTIONS_FILE);
            if !default_path.is_file() {
                tracing::debug!("No {} in {}, using default options", OPTIONS_FILE, config_dir.display());
                return Ok(FormatterOptions::default());
            }
            default_path
        }
    };

    FormatterOptions::load_from_file(&path)
        .map_err(|e| format!("Failed to load options from {}: {}", path.display(), e))
}

/// Format rows from `input` (or stdin) and write them to stdout
fn format_rows(
    config_dir: &Path,
    options: Option<PathBuf>,
    config: Option<String>,
    ndjson: bool,
    pretty: bool,
    input: Option<PathBuf>,
) -> Result<(), String> {
    let options = load_options(config_dir, options)?;

    let mut rows = match &input {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
            read_rows(BufReader::new(file), ndjson)
        }
        None => read_rows(io::stdin().lock(), ndjson),
    }
    .map_err(|e| format!("Failed to read rows: {}", e))?;

    let mut formatter = Formatter::new(options, DirectoryProvider::new(config_dir), builtins::default_registry());
    formatter
        .try_select_config(config.as_deref(), false)
        .map_err(|e| e.to_string())?
        .run(&mut rows);

    let stdout = io::stdout().lock();
    let written = if ndjson {
        let mut writer = NdjsonWriter::new(stdout);
        writer.write_all(&rows).and_then(|_| writer.flush())
    } else {
        JsonWriter::new(stdout, pretty).write(&rows)
    };

    written.map_err(|e| format!("Failed to write rows: {}", e))
}

fn read_rows<R: io::BufRead>(reader: R, ndjson: bool) -> Result<serde_json::Value, rowfmt::serialization::SerializationError> {
    if ndjson {
        read_ndjson(reader)
    } else {
        read_json(reader)
    }
}

fn list_functions() {
    let registry = builtins::default_registry();

    println!("Functions:");
    for name in registry.functions().list_functions() {
        println!("  {}", name);
    }

    println!("Objects:");
    for object_name in registry.object_names() {
        if let Some(object) = registry.object(&object_name) {
            println!("  {}: {}", object_name, object.method_names().join(", "));
        }
    }
}

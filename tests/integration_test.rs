//! Integration tests for rowfmt formatting with YAML configurations

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rowfmt::{
    builtins, DirectoryProvider, FormatConfig, FormatError, Formatter, FormatterOptions, MemoryProvider,
    MethodObject, Registry, TypeCoercionTable,
};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

fn write_config(dir: &Path, name: &str, yaml: &str) {
    fs::write(dir.join(format!("{}.yaml", name)), yaml).unwrap();
}

fn dir_formatter(dir: &Path) -> Formatter {
    Formatter::new(FormatterOptions::default(), DirectoryProvider::new(dir), builtins::default_registry())
}

#[test]
fn test_shipped_configuration() {
    let config_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
    let options = FormatterOptions::load_from_file(config_dir.join("format_config.yaml")).unwrap();
    let mut formatter = Formatter::new(options, DirectoryProvider::new(&config_dir), builtins::default_registry());

    let mut rows = json!([{
        "id": 7,
        "email": "ADA@Example.COM",
        "bio": "hello world",
        "balance": 1234.5,
        "created_at": "2011-03-04 10:00:00",
        "notes": ""
    }]);
    formatter.run(&mut rows);

    assert_eq!(
        rows,
        json!([{
            "id": 7,
            "email": "<a href=\"mailto:ada@example.com\">ada@example.com</a>",
            "bio": "Hello World",
            "balance": "1,234.50",
            "created_at": "03/04/2011",
            "notes": "n/a"
        }])
    );
}

#[test]
fn test_trim_then_lowercase() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "format_general", "name: trim|strtolower\n");
    let mut formatter = dir_formatter(temp_dir.path());

    let mut row = json!({"name": "  ABC  "});
    formatter.run(&mut row);

    assert_eq!(row, json!({"name": "abc"}));
}

#[test]
fn test_order_matters() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "format_general", "a: truncate.3|strtoupper\nb: strtoupper|truncate.3.!\n");
    let mut formatter = dir_formatter(temp_dir.path());

    let mut row = json!({"a": "abcdef", "b": "abcdef"});
    formatter.run(&mut row);

    assert_eq!(row, json!({"a": "ABC...", "b": "ABC!"}));
}

#[test]
fn test_numeric_parameter_reaches_step_as_string() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut registry = builtins::default_registry();
    registry.register("wordwrap", move |v: &Value, args: &[Value]| {
        recorder.lock().unwrap().extend(args.iter().cloned());
        Ok(v.clone())
    });
    let provider = MemoryProvider::new().with("format_general", FormatConfig::new().with("bio", "wordwrap.10.true"));
    let mut formatter = Formatter::new(FormatterOptions::default(), provider, registry);

    formatter.run(&mut json!({"bio": "text"}));

    assert_eq!(*seen.lock().unwrap(), vec![json!("10"), json!(true)]);
}

#[test]
fn test_failing_step_keeps_original_and_stops() {
    let later_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&later_calls);
    let mut registry = builtins::default_registry();
    registry.register("reject", |_v: &Value, _args: &[Value]| {
        Err(FormatError::ExecutionError("rejected".to_string()))
    });
    registry.register("after", move |v: &Value, _args: &[Value]| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(v.clone())
    });
    let provider = MemoryProvider::new().with(
        "format_general",
        FormatConfig::new().with("name", "strtoupper|reject|after").with("city", "strtoupper"),
    );
    let mut formatter = Formatter::new(FormatterOptions::default(), provider, registry);

    let mut row = json!({"name": "ada", "city": "london"});
    formatter.run(&mut row);

    assert_eq!(row, json!({"name": "ada", "city": "LONDON"}));
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_out_of_range_precision_keeps_row() {
    let provider = MemoryProvider::new().with(
        "format_general",
        FormatConfig::new().with("balance", "number_format.70000").with("total", "number_format.2"),
    );
    let mut formatter = Formatter::new(FormatterOptions::default(), provider, builtins::default_registry());

    let mut row = json!({"balance": 1.5, "total": 1234.5});
    formatter.run(&mut row);

    assert_eq!(row, json!({"balance": 1.5, "total": "1,234.50"}));
}

#[test]
fn test_invalid_date_keeps_original() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "format_general", "created_at: convert_sql_date\n");
    let mut formatter = dir_formatter(temp_dir.path());

    let mut rows = json!([{"created_at": "0000-00-00 00:00:00"}, {"created_at": "2020-12-31 23:59:59"}]);
    formatter.run(&mut rows);

    assert_eq!(rows, json!([{"created_at": "0000-00-00 00:00:00"}, {"created_at": "12/31/2020"}]));
}

#[test]
fn test_method_map_requires_registered_method() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "format_general", "stamp: slugify\n");

    let mut registry = Registry::new();
    registry.register_object(MethodObject::new("text_helper"));
    registry.register("slugify", |v: &Value, _args: &[Value]| {
        Ok(json!(builtins::text(v).to_lowercase().replace(' ', "-")))
    });
    let options = FormatterOptions::from_yaml_str("method_map:\n  slugify: text_helper\n").unwrap();
    let mut formatter = Formatter::new(options, DirectoryProvider::new(temp_dir.path()), registry);

    let mut row = json!({"stamp": "Hello World"});
    formatter.run(&mut row);

    assert_eq!(row, json!({"stamp": "hello-world"}));
}

#[test]
fn test_missing_configuration_file_is_silent() {
    let temp_dir = TempDir::new().unwrap();
    let mut formatter = dir_formatter(temp_dir.path());

    let mut row = json!({"name": "  ABC  "});
    formatter.run(&mut row);

    assert_eq!(row, json!({"name": "  ABC  "}));
}

#[test]
fn test_supplement_with_second_configuration() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "format_general", "name: trim\n");
    write_config(temp_dir.path(), "table", "name: strtoupper\nemail: mailto.Email\n");
    let mut formatter = dir_formatter(temp_dir.path());

    let mut row = json!({"name": "  ada  ", "email": "ada@example.com"});
    formatter.run(&mut row).select_config(Some("table"), true).run(&mut row);

    assert_eq!(
        row,
        json!({"name": "ADA", "email": "<a href=\"mailto:ada@example.com\">Email</a>"})
    );
}

#[test]
fn test_suspend_then_resume() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "format_general", "name: strtoupper\n");
    let mut formatter = dir_formatter(temp_dir.path());

    let mut row = json!({"name": "ada"});
    formatter.reset_config(true).run(&mut row);
    assert_eq!(row, json!({"name": "ada"}));

    formatter.run(&mut row);
    assert_eq!(row, json!({"name": "ADA"}));
}

#[test]
fn test_enable_formatting_restores_prior_config() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "format_general", "name: strtoupper\n");
    write_config(temp_dir.path(), "table", "name: ucfirst\n");
    let mut formatter = dir_formatter(temp_dir.path());
    formatter.select_config(Some("table"), false);

    formatter.reset_config(false).enable_formatting(true);
    let mut row = json!({"name": "ada lovelace"});
    formatter.run(&mut row);

    assert_eq!(row, json!({"name": "Ada lovelace"}));
}

#[test]
fn test_typed_rows() {
    let provider = MemoryProvider::new().with("format_general", FormatConfig::new().with("name", "ucwords"));
    let mut formatter = Formatter::new(FormatterOptions::default(), provider, builtins::default_registry());

    let mut rows: Vec<Map<String, Value>> = vec![
        json!({"name": "ada lovelace", "id": 1}).as_object().unwrap().clone(),
        json!({"name": "grace hopper", "id": 2}).as_object().unwrap().clone(),
    ];
    formatter.run(&mut rows);

    assert_eq!(rows[0]["name"], json!("Ada Lovelace"));
    assert_eq!(rows[1]["name"], json!("Grace Hopper"));
    assert_eq!(rows[1]["id"], json!(2));
}

#[test]
fn test_coercion_idempotent_with_shipped_table() {
    let table = TypeCoercionTable::default();
    let params = vec![json!("true"), json!("null"), json!("10"), json!(false)];

    assert_eq!(table.coerce(&table.coerce(&params)), table.coerce(&params));
}

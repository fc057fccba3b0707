//! Built-in display formatters.
//!
//! Every function takes the running value plus the step's parameters. Blank
//! input (null or empty string) is returned unchanged by the functions that
//! would otherwise have to invent output for it.

use std::fmt::Write;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use crate::error::FormatError;
use crate::registry::{FunctionRegistry, MethodObject, Registry};

type FormatResult = Result<Value, FormatError>;

/// Largest precision `format!` accepts for a float.
const MAX_DECIMALS: usize = u16::MAX as usize;

const SQL_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Register all built-in free functions
pub fn register_builtins(registry: &mut FunctionRegistry) {
    register_string_functions(registry);
    register_html_functions(registry);
    register_number_functions(registry);
    register_date_functions(registry);
}

/// The `utilities` method object
///
/// Reached through the stock `method_map` entry `convert_sql_date: utilities`.
pub fn utilities() -> MethodObject {
    MethodObject::new("utilities").with_method("convert_sql_date", convert_sql_date)
}

/// Registry with every built-in function and the `utilities` object
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    register_builtins(registry.functions_mut());
    registry.register_object(utilities());
    registry
}

fn register_string_functions(registry: &mut FunctionRegistry) {
    registry.register("trim", trim);
    registry.register("ltrim", ltrim);
    registry.register("rtrim", rtrim);
    registry.register("strtolower", |v: &Value, _args: &[Value]| Ok(Value::String(text(v).to_lowercase())));
    registry.register("strtoupper", |v: &Value, _args: &[Value]| Ok(Value::String(text(v).to_uppercase())));
    registry.register("ucfirst", |v: &Value, _args: &[Value]| Ok(Value::String(upper_first(&text(v)))));
    registry.register("ucwords", ucwords);
    registry.register("wordwrap", wordwrap);
    registry.register("truncate", truncate);
    registry.register("default", default_value);
}

fn register_html_functions(registry: &mut FunctionRegistry) {
    registry.register("nl2br", |v: &Value, _args: &[Value]| Ok(Value::String(text(v).replace('\n', "<br />\n"))));
    registry.register("htmlspecialchars", |v: &Value, _args: &[Value]| Ok(Value::String(escape_html(&text(v)))));
    registry.register("mailto", mailto);
    registry.register("auto_link", auto_link);
}

fn register_number_functions(registry: &mut FunctionRegistry) {
    registry.register("number_format", number_format);
}

fn register_date_functions(registry: &mut FunctionRegistry) {
    registry.register("date_format", date_format);
}

/// Text form of a value: strings as-is, null as empty, everything else as JSON.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

// Missing and null parameters both mean "use the default".
fn arg(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|v| !v.is_null())
}

fn arg_text(args: &[Value], index: usize, default: &str) -> String {
    arg(args, index).map_or_else(|| default.to_string(), text)
}

fn arg_usize(args: &[Value], index: usize, default: usize, name: &str) -> Result<usize, FormatError> {
    match arg(args, index) {
        None => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| FormatError::InvalidArgs(format!("{} must be a non-negative integer, got {}", name, n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| FormatError::InvalidArgs(format!("{} must be a non-negative integer, got '{}'", name, s))),
        Some(other) => Err(FormatError::InvalidArgs(format!("{} must be a number, got {}", name, other))),
    }
}

fn arg_bool(args: &[Value], index: usize, default: bool, name: &str) -> Result<bool, FormatError> {
    match arg(args, index) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => match s.as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            _ => Err(FormatError::InvalidArgs(format!("{} must be a boolean, got '{}'", name, s))),
        },
        Some(other) => Err(FormatError::InvalidArgs(format!("{} must be a boolean, got {}", name, other))),
    }
}

fn trim_with(value: &Value, args: &[Value], strip: fn(&str, &dyn Fn(char) -> bool) -> String) -> FormatResult {
    let input = text(value);
    let trimmed = match arg(args, 0) {
        Some(chars) => {
            let chars = text(chars);
            strip(&input, &|c: char| chars.contains(c))
        }
        None => strip(&input, &char::is_whitespace),
    };
    Ok(Value::String(trimmed))
}

fn trim(value: &Value, args: &[Value]) -> FormatResult {
    trim_with(value, args, |s, pat| s.trim_matches(|c: char| pat(c)).to_string())
}

fn ltrim(value: &Value, args: &[Value]) -> FormatResult {
    trim_with(value, args, |s, pat| s.trim_start_matches(|c: char| pat(c)).to_string())
}

fn rtrim(value: &Value, args: &[Value]) -> FormatResult {
    trim_with(value, args, |s, pat| s.trim_end_matches(|c: char| pat(c)).to_string())
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ucwords(value: &Value, _args: &[Value]) -> FormatResult {
    let mut out = String::new();
    let mut at_word_start = true;

    for c in text(value).chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }

    Ok(Value::String(out))
}

/// `wordwrap.width.break.cut`: greedy wrap at spaces, per existing line.
fn wordwrap(value: &Value, args: &[Value]) -> FormatResult {
    let width = arg_usize(args, 0, 75, "width")?;
    let line_break = arg_text(args, 1, "\n");
    let cut = arg_bool(args, 2, false, "cut")?;

    if width == 0 && cut {
        return Err(FormatError::InvalidArgs("can't force cut when width is 0".to_string()));
    }

    let wrapped: Vec<String> = text(value)
        .split('\n')
        .map(|line| wrap_line(line, width, &line_break, cut))
        .collect();

    Ok(Value::String(wrapped.join("\n")))
}

fn wrap_line(line: &str, width: usize, line_break: &str, cut: bool) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in line.split(' ') {
        let mut word = word;

        if cut {
            while word.chars().count() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = word.char_indices().nth(width).map_or(word.len(), |(i, _)| i);
                lines.push(word[..split].to_string());
                word = &word[split..];
            }
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines.join(line_break)
}

/// `truncate.length.suffix`
fn truncate(value: &Value, args: &[Value]) -> FormatResult {
    let length = arg_usize(args, 0, 100, "length")?;
    let suffix = arg_text(args, 1, "...");
    let input = text(value);

    if input.chars().count() <= length {
        return Ok(Value::String(input));
    }

    let mut out: String = input.chars().take(length).collect();
    out.push_str(&suffix);
    Ok(Value::String(out))
}

/// `default.fallback`: replace blank values
fn default_value(value: &Value, args: &[Value]) -> FormatResult {
    if is_blank(value) {
        Ok(args.first().cloned().unwrap_or_else(|| Value::String(String::new())))
    } else {
        Ok(value.clone())
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// `mailto.text`
fn mailto(value: &Value, args: &[Value]) -> FormatResult {
    if is_blank(value) {
        return Ok(value.clone());
    }

    let address = escape_html(&text(value));
    let label = arg(args, 0).map_or_else(|| address.clone(), |label| escape_html(&text(label)));

    Ok(Value::String(format!("<a href=\"mailto:{}\">{}</a>", address, label)))
}

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r#"\b(?:https?://|www\.)[^\s<>"]+[^\s<>".,;:!?)]"#).expect("valid URL pattern"))
}

/// Wrap bare URLs in anchors
fn auto_link(value: &Value, _args: &[Value]) -> FormatResult {
    let input = text(value);

    let linked = url_regex().replace_all(&input, |caps: &regex::Captures| {
        let url = &caps[0];
        let href = if url.starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };
        format!("<a href=\"{}\">{}</a>", href, url)
    });

    Ok(Value::String(linked.into_owned()))
}

/// `number_format.decimals.point.separator`
fn number_format(value: &Value, args: &[Value]) -> FormatResult {
    if is_blank(value) {
        return Ok(value.clone());
    }

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FormatError::ExecutionError(format!("not a number: {}", value)))?;

    let decimals = arg_usize(args, 0, 0, "decimals")?;
    if decimals > MAX_DECIMALS {
        return Err(FormatError::InvalidArgs(format!(
            "decimals must be at most {}, got {}",
            MAX_DECIMALS, decimals
        )));
    }
    let point = arg_text(args, 1, ".");
    let separator = arg_text(args, 2, ",");

    let fixed = format!("{:.*}", decimals, number.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::new();
    if number < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push_str(&separator);
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push_str(&point);
        out.push_str(fraction);
    }

    Ok(Value::String(out))
}

/// Parse SQL dates, datetimes, RFC 3339 strings and unix timestamps.
fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        Value::String(s) => {
            let s = s.trim();
            SQL_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        }
        _ => None,
    }
}

fn format_datetime(value: &Value, pattern: &str) -> FormatResult {
    if is_blank(value) {
        return Ok(value.clone());
    }

    let datetime = parse_datetime(value)
        .ok_or_else(|| FormatError::ExecutionError(format!("not a date: {}", value)))?;

    let mut out = String::new();
    write!(out, "{}", datetime.format(pattern))
        .map_err(|_| FormatError::InvalidArgs(format!("invalid date pattern '{}'", pattern)))?;

    Ok(Value::String(out))
}

/// `date_format.pattern` (strftime, default `%Y-%m-%d`)
fn date_format(value: &Value, args: &[Value]) -> FormatResult {
    format_datetime(value, &arg_text(args, 0, "%Y-%m-%d"))
}

/// `convert_sql_date.pattern` (strftime, default `%m/%d/%Y`)
fn convert_sql_date(value: &Value, args: &[Value]) -> FormatResult {
    format_datetime(value, &arg_text(args, 0, "%m/%d/%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, value: Value, args: &[Value]) -> FormatResult {
        let mut registry = FunctionRegistry::new();
        register_builtins(&mut registry);
        registry.call(name, &value, args)
    }

    #[test]
    fn test_trim_variants() {
        assert_eq!(call("trim", json!("  ABC  "), &[]).unwrap(), json!("ABC"));
        assert_eq!(call("ltrim", json!("  ABC  "), &[]).unwrap(), json!("ABC  "));
        assert_eq!(call("rtrim", json!("  ABC  "), &[]).unwrap(), json!("  ABC"));
        assert_eq!(call("trim", json!("--x--"), &[json!("-")]).unwrap(), json!("x"));
    }

    #[test]
    fn test_case_functions() {
        assert_eq!(call("strtolower", json!("ABC"), &[]).unwrap(), json!("abc"));
        assert_eq!(call("strtoupper", json!("abc"), &[]).unwrap(), json!("ABC"));
        assert_eq!(call("ucfirst", json!("hello world"), &[]).unwrap(), json!("Hello world"));
        assert_eq!(call("ucwords", json!("hello  big world"), &[]).unwrap(), json!("Hello  Big World"));
    }

    #[test]
    fn test_wordwrap_string_width() {
        let result = call("wordwrap", json!("The quick brown fox"), &[json!("10")]).unwrap();

        assert_eq!(result, json!("The quick\nbrown fox"));
    }

    #[test]
    fn test_wordwrap_custom_break_and_cut() {
        let result = call(
            "wordwrap",
            json!("A very long woooooooooord."),
            &[json!("8"), json!("<br>"), json!(true)],
        )
        .unwrap();

        assert_eq!(result, json!("A very<br>long<br>wooooooo<br>ooord."));
    }

    #[test]
    fn test_wordwrap_rejects_bad_width() {
        assert!(matches!(
            call("wordwrap", json!("text"), &[json!("wide")]),
            Err(FormatError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(call("truncate", json!("abcdef"), &[json!("3")]).unwrap(), json!("abc..."));
        assert_eq!(call("truncate", json!("abc"), &[json!("3")]).unwrap(), json!("abc"));
    }

    #[test]
    fn test_default_fills_blank() {
        assert_eq!(call("default", json!(""), &[json!("n/a")]).unwrap(), json!("n/a"));
        assert_eq!(call("default", Value::Null, &[json!("n/a")]).unwrap(), json!("n/a"));
        assert_eq!(call("default", json!(0), &[json!("n/a")]).unwrap(), json!(0));
    }

    #[test]
    fn test_html_helpers() {
        assert_eq!(call("nl2br", json!("a\nb"), &[]).unwrap(), json!("a<br />\nb"));
        assert_eq!(
            call("htmlspecialchars", json!("<b>\"x\" & 'y'</b>"), &[]).unwrap(),
            json!("&lt;b&gt;&quot;x&quot; &amp; &#039;y&#039;&lt;/b&gt;")
        );
    }

    #[test]
    fn test_mailto() {
        assert_eq!(
            call("mailto", json!("ada@example.com"), &[]).unwrap(),
            json!("<a href=\"mailto:ada@example.com\">ada@example.com</a>")
        );
        assert_eq!(
            call("mailto", json!("ada@example.com"), &[json!("Email")]).unwrap(),
            json!("<a href=\"mailto:ada@example.com\">Email</a>")
        );
        assert_eq!(call("mailto", json!(""), &[]).unwrap(), json!(""));
    }

    #[test]
    fn test_auto_link() {
        let result = call("auto_link", json!("See https://example.com/a. Or www.rust-lang.org"), &[]).unwrap();

        assert_eq!(
            result,
            json!("See <a href=\"https://example.com/a\">https://example.com/a</a>. Or <a href=\"http://www.rust-lang.org\">www.rust-lang.org</a>")
        );
    }

    #[test]
    fn test_number_format() {
        assert_eq!(call("number_format", json!(1234567.891), &[json!("2")]).unwrap(), json!("1,234,567.89"));
        assert_eq!(
            call("number_format", json!("1234.5"), &[json!("1"), json!(","), json!(" ")]).unwrap(),
            json!("1 234,5")
        );
        assert_eq!(call("number_format", json!(-999), &[]).unwrap(), json!("-999"));
        assert!(call("number_format", json!("abc"), &[]).is_err());
    }

    #[test]
    fn test_number_format_precision_limit() {
        assert!(matches!(
            call("number_format", json!(1.5), &[json!("70000")]),
            Err(FormatError::InvalidArgs(_))
        ));
        assert!(call("number_format", json!(1.5), &[json!("65535")]).is_ok());
    }

    #[test]
    fn test_date_format() {
        assert_eq!(
            call("date_format", json!("2011-03-04 13:05:00"), &[json!("%d/%m/%Y %H:%M")]).unwrap(),
            json!("04/03/2011 13:05")
        );
        assert_eq!(call("date_format", json!("2011-03-04"), &[]).unwrap(), json!("2011-03-04"));
        assert_eq!(call("date_format", json!(0), &[json!("%Y")]).unwrap(), json!("1970"));
    }

    #[test]
    fn test_date_format_failures() {
        assert!(matches!(
            call("date_format", json!("0000-00-00"), &[]),
            Err(FormatError::ExecutionError(_))
        ));
        assert!(matches!(
            call("date_format", json!("2011-03-04"), &[json!("%Q")]),
            Err(FormatError::InvalidArgs(_))
        ));
        assert_eq!(call("date_format", Value::Null, &[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_utilities_convert_sql_date() {
        let utilities = utilities();
        let method = utilities.method("convert_sql_date").unwrap();

        assert_eq!(method.call(&json!("2011-03-04 00:00:00"), &[]).unwrap(), json!("03/04/2011"));
        assert_eq!(utilities.method_names(), vec!["convert_sql_date"]);
    }

    #[test]
    fn test_default_registry_contents() {
        let registry = default_registry();

        assert!(registry.functions().has_function("wordwrap"));
        assert!(registry.object("utilities").is_some());
        assert!(!registry.functions().has_function("convert_sql_date"));
    }
}

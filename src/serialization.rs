//! Reading and writing rows as JSON or NDJSON.

use std::io::{BufRead, Write};

use serde_json::Value;

/// Error type for serialization operations
#[derive(Debug)]
pub enum SerializationError {
    JsonError(serde_json::Error),
    IoError(std::io::Error),
    /// Malformed NDJSON line (1-based)
    LineError {
        line: usize,
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::JsonError(err)
    }
}

impl From<std::io::Error> for SerializationError {
    fn from(err: std::io::Error) -> Self {
        SerializationError::IoError(err)
    }
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationError::JsonError(e) => write!(f, "JSON error: {}", e),
            SerializationError::IoError(e) => write!(f, "IO error: {}", e),
            SerializationError::LineError { line, source } => {
                write!(f, "JSON error on line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for SerializationError {}

/// Read a single JSON document (a row or a result array)
pub fn read_json<R: BufRead>(reader: R) -> Result<Value, SerializationError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read NDJSON rows into an array, skipping blank lines
pub fn read_ndjson<R: BufRead>(reader: R) -> Result<Value, SerializationError> {
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|source| SerializationError::LineError {
            line: index + 1,
            source,
        })?;
        rows.push(row);
    }

    Ok(Value::Array(rows))
}

/// NDJSON (Newline Delimited JSON) writer
///
/// Writes rows as NDJSON, one JSON object per line.
pub struct NdjsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonWriter<W> {
    /// Create a new NDJSON writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a single row as an NDJSON line
    pub fn write(&mut self, row: &Value) -> Result<(), SerializationError> {
        let json = serde_json::to_string(row)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Write every row of a batch; a non-array value is written as one row
    pub fn write_all(&mut self, rows: &Value) -> Result<(), SerializationError> {
        match rows {
            Value::Array(items) => {
                for row in items {
                    self.write(row)?;
                }
                Ok(())
            }
            row => self.write(row),
        }
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<(), SerializationError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON document writer
pub struct JsonWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    /// Write the whole document followed by a newline
    pub fn write(&mut self, document: &Value) -> Result<(), SerializationError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, document)?;
        } else {
            serde_json::to_writer(&mut self.writer, document)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

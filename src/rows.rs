//! Row-like containers the formatter can walk.
//!
//! Traversal rules for dynamic [`Value`] input:
//!
//! - an object's entries that are themselves objects are rows, and each of
//!   their fields is visited;
//! - an object's scalar entries are visited under their own key;
//! - an array's object elements are rows; scalar elements are visited under
//!   their index;
//! - anything else is left alone.
//!
//! A typed [`Map`] is always exactly one row.

use serde_json::{Map, Value};

/// Something whose fields can be rewritten in place.
pub trait Rows {
    /// Call `visit` with every formattable field name and a mutable handle
    /// on its value. The key set is never changed.
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&str, &mut Value));
}

fn visit_row(row: &mut Map<String, Value>, visit: &mut dyn FnMut(&str, &mut Value)) {
    for (field, value) in row.iter_mut() {
        visit(field.as_str(), value);
    }
}

fn visit_items(items: &mut [Value], visit: &mut dyn FnMut(&str, &mut Value)) {
    for (index, item) in items.iter_mut().enumerate() {
        match item {
            Value::Object(row) => visit_row(row, visit),
            scalar => visit(index.to_string().as_str(), scalar),
        }
    }
}

impl Rows for Value {
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&str, &mut Value)) {
        match self {
            Value::Object(map) => {
                for (key, entry) in map.iter_mut() {
                    match entry {
                        Value::Object(row) => visit_row(row, visit),
                        scalar => visit(key.as_str(), scalar),
                    }
                }
            }
            Value::Array(items) => visit_items(items, visit),
            _ => {}
        }
    }
}

impl Rows for Map<String, Value> {
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&str, &mut Value)) {
        visit_row(self, visit);
    }
}

impl Rows for [Map<String, Value>] {
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&str, &mut Value)) {
        for row in self.iter_mut() {
            visit_row(row, visit);
        }
    }
}

impl Rows for Vec<Map<String, Value>> {
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&str, &mut Value)) {
        self.as_mut_slice().visit_fields(visit);
    }
}

impl Rows for [Value] {
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&str, &mut Value)) {
        visit_items(self, visit);
    }
}

impl Rows for Vec<Value> {
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&str, &mut Value)) {
        visit_items(self, visit);
    }
}

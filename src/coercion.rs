//! Pseudo-type coercion of step parameters.
//!
//! Parameters in a directive are always text. When coercion is enabled, the
//! exact tokens listed in the table (by default `true`, `false` and `null`)
//! are replaced by typed values before the step is invoked. Nothing else is
//! parsed: `"10"` stays the string `"10"`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Literal token to typed value lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCoercionTable {
    literals: IndexMap<String, Value>,
}

impl TypeCoercionTable {
    /// Table with no entries; every parameter passes through as text
    pub fn empty() -> Self {
        Self {
            literals: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, token: impl Into<String>, value: Value) {
        self.literals.insert(token.into(), value);
    }

    pub fn get(&self, token: &str) -> Option<&Value> {
        self.literals.get(token)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Coerce a single value
    ///
    /// Case-sensitive exact match on string values; non-string values are
    /// returned unchanged, which makes coercion idempotent.
    pub fn coerce_value(&self, value: Value) -> Value {
        match value {
            Value::String(token) => match self.literals.get(&token) {
                Some(typed) => typed.clone(),
                None => Value::String(token),
            },
            other => other,
        }
    }

    /// Coerce a parameter list
    pub fn coerce(&self, params: &[Value]) -> Vec<Value> {
        params
            .iter()
            .cloned()
            .map(|param| self.coerce_value(param))
            .collect()
    }

    /// Coerce raw directive parameters
    pub fn coerce_raw(&self, params: &[String]) -> Vec<Value> {
        params
            .iter()
            .map(|param| self.coerce_value(Value::String(param.clone())))
            .collect()
    }
}

impl Default for TypeCoercionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("true", Value::Bool(true));
        table.insert("false", Value::Bool(false));
        table.insert("null", Value::Null);
        table
    }
}

/// Raw parameters as untyped string values
pub fn raw_params(params: &[String]) -> Vec<Value> {
    params.iter().cloned().map(Value::String).collect()
}

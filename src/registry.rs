//! Registry of named formatting functions.
//!
//! Steps in a directive are resolved by name against this registry. A step
//! either names a free function, or (through the `method_map` option) a
//! method exposed by a named [`MethodObject`].

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::FormatError;

/// Trait for formatting functions
///
/// The running field value is passed as `value`; the step's parameters
/// follow in `args`, already coerced when pseudo-type conversion is on.
pub trait FormatFn: Send + Sync {
    /// Execute the formatting step
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - New field value (any JSON value, including `false` or `null`)
    /// * `Err(FormatError)` - Hard failure, the field keeps its original value
    fn call(&self, value: &Value, args: &[Value]) -> Result<Value, FormatError>;
}

impl<F> FormatFn for F
where
    F: Fn(&Value, &[Value]) -> Result<Value, FormatError> + Send + Sync,
{
    fn call(&self, value: &Value, args: &[Value]) -> Result<Value, FormatError> {
        self(value, args)
    }
}

/// Registry for storing and calling formatting functions
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Box<dyn FormatFn>>,
}

impl FunctionRegistry {
    /// Create a new empty function registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formatting function
    ///
    /// # Example
    ///
    /// ```
    /// use rowfmt::{FormatError, FunctionRegistry};
    /// use serde_json::Value;
    ///
    /// let mut registry = FunctionRegistry::new();
    /// registry.register("shout", |value: &Value, _args: &[Value]| {
    ///     let text = value
    ///         .as_str()
    ///         .ok_or_else(|| FormatError::InvalidArgs("expected a string".to_string()))?;
    ///     Ok(Value::String(format!("{}!", text.to_uppercase())))
    /// });
    /// assert!(registry.has_function("shout"));
    /// ```
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FormatError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Box::new(func));
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&dyn FormatFn> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    /// Call a registered function
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - Function succeeded
    /// * `Err(FormatError::NotFound)` - No function with that name
    /// * `Err(FormatError)` - Function failed
    pub fn call(&self, name: &str, value: &Value, args: &[Value]) -> Result<Value, FormatError> {
        let func = self
            .get(name)
            .ok_or_else(|| FormatError::NotFound(name.to_string()))?;

        func.call(value, args)
    }

    /// Check if a function is registered
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get the names of all registered functions, sorted
    pub fn list_functions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.list_functions())
            .finish()
    }
}

/// A named object exposing formatting methods.
///
/// Steps reach these methods only when the `method_map` option routes the
/// step name to the object's name.
#[derive(Debug)]
pub struct MethodObject {
    name: String,
    methods: FunctionRegistry,
}

impl MethodObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: FunctionRegistry::new(),
        }
    }

    /// Add a method, builder style
    pub fn with_method<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FormatError> + Send + Sync + 'static,
    {
        self.methods.register(name, func);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, name: &str) -> Option<&dyn FormatFn> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.methods.list_functions()
    }
}

/// Where a step name resolved to.
pub struct Resolved<'a> {
    /// Owning object name, `None` for free functions
    pub owner: Option<&'a str>,
    pub func: &'a dyn FormatFn,
}

/// Free functions plus named method objects.
#[derive(Debug, Default)]
pub struct Registry {
    functions: FunctionRegistry,
    objects: HashMap<String, MethodObject>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Register a free function
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FormatError> + Send + Sync + 'static,
    {
        self.functions.register(name, func);
    }

    /// Register a method object under its own name, replacing any previous one
    pub fn register_object(&mut self, object: MethodObject) {
        self.objects.insert(object.name.clone(), object);
    }

    pub fn object(&self, name: &str) -> Option<&MethodObject> {
        self.objects.get(name)
    }

    /// Object names, sorted
    pub fn object_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a step name.
    ///
    /// A `method_map` entry only wins when the mapped object exists and
    /// actually exposes a method of that name; otherwise resolution falls
    /// through to the free functions.
    pub fn resolve<'a>(
        &'a self,
        name: &str,
        method_map: &'a IndexMap<String, String>,
    ) -> Option<Resolved<'a>> {
        let bound = method_map.get(name).and_then(|owner| {
            self.objects
                .get(owner)
                .and_then(|object| object.method(name))
                .map(|func| Resolved {
                    owner: Some(owner.as_str()),
                    func,
                })
        });

        bound.or_else(|| {
            self.functions
                .get(name)
                .map(|func| Resolved { owner: None, func })
        })
    }
}

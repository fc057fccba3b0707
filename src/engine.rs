//! Directive application for a single field.

use serde_json::Value;

use crate::coercion::raw_params;
use crate::config::FormatterOptions;
use crate::directive::{Directive, Step};
use crate::registry::Registry;

/// Applies directives using a registry and the formatter options.
#[derive(Debug, Clone, Copy)]
pub struct FilterEngine<'a> {
    registry: &'a Registry,
    options: &'a FormatterOptions,
}

impl<'a> FilterEngine<'a> {
    pub fn new(registry: &'a Registry, options: &'a FormatterOptions) -> Self {
        Self { registry, options }
    }

    /// Step parameters as passed to the step, coerced if enabled
    pub fn params_for(&self, step: &Step) -> Vec<Value> {
        if self.options.enable_pseudo_bool_conversion {
            self.options.parse_types_supported.coerce_raw(&step.params)
        } else {
            raw_params(&step.params)
        }
    }

    /// Run `directive` over `value` for `field`.
    ///
    /// Steps that don't resolve are skipped. A step returning `Err` aborts the
    /// chain and the original `value` is returned unchanged.
    pub fn apply(&self, field: &str, directive: &Directive, value: &Value) -> Value {
        let steps = match directive {
            Directive::Inline(func) => return func(value),
            Directive::Chain(steps) => steps,
        };

        let mut current = value.clone();

        for step in steps {
            let params = self.params_for(step);

            let Some(target) = self.registry.resolve(&step.name, &self.options.method_map) else {
                tracing::debug!(
                    "Field '{}': nothing registered for step '{}' (object: {}), skipped",
                    field,
                    step.name,
                    self.options.method_map.get(&step.name).map_or("-", String::as_str)
                );
                continue;
            };

            match target.func.call(&current, &params) {
                Ok(next) => current = next,
                Err(err) => {
                    tracing::error!(
                        "Field '{}': step '{}' (object: {}) failed, keeping original value: {}",
                        field,
                        step,
                        target.owner.unwrap_or("-"),
                        err
                    );
                    return value.clone();
                }
            }
        }

        current
    }
}

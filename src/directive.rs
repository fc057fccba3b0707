//! Formatting directives: what to do with one field.
//!
//! A textual directive is a pipe-separated chain of steps, each step a
//! function name optionally followed by dot-separated parameters:
//!
//! ```text
//! wordwrap.100|trim|ucwords
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Separator between steps of a chain
pub const STEP_DELIMITER: char = '|';

/// Separator between a step name and its parameters
pub const PARAM_DELIMITER: char = '.';

/// Inline transformation attached to a field
pub type InlineFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// One named transformation plus its literal parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub params: Vec<String>,
}

impl Step {
    /// Parse a step descriptor such as `wordwrap.10` or `mailto`
    ///
    /// Only the name is trimmed; parameters are kept verbatim so that a
    /// whitespace parameter survives.
    pub fn parse(descriptor: &str) -> Self {
        let mut parts = descriptor.split(PARAM_DELIMITER);
        let name = parts.next().unwrap_or_default().trim().to_string();
        let params = parts.map(str::to_string).collect();

        Self { name, params }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for param in &self.params {
            write!(f, "{}{}", PARAM_DELIMITER, param)?;
        }
        Ok(())
    }
}

/// The configured transformation for one field.
#[derive(Clone)]
pub enum Directive {
    /// Closure applied directly, without chaining or parameter coercion
    Inline(InlineFn),
    /// Ordered steps applied left to right
    Chain(Vec<Step>),
}

impl Directive {
    /// Parse a textual directive into a chain
    ///
    /// Empty segments are skipped, so an empty directive is an empty chain.
    ///
    /// # Example
    ///
    /// ```
    /// use rowfmt::Directive;
    ///
    /// let directive = Directive::parse("wordwrap.100|trim|ucwords");
    /// assert_eq!(directive.steps().unwrap().len(), 3);
    /// ```
    pub fn parse(directive: &str) -> Self {
        let steps = directive
            .split(STEP_DELIMITER)
            .filter(|segment| !segment.trim().is_empty())
            .map(Step::parse)
            .collect();

        Directive::Chain(steps)
    }

    /// Wrap a closure as an inline directive
    pub fn inline<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Directive::Inline(Arc::new(func))
    }

    /// Steps of a chain, `None` for inline directives
    pub fn steps(&self) -> Option<&[Step]> {
        match self {
            Directive::Chain(steps) => Some(steps),
            Directive::Inline(_) => None,
        }
    }
}

impl From<&str> for Directive {
    fn from(directive: &str) -> Self {
        Directive::parse(directive)
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Inline(_) => f.write_str("Inline(<fn>)"),
            Directive::Chain(steps) => f.debug_tuple("Chain").field(steps).finish(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Inline(_) => f.write_str("<inline>"),
            Directive::Chain(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", STEP_DELIMITER)?;
                    }
                    write!(f, "{}", step)?;
                }
                Ok(())
            }
        }
    }
}

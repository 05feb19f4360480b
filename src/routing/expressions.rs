//! Named-expression macro table.
//!
//! Reusable pattern fragments registered once and referenced from patterns
//! as `:name:`. A typical use is a constraint shared by many routes:
//!
//! ```
//! use versioned_router::routing::NamedExpressions;
//!
//! let mut expressions = NamedExpressions::new();
//! expressions.register("num", r"\d+");
//! assert_eq!(
//!     expressions.substitute("/users/:id-(:num:)").unwrap(),
//!     r"/users/:id-(\d+)"
//! );
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::RouteError;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*):").expect("macro token regex is valid")
});

/// String-keyed registry of pattern fragments.
#[derive(Debug, Clone, Default)]
pub struct NamedExpressions {
    fragments: HashMap<String, String>,
}

impl NamedExpressions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a fragment under `name`.
    pub fn register(&mut self, name: impl Into<String>, fragment: impl Into<String>) {
        self.fragments.insert(name.into(), fragment.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fragments.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Replace every `:name:` token with its fragment.
    ///
    /// Fails on the first token whose name was never registered.
    pub fn substitute(&self, pattern: &str) -> Result<String, RouteError> {
        let mut out = String::with_capacity(pattern.len());
        let mut last = 0;
        for caps in TOKEN.captures_iter(pattern) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            out.push_str(&pattern[last..whole.start]);
            out.push_str(self.fragment_for(&caps)?);
            last = whole.end;
        }
        out.push_str(&pattern[last..]);
        Ok(out)
    }

    fn fragment_for(&self, caps: &Captures<'_>) -> Result<&str, RouteError> {
        let name = caps.get(1).map_or("", |m| m.as_str());
        self.get(name)
            .ok_or_else(|| RouteError::UnknownExpression(name.to_string()))
    }
}

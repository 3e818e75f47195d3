//! Path pattern compilation.
//!
//! `/users/:id/posts/:pid` compiles to `^/users/([a-zA-Z0-9_-]+)/posts/([a-zA-Z0-9_-]+)$`.
//! Literal segments are escaped, and the pattern is anchored at both ends so it
//! only ever matches the whole request path.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::context::ParamValues;

/// Character class accepted by a parameter segment, both in the declared
/// name and in the request value.
const PARAM_CLASS: &str = "[a-zA-Z0-9_-]+";

#[allow(clippy::expect_used)]
static PARAM_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:([a-zA-Z0-9_-]+)$").expect("valid parameter segment regex"));

/// Name of a parameter segment (`:name` → `name`), `None` for literal segments.
#[inline]
pub fn param_name(segment: &str) -> Option<&str> {
    PARAM_SEGMENT
        .captures(segment)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// A route path compiled into an anchored matcher.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: Arc<str>,
    regex: Regex,
    param_count: usize,
}

impl PathPattern {
    /// Compile a declared route path.
    ///
    /// Pure and deterministic: the same path always yields an equivalent matcher.
    pub fn compile(path: &str) -> Result<Self, regex::Error> {
        let mut pattern = String::with_capacity(path.len() + 16);
        pattern.push('^');
        let mut param_count = 0;

        for (i, segment) in path.split('/').enumerate() {
            if i > 0 {
                pattern.push('/');
            }
            if param_name(segment).is_some() {
                pattern.push('(');
                pattern.push_str(PARAM_CLASS);
                pattern.push(')');
                param_count += 1;
            } else {
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        let regex = Regex::new(&pattern)?;
        debug!(path = %path, regex = %regex, params = param_count, "Path pattern compiled");

        Ok(Self {
            source: Arc::from(path),
            regex,
            param_count,
        })
    }

    /// The declared path this pattern was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of parameter segments.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Anchored regex backing this pattern.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Match a full request path, returning the parameter captures in order.
    ///
    /// The whole-match capture is dropped; only parameter captures are kept.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamValues> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Compiled patterns keyed by literal path string.
///
/// Routes declaring the same path share one compiled pattern.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: HashMap<String, Arc<PathPattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached pattern for `path`, compiling it on first use.
    pub fn get_or_compile(&mut self, path: &str) -> Result<Arc<PathPattern>, regex::Error> {
        if let Some(p) = self.patterns.get(path) {
            return Ok(Arc::clone(p));
        }
        let compiled = Arc::new(PathPattern::compile(path)?);
        self.patterns.insert(path.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

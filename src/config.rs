//! # Configuration Module
//!
//! Router configuration is loaded from a YAML, JSON or TOML file (chosen by
//! extension) and controls the finalization step applied to every response.
//!
//! ## Default headers
//!
//! After a handler has run, every configured default header is applied to its
//! response. A plain value overwrites whatever the handler set under the same
//! name; a detailed directive may carry several values and opt out of
//! replacement:
//!
//! ```yaml
//! default_headers:
//!   Content-Type: application/json
//!   Vary:
//!     value: [Accept, Origin]
//!     replace: false
//! ```
//!
//! Directives are applied in the order they are declared, so a later entry
//! wins over an earlier one naming the same header in another case
//! (`Content-Type` then `content-type`). TOML tables are read in the order
//! the TOML parser yields them.
//!
//! When no file is given, [`RouterConfig::default`] sets
//! `Content-Type: application/json`.
//!
//! ## Environment Variables
//!
//! Logging is configured separately through `WAYPOINT_LOG_*` variables, see
//! [`crate::logging::LogConfig::from_env`].

use anyhow::Context;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

/// A default header directive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HeaderDirective {
    /// Single value, set with last-write-wins semantics
    Value(String),
    /// One or more values with explicit replace policy
    Detailed {
        /// Values to set, in order
        #[serde(deserialize_with = "one_or_many")]
        value: Vec<String>,
        /// Overwrite existing values under the same name (default `true`)
        #[serde(default = "default_replace")]
        replace: bool,
    },
}

fn default_replace() -> bool {
    true
}

/// Header directives in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDirectives(Vec<(String, HeaderDirective)>);

impl HeaderDirectives {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the directive stored under exactly `name`, or append a new one.
    pub fn insert(&mut self, name: impl Into<String>, directive: HeaderDirective) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = directive,
            None => self.0.push((name, directive)),
        }
    }

    /// Directive stored under exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderDirective> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderDirective)> {
        self.0.iter().map(|(n, d)| (n.as_str(), d))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for HeaderDirectives {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DirectivesVisitor;

        impl<'de> Visitor<'de> for DirectivesVisitor {
            type Value = HeaderDirectives;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header names to directives")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut directives = HeaderDirectives::new();
                while let Some((name, directive)) = map.next_entry::<String, HeaderDirective>()? {
                    directives.insert(name, directive);
                }
                Ok(directives)
            }
        }

        deserializer.deserialize_map(DirectivesVisitor)
    }
}

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Header directives applied to every finalized response, in order
    pub default_headers: HeaderDirectives,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let mut default_headers = HeaderDirectives::new();
        default_headers.insert(
            "Content-Type",
            HeaderDirective::Value("application/json".to_string()),
        );
        Self { default_headers }
    }
}

impl RouterConfig {
    /// Configuration that leaves handler responses untouched.
    #[must_use]
    pub fn without_default_headers() -> Self {
        Self {
            default_headers: HeaderDirectives::new(),
        }
    }

    /// Add a default header directive, or replace the one with the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, directive: HeaderDirective) -> Self {
        self.default_headers.insert(name.into(), directive);
        self
    }

    /// Load configuration from a file.
    ///
    /// `.yaml`/`.yml` are parsed as YAML, `.toml` as TOML and anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        parse_by_extension(path, &content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Deserialize `T` from `content` using the format implied by `path`'s extension.
pub(crate) fn parse_by_extension<T>(path: &Path, content: &str) -> anyhow::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let parsed = match ext.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_json::from_str(content)?,
    };
    Ok(parsed)
}

/// Accept either a single string or a sequence of strings.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

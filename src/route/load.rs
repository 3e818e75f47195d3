use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use super::types::{RouteDescriptor, RouteSource};
use crate::config::{one_or_many, parse_by_extension};

/// Top-level shape of a route file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteFile {
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

/// One entry of a route file: a type reference or a descriptor map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RouteEntry {
    Type(String),
    Descriptor(DescriptorEntry),
}

/// Descriptor map as written in a file. Required keys default to empty so
/// that their absence is reported by route validation, not by the parser.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DescriptorEntry {
    path: String,
    name: String,
    #[serde(deserialize_with = "one_or_many")]
    method: Vec<String>,
    action: Option<String>,
    controller: Option<String>,
    response: Option<String>,
}

impl From<DescriptorEntry> for RouteDescriptor {
    fn from(e: DescriptorEntry) -> Self {
        let mut d = RouteDescriptor::new(e.path, e.name).methods(e.method);
        d.action = e.action;
        d.controller = e.controller;
        if let Some(key) = e.response {
            d = d.response_key(key);
        }
        d
    }
}

impl From<RouteEntry> for RouteSource {
    fn from(entry: RouteEntry) -> Self {
        match entry {
            RouteEntry::Type(key) => RouteSource::Type(key),
            RouteEntry::Descriptor(d) => RouteSource::Descriptor(d.into()),
        }
    }
}

/// Parse route sources from YAML, JSON or TOML text.
///
/// `format` is a file extension (`yaml`, `yml`, `toml`, `json`).
pub fn parse_routes(content: &str, format: &str) -> anyhow::Result<Vec<RouteSource>> {
    let pseudo = Path::new("routes").with_extension(format);
    let file: RouteFile = parse_by_extension(&pseudo, content)?;
    Ok(file.routes.into_iter().map(RouteSource::from).collect())
}

/// Load route sources from a file, in declared order.
///
/// Sources are not validated here; each one is validated when it is added
/// to a [`RouterBuilder`](crate::router::RouterBuilder).
pub fn load_routes(path: impl AsRef<Path>) -> anyhow::Result<Vec<RouteSource>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route file {}", path.display()))?;
    let file: RouteFile = parse_by_extension(path, &content)
        .with_context(|| format!("failed to parse route file {}", path.display()))?;
    Ok(file.routes.into_iter().map(RouteSource::from).collect())
}

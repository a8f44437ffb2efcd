//! Mount point discovery.
//!
//! The hosting platform describes attached volumes in a service-binding blob
//! (usually the `VCAP_SERVICES` JSON). The mount directory is carried in a
//! `container_dir` field somewhere inside it.
//!
//! Resolution is deliberately uncached: callers resolve once per request.

use std::path::PathBuf;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};

lazy_static::lazy_static! {
    static ref CONTAINER_DIR: Regex =
        Regex::new(r#""container_dir": "([^"]+)""#).expect("container_dir pattern is valid");
}

/// Extracts the mount directory from a service-binding blob.
pub trait MountResolver: Send + Sync {
    fn resolve(&self, service_binding: &str) -> Result<PathBuf>;
}

/// Textual extraction of the first `"container_dir": "<value>"` occurrence.
///
/// The blob is treated as opaque text, so this only matches the exact
/// spacing the platform emits.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternResolver;

impl MountResolver for PatternResolver {
    fn resolve(&self, service_binding: &str) -> Result<PathBuf> {
        CONTAINER_DIR
            .captures(service_binding)
            .and_then(|caps| caps.get(1))
            .map(|m| PathBuf::from(m.as_str()))
            .ok_or(Error::MountNotFound)
    }
}

/// Structured lookup of the first string-valued `container_dir` key.
///
/// Objects are searched depth-first in key order, arrays in index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResolver;

impl JsonResolver {
    fn find(value: &Value) -> Option<&str> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(dir)) = map.get("container_dir") {
                    if !dir.is_empty() {
                        return Some(dir.as_str());
                    }
                }
                map.values().find_map(Self::find)
            }
            Value::Array(items) => items.iter().find_map(Self::find),
            _ => None,
        }
    }
}

impl MountResolver for JsonResolver {
    fn resolve(&self, service_binding: &str) -> Result<PathBuf> {
        let value: Value =
            serde_json::from_str(service_binding).map_err(|_| Error::MountNotFound)?;
        Self::find(&value)
            .map(PathBuf::from)
            .ok_or(Error::MountNotFound)
    }
}

/// Resolve the mount path with the default textual pattern.
pub fn resolve_mount_path(service_binding: &str) -> Result<PathBuf> {
    PatternResolver.resolve(service_binding)
}

//! Ignition config validation
//!
//! Ignition configs declare their schema version in `ignition.version`.
//! Versions 2.x and 3.x are checked structurally: section shapes, absolute
//! paths for filesystem nodes, and names for units and users.

use crate::error::{ArtifactError, Result};
use serde_json::{Map, Value};

/// Parsed `ignition.version`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnitionVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub experimental: bool,
}

impl IgnitionVersion {
    /// Parse `MAJOR.MINOR.PATCH` with an optional `-experimental` suffix
    pub fn parse(version: &str) -> Result<Self> {
        let unsupported = || ArtifactError::UnsupportedIgnitionVersion(version.to_string());

        let (number, experimental) = match version.strip_suffix("-experimental") {
            Some(number) => (number, true),
            None => (version, false),
        };

        let parts: Vec<u32> = number
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| unsupported()))
            .collect::<Result<_>>()?;

        let &[major, minor, patch] = parts.as_slice() else {
            return Err(unsupported());
        };

        if !(2..=3).contains(&major) {
            return Err(unsupported());
        }

        Ok(Self {
            major,
            minor,
            patch,
            experimental,
        })
    }
}

impl std::fmt::Display for IgnitionVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.experimental {
            write!(f, "-experimental")?;
        }
        Ok(())
    }
}

/// Validate a rendered Ignition config
///
/// Returns the declared schema version.
pub fn validate_ignition(content: &str) -> Result<IgnitionVersion> {
    let value: Value = serde_json::from_str(content)?;
    let root = as_object(&value, "config")?;

    let version = root
        .get("ignition")
        .and_then(|ignition| ignition.get("version"))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing ignition.version"))?;
    let version = IgnitionVersion::parse(version)?;

    if let Some(storage) = root.get("storage") {
        validate_storage(as_object(storage, "storage")?, version)?;
    }

    if let Some(systemd) = root.get("systemd") {
        let systemd = as_object(systemd, "systemd")?;
        for (i, unit) in entries(systemd, "systemd", "units")?.iter().enumerate() {
            require_name(unit, &format!("systemd.units[{}]", i))?;
        }
    }

    if let Some(passwd) = root.get("passwd") {
        let passwd = as_object(passwd, "passwd")?;
        for (i, user) in entries(passwd, "passwd", "users")?.iter().enumerate() {
            require_name(user, &format!("passwd.users[{}]", i))?;
        }
        for (i, group) in entries(passwd, "passwd", "groups")?.iter().enumerate() {
            require_name(group, &format!("passwd.groups[{}]", i))?;
        }
    }

    Ok(version)
}

fn validate_storage(storage: &Map<String, Value>, version: IgnitionVersion) -> Result<()> {
    for section in ["files", "directories", "links"] {
        for (i, node) in entries(storage, "storage", section)?.iter().enumerate() {
            let field = format!("storage.{}[{}]", section, i);
            let node = as_object(node, &field)?;

            let path = node
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(format!("{}: missing path", field)))?;
            if !path.starts_with('/') {
                return Err(invalid(format!("{}: path '{}' is not absolute", field, path)));
            }

            // Ignition 2.x places nodes on a named filesystem
            if version.major == 2 && !has_text(node, "filesystem") {
                return Err(invalid(format!("{}: missing filesystem", field)));
            }

            if section == "links" && version.major >= 3 && !has_text(node, "target") {
                return Err(invalid(format!("{}: missing target", field)));
            }
        }
    }

    Ok(())
}

/// Array entries of an optional section, e.g. `storage.files`
fn entries<'a>(parent: &'a Map<String, Value>, prefix: &str, key: &str) -> Result<&'a [Value]> {
    match parent.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(invalid(format!("{}.{} must be an array", prefix, key))),
    }
}

fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| invalid(format!("{} must be an object", field)))
}

fn has_text(node: &Map<String, Value>, key: &str) -> bool {
    node.get(key)
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or(false)
}

fn require_name(entry: &Value, field: &str) -> Result<()> {
    if has_text(as_object(entry, field)?, "name") {
        Ok(())
    } else {
        Err(invalid(format!("{}: missing name", field)))
    }
}

fn invalid(message: impl Into<String>) -> ArtifactError {
    ArtifactError::Ignition(message.into())
}

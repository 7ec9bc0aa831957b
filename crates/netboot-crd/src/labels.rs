//! Machine identity labels
//!
//! A booting machine presents itself as a flat set of labels (`mac`, `uuid`,
//! `serial`, `hostname`, or any other query key). Groups select machines by
//! matching against these labels.

use crate::{CrdError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label name carrying the machine's MAC address
pub const MAC_LABEL: &str = "mac";

/// Identity labels presented by one request
///
/// Ordered so that logging and rendered output are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineLabels(BTreeMap<String, String>);

impl MachineLabels {
    /// Create an empty label set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a label, replacing any previous value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a label, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert a label only if no value is present for it yet
    ///
    /// Used for values inferred from the boot protocol, which must not
    /// override labels the machine stated explicitly.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Get a label value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate labels in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for MachineLabels {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for MachineLabels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

/// Parse a MAC address into lowercase, colon-separated form
///
/// Accepts colon or hyphen separators (iPXE's `${mac:hexhyp}` produces the
/// latter).
pub fn parse_mac(mac: &str) -> Result<String> {
    let octets: Vec<&str> = mac.trim().split([':', '-']).collect();

    if octets.len() != 6
        || octets
            .iter()
            .any(|o| o.len() != 2 || !o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return Err(CrdError::InvalidMacAddress(mac.to_string()));
    }

    Ok(octets.join(":").to_lowercase())
}

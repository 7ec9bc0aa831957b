//! Group resource
//!
//! A Group associates a label selector with a Profile and with metadata
//! that templates can reference. A Group with an empty selector matches
//! every machine and acts as the default.

use crate::labels::{parse_mac, MachineLabels, MAC_LABEL};
use crate::{CrdError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Group resource matching machines to a Profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Group {
    /// Unique identifier
    pub id: String,

    /// Human readable name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Identifier of the Profile this Group boots
    pub profile: String,

    /// Required label values; every entry must match
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,

    /// Template variables
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Group {
    /// Create a new Group pointing at a Profile
    pub fn new(id: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            profile: profile.into(),
            ..Default::default()
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a selector entry
    pub fn with_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.selector.insert(key.into(), value.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether every selector entry is present in `labels` with an equal value
    pub fn matches(&self, labels: &MachineLabels) -> bool {
        self.selector
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value.as_str()))
    }

    /// Rewrite a `mac` selector into the canonical form labels use
    ///
    /// A selector value that does not parse as a MAC is left untouched; it
    /// simply never matches a normalized label.
    pub fn normalize(&mut self) {
        if let Some(mac) = self.selector.get_mut(MAC_LABEL) {
            if let Ok(parsed) = parse_mac(mac) {
                *mac = parsed;
            }
        }
    }

    /// Validate the group
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(CrdError::MissingField("id".to_string()));
        }

        if self.profile.is_empty() {
            return Err(CrdError::MissingField("profile".to_string()));
        }

        if let Some(mac) = self.selector.get(MAC_LABEL) {
            parse_mac(mac).map_err(|e| CrdError::InvalidFieldValue {
                field: "selector.mac".to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// Precedence between two Groups: more selector entries first, then id
pub fn by_specificity(a: &Group, b: &Group) -> Ordering {
    b.selector
        .len()
        .cmp(&a.selector.len())
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort Groups into match order (most specific selector first)
pub fn sort_by_specificity(groups: &mut [Group]) {
    groups.sort_by(by_specificity);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_new() {
        let group = Group::new("node1", "worker").with_name("Node 1");
        assert_eq!(group.id, "node1");
        assert_eq!(group.profile, "worker");
        assert_eq!(group.name, "Node 1");
        assert!(group.selector.is_empty());
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let group = Group::new("default", "base");

        assert!(group.matches(&MachineLabels::new()));
        assert!(group.matches(&MachineLabels::new().with("mac", "52:54:00:a1:9c:ae")));
    }

    #[test]
    fn test_selector_requires_all_entries() {
        let group = Group::new("g", "p")
            .with_selector("mac", "52:54:00:a1:9c:ae")
            .with_selector("os", "installed");

        let partial = MachineLabels::new().with("mac", "52:54:00:a1:9c:ae");
        assert!(!group.matches(&partial));

        let full = partial.clone().with("os", "installed").with("extra", "ignored");
        assert!(group.matches(&full));

        let wrong = full.with("os", "fresh");
        assert!(!group.matches(&wrong));
    }

    #[test]
    fn test_normalize_mac_selector() {
        let mut group = Group::new("g", "p").with_selector("mac", "52-54-00-A1-9C-AE");
        group.normalize();
        assert_eq!(group.selector.get("mac").unwrap(), "52:54:00:a1:9c:ae");
    }

    #[test]
    fn test_validate() {
        assert!(Group::new("g", "p").validate().is_ok());
        assert!(matches!(
            Group::new("", "p").validate(),
            Err(CrdError::MissingField(_))
        ));
        assert!(matches!(
            Group::new("g", "").validate(),
            Err(CrdError::MissingField(_))
        ));
        assert!(matches!(
            Group::new("g", "p").with_selector("mac", "nope").validate(),
            Err(CrdError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn test_sort_by_specificity() {
        let mut groups = vec![
            Group::new("default", "base"),
            Group::new("b-region", "p").with_selector("region", "eu"),
            Group::new("node1", "p")
                .with_selector("mac", "52:54:00:a1:9c:ae")
                .with_selector("os", "installed"),
            Group::new("a-region", "p").with_selector("region", "us"),
        ];

        sort_by_specificity(&mut groups);

        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["node1", "a-region", "b-region", "default"]);
    }

    #[test]
    fn test_group_deserialization() {
        let json = r#"{
            "id": "node1",
            "name": "Worker Node",
            "profile": "worker",
            "selector": {"mac": "52:54:00:a1:9c:ae"},
            "metadata": {"etcd_name": "node1", "ssh_authorized_keys": ["ssh-rsa AAAA"]}
        }"#;

        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.profile, "worker");
        assert_eq!(group.selector.get("mac").unwrap(), "52:54:00:a1:9c:ae");
        assert_eq!(group.metadata["etcd_name"], "node1");
        assert!(group.metadata["ssh_authorized_keys"].is_array());
    }
}

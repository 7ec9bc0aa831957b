//! Cloud-init user-data
//!
//! cloud-init accepts user-data either as a `#cloud-config` YAML document or
//! as a script with an interpreter line. Anything else is not executable by
//! the init system and must not be served.

use crate::error::{ArtifactError, Result};

/// First line of a cloud-config document
pub const CLOUD_CONFIG_HEADER: &str = "#cloud-config";

/// Classified user-data
#[derive(Debug, Clone, PartialEq)]
pub enum UserData {
    /// Cloud-config YAML
    CloudConfig(String),

    /// Shell (or other interpreter) script
    Script(String),
}

impl UserData {
    /// Classify and validate rendered user-data
    pub fn parse(content: impl Into<String>) -> Result<Self> {
        let content = content.into();

        if is_cloud_config(&content) {
            validate_cloud_config(&content)?;
            Ok(UserData::CloudConfig(content))
        } else if is_script(&content) {
            Ok(UserData::Script(content))
        } else {
            Err(ArtifactError::UnrecognizedUserData)
        }
    }
}

/// Whether the first line is the cloud-config header
pub fn is_cloud_config(content: &str) -> bool {
    content
        .lines()
        .next()
        .map(|header| header.trim_end() == CLOUD_CONFIG_HEADER)
        .unwrap_or(false)
}

/// Whether the content starts with an interpreter line
pub fn is_script(content: &str) -> bool {
    content.starts_with("#!")
}

/// A cloud-config body must be a YAML mapping (or empty)
fn validate_cloud_config(content: &str) -> Result<()> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ArtifactError::CloudConfig(e.to_string()))?;

    match value {
        serde_yaml::Value::Mapping(_) | serde_yaml::Value::Null => Ok(()),
        _ => Err(ArtifactError::CloudConfig(
            "top level must be a mapping".to_string(),
        )),
    }
}

//! Error types for artifact validation

use netboot_script::ScriptError;
use thiserror::Error;

/// Error type for artifact validation
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// User-data is neither a cloud-config document nor a script
    #[error("user-data is neither a cloud-config document nor a script")]
    UnrecognizedUserData,

    /// Cloud-config body does not parse
    #[error("invalid cloud-config: {0}")]
    CloudConfig(String),

    /// Ignition config violates its schema
    #[error("invalid Ignition config: {0}")]
    Ignition(String),

    /// Ignition config declares a version this server cannot check
    #[error("unsupported Ignition version: {0}")]
    UnsupportedIgnitionVersion(String),

    /// Boot script fails its boot loader grammar
    #[error("invalid boot script: {0}")]
    Script(#[from] ScriptError),

    /// Content is not JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for artifact operations
pub type Result<T> = std::result::Result<T, ArtifactError>;

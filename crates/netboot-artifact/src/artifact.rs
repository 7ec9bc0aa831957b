//! Rendered artifacts
//!
//! A `RenderedArtifact` is template output that has not been checked yet.
//! The only way to obtain a servable `Artifact` is `RenderedArtifact::validate`,
//! so malformed content cannot reach a response body.

use crate::cloud::UserData;
use crate::error::Result;
use crate::ignition::validate_ignition;
use netboot_script::{validate_grub, validate_ipxe};

/// Declared kind of rendered content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Cloud-config document or user-data script
    CloudConfig,
    /// Ignition config (JSON)
    Ignition,
    /// iPXE script
    Ipxe,
    /// GRUB config
    Grub,
    /// Pixiecore boot document (JSON)
    Pixiecore,
    /// Key/value metadata
    Metadata,
}

impl ArtifactKind {
    /// HTTP content type for this kind
    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Ignition | ArtifactKind::Pixiecore => "application/json",
            ArtifactKind::CloudConfig
            | ArtifactKind::Ipxe
            | ArtifactKind::Grub
            | ArtifactKind::Metadata => "text/plain; charset=utf-8",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::CloudConfig => "cloud-config",
            ArtifactKind::Ignition => "ignition",
            ArtifactKind::Ipxe => "ipxe",
            ArtifactKind::Grub => "grub",
            ArtifactKind::Pixiecore => "pixiecore",
            ArtifactKind::Metadata => "metadata",
        };
        f.write_str(name)
    }
}

/// Rendered, not yet validated content
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    kind: ArtifactKind,
    content: String,
}

impl RenderedArtifact {
    pub fn new(kind: ArtifactKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Apply the format check for this kind
    pub fn validate(self) -> Result<Artifact> {
        match self.kind {
            ArtifactKind::CloudConfig => {
                UserData::parse(self.content.as_str())?;
            }
            ArtifactKind::Ignition => {
                validate_ignition(&self.content)?;
            }
            ArtifactKind::Ipxe => validate_ipxe(&self.content)?,
            ArtifactKind::Grub => validate_grub(&self.content)?,
            ArtifactKind::Pixiecore => {
                serde_json::from_str::<serde_json::Value>(&self.content)?;
            }
            ArtifactKind::Metadata => {}
        }

        Ok(Artifact {
            kind: self.kind,
            content: self.content,
        })
    }
}

/// Validated content, safe to serve
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    kind: ArtifactKind,
    content: String,
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.content.into_bytes()
    }
}

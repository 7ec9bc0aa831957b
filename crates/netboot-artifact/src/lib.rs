//! Netboot artifact validation
//!
//! Every artifact the config server renders passes through this crate before
//! it is served. Content that fails the check for its kind is rejected.
//!
//! # Kinds
//!
//! - Cloud-config / user-data scripts (`#cloud-config` YAML or `#!` scripts)
//! - Ignition configs (JSON, versions 2.x and 3.x)
//! - iPXE and GRUB scripts (boot loader grammar)
//! - Pixiecore boot documents (JSON)
//! - Metadata (key/value text, unchecked)
//!
//! # Example
//!
//! ```
//! use netboot_artifact::{ArtifactKind, RenderedArtifact};
//!
//! let rendered = RenderedArtifact::new(
//!     ArtifactKind::CloudConfig,
//!     "#cloud-config\nhostname: node1\n",
//! );
//! let artifact = rendered.validate().unwrap();
//! assert_eq!(artifact.content(), "#cloud-config\nhostname: node1\n");
//!
//! let prose = RenderedArtifact::new(ArtifactKind::CloudConfig, "just some words");
//! assert!(prose.validate().is_err());
//! ```

pub mod artifact;
pub mod cloud;
pub mod error;
pub mod ignition;
pub mod metadata;

pub use artifact::{Artifact, ArtifactKind, RenderedArtifact};
pub use cloud::UserData;
pub use error::{ArtifactError, Result};
pub use ignition::{validate_ignition, IgnitionVersion};
pub use metadata::render_metadata;

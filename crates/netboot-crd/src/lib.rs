//! Netboot resource types
//!
//! This crate provides the resources the config server resolves machines
//! against.
//!
//! # Resources
//!
//! - `Group` - Label selector pointing at a Profile, plus template metadata
//! - `Profile` - Boot parameters and provisioning artifact references
//! - `MachineLabels` - Identity labels a booting machine presents
//!
//! # Example
//!
//! ```
//! use netboot_crd::{Group, MachineLabels};
//!
//! let group = Group::new("node1", "worker")
//!     .with_selector("mac", "52:54:00:a1:9c:ae");
//!
//! let labels = MachineLabels::new().with("mac", "52:54:00:a1:9c:ae");
//! assert!(group.matches(&labels));
//! ```

pub mod error;
pub mod group;
pub mod labels;
pub mod profile;

pub use error::*;
pub use group::*;
pub use labels::*;
pub use profile::*;

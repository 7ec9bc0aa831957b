//! Profile resource
//!
//! A Profile bundles the network boot parameters (kernel, initrd, kernel
//! arguments) with references to the provisioning artifacts a machine
//! fetches once it is running (Ignition config, cloud-config).

use crate::{CrdError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Profile {
    /// Unique identifier
    pub id: String,

    /// Human readable name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Network boot parameters
    #[serde(default)]
    pub boot: BootSpec,

    /// Cloud-config template served at `/cloud`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,

    /// Ignition template served at `/ignition`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignition_id: Option<String>,

    /// Store template replacing the built-in iPXE boot script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipxe_template: Option<String>,

    /// Store template replacing the built-in GRUB menu
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grub_template: Option<String>,

    /// Template variables
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Profile {
    /// Create a new Profile
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the boot parameters
    pub fn with_boot(mut self, boot: BootSpec) -> Self {
        self.boot = boot;
        self
    }

    /// Set the cloud-config template
    pub fn with_cloud(mut self, id: impl Into<String>) -> Self {
        self.cloud_id = Some(id.into());
        self
    }

    /// Set the Ignition template
    pub fn with_ignition(mut self, id: impl Into<String>) -> Self {
        self.ignition_id = Some(id.into());
        self
    }

    /// Set a custom iPXE template
    pub fn with_ipxe_template(mut self, id: impl Into<String>) -> Self {
        self.ipxe_template = Some(id.into());
        self
    }

    /// Set a custom GRUB template
    pub fn with_grub_template(mut self, id: impl Into<String>) -> Self {
        self.grub_template = Some(id.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Validate the profile
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(CrdError::MissingField("id".to_string()));
        }

        Ok(())
    }
}

/// Kernel, initrd and command line for network boot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BootSpec {
    /// Kernel URL or path
    #[serde(default)]
    pub kernel: String,

    /// Initrd URLs or paths, loaded in order
    #[serde(default)]
    pub initrd: Vec<String>,

    /// Kernel arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl BootSpec {
    /// Boot parameters for a kernel
    pub fn new(kernel: impl Into<String>) -> Self {
        Self {
            kernel: kernel.into(),
            ..Default::default()
        }
    }

    /// Add an initrd
    pub fn with_initrd(mut self, initrd: impl Into<String>) -> Self {
        self.initrd.push(initrd.into());
        self
    }

    /// Add a kernel argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Kernel command line
    pub fn cmdline(&self) -> String {
        self.args.join(" ")
    }
}

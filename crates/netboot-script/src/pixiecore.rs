//! Pixiecore API boot documents
//!
//! In API mode Pixiecore asks `/v1/boot/<mac>` what a machine should boot
//! and expects a JSON document naming the kernel, initrds and command line.

use crate::error::{Result, ScriptError};
use netboot_crd::BootSpec;
use serde::{Deserialize, Serialize};

/// Boot document returned to Pixiecore
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PixiecoreBoot {
    /// Kernel URL
    pub kernel: String,

    /// Initrd URLs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initrd: Vec<String>,

    /// Kernel command line
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cmdline: String,
}

impl PixiecoreBoot {
    /// Build the document for a Profile's boot parameters
    pub fn from_boot(boot: &BootSpec) -> Self {
        Self {
            kernel: boot.kernel.clone(),
            initrd: boot.initrd.clone(),
            cmdline: boot.cmdline(),
        }
    }

    /// Pixiecore cannot boot a document without a kernel
    pub fn validate(&self) -> Result<()> {
        if self.kernel.trim().is_empty() {
            return Err(ScriptError::MissingKernel);
        }
        Ok(())
    }
}

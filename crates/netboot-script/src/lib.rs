//! Netboot boot script support
//!
//! This crate holds the built-in boot loader templates served to machines
//! during network boot, and the grammar checks applied to every rendered
//! script before it leaves the server.
//!
//! # Protocols
//!
//! - **iPXE**: inspect script for unidentified machines, Profile boot script
//! - **GRUB**: Profile menu entry
//! - **Pixiecore**: JSON boot document for the Pixiecore API
//!
//! # Example
//!
//! ```
//! use netboot_script::{inspect_script, validate_ipxe};
//!
//! let script = inspect_script();
//! assert!(script.starts_with("#!ipxe"));
//! assert!(validate_ipxe(script).is_ok());
//! ```

pub mod error;
pub mod grub;
pub mod ipxe;
pub mod pixiecore;

pub use error::*;
pub use grub::*;
pub use ipxe::*;
pub use pixiecore::*;

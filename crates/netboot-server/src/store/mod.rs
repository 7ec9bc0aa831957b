//! Storage backends for netboot
//!
//! This module provides the `Store` trait and its implementations:
//! - `MemoryStore` - In-memory storage for testing and embedding
//! - `FileStore` - Directory of JSON resources and template files
//!
//! The config server only ever reads from a Store. Groups are returned in
//! match order: most specific selector first, ties broken by Group id.

mod file;
mod memory;
#[cfg(test)]
mod tests;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use netboot_crd::{Group, Profile};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Read access to Groups, Profiles and templates
///
/// The trait is object-safe and can be used with `Arc<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    /// List all Groups in match order
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Get a Profile by id
    async fn get_profile(&self, id: &str) -> Result<Option<Profile>>;

    /// Get a boot script template by id
    async fn get_template(&self, id: &str) -> Result<Option<String>>;

    /// Get an Ignition template by id
    async fn get_ignition(&self, id: &str) -> Result<Option<String>>;

    /// Get a cloud-config template by id
    async fn get_cloud_config(&self, id: &str) -> Result<Option<String>>;
}

/// Storage configuration
#[derive(Debug, Clone, Default)]
pub enum StoreConfig {
    /// In-memory storage (starts empty)
    #[default]
    Memory,

    /// Resource directory
    File { path: PathBuf },
}

/// Create a store from configuration
pub fn create_store(config: &StoreConfig) -> Arc<dyn Store> {
    match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::File { path } => Arc::new(FileStore::new(path)),
    }
}

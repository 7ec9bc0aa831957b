//! In-memory storage backend
//!
//! Simple storage for testing and for embedding the server with resources
//! built in code.

use super::{Result, Store, StoreError};
use async_trait::async_trait;
use netboot_crd::{sort_by_specificity, Group, Profile};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory storage backend
pub struct MemoryStore {
    groups: RwLock<HashMap<String, Group>>,
    profiles: RwLock<HashMap<String, Profile>>,
    templates: RwLock<HashMap<String, String>>,
    ignition: RwLock<HashMap<String, String>>,
    cloud: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            templates: RwLock::new(HashMap::new()),
            ignition: RwLock::new(HashMap::new()),
            cloud: RwLock::new(HashMap::new()),
        }
    }

    /// Add a Group while building the store
    pub fn with_group(mut self, mut group: Group) -> Self {
        group.normalize();
        self.groups
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group.id.clone(), group);
        self
    }

    /// Add a Profile while building the store
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.id.clone(), profile);
        self
    }

    /// Add a boot script template while building the store
    pub fn with_template(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.templates
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), content.into());
        self
    }

    /// Add an Ignition template while building the store
    pub fn with_ignition(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.ignition
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), content.into());
        self
    }

    /// Add a cloud-config template while building the store
    pub fn with_cloud_config(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.cloud
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), content.into());
        self
    }

    /// Store or replace a Group
    pub fn put_group(&self, mut group: Group) -> Result<()> {
        group.normalize();
        group
            .validate()
            .map_err(|e| StoreError::InvalidData(format!("group {}: {}", group.id, e)))?;

        let mut guard = self.groups.write().map_err(|e| {
            StoreError::Lock(format!("lock poisoned: {}", e))
        })?;
        guard.insert(group.id.clone(), group);
        Ok(())
    }

    /// Store or replace a Profile
    pub fn put_profile(&self, profile: Profile) -> Result<()> {
        profile
            .validate()
            .map_err(|e| StoreError::InvalidData(format!("profile {}: {}", profile.id, e)))?;

        let mut guard = self.profiles.write().map_err(|e| {
            StoreError::Lock(format!("lock poisoned: {}", e))
        })?;
        guard.insert(profile.id.clone(), profile);
        Ok(())
    }

    /// Remove a Group
    pub fn delete_group(&self, id: &str) -> Result<()> {
        let mut guard = self.groups.write().map_err(|e| {
            StoreError::Lock(format!("lock poisoned: {}", e))
        })?;
        guard.remove(id);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_text(map: &RwLock<HashMap<String, String>>, id: &str) -> Result<Option<String>> {
    let guard = map.read().map_err(|e| {
        StoreError::Lock(format!("lock poisoned: {}", e))
    })?;
    Ok(guard.get(id).cloned())
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        let guard = self.groups.read().map_err(|e| {
            StoreError::Lock(format!("lock poisoned: {}", e))
        })?;
        let mut groups: Vec<Group> = guard.values().cloned().collect();
        sort_by_specificity(&mut groups);
        Ok(groups)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let guard = self.profiles.read().map_err(|e| {
            StoreError::Lock(format!("lock poisoned: {}", e))
        })?;
        Ok(guard.get(id).cloned())
    }

    async fn get_template(&self, id: &str) -> Result<Option<String>> {
        read_text(&self.templates, id)
    }

    async fn get_ignition(&self, id: &str) -> Result<Option<String>> {
        read_text(&self.ignition, id)
    }

    async fn get_cloud_config(&self, id: &str) -> Result<Option<String>> {
        read_text(&self.cloud, id)
    }
}

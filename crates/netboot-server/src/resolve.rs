//! Group resolution and Profile loading

use crate::store::{Result, Store};
use netboot_crd::{Group, MachineLabels, Profile};
use std::sync::Arc;
use tracing::debug;

/// First Group in `groups` whose selector matches `labels`
///
/// `groups` must already be in match order, as returned by a Store.
pub fn find_match<'a>(groups: &'a [Group], labels: &MachineLabels) -> Option<&'a Group> {
    groups.iter().find(|group| group.matches(labels))
}

/// Looks up Groups and Profiles for a request
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn Store>,
}

impl Resolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The Group that applies to a machine, if any
    pub async fn resolve_group(&self, labels: &MachineLabels) -> Result<Option<Group>> {
        let groups = self.store.list_groups().await?;
        let group = find_match(&groups, labels).cloned();
        if let Some(group) = &group {
            debug!(group = %group.id, labels = %labels, "Matched group");
        }
        Ok(group)
    }

    /// Load a Profile by id
    pub async fn load_profile(&self, id: &str) -> Result<Option<Profile>> {
        self.store.get_profile(id).await
    }
}

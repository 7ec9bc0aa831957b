//! Directory-backed storage
//!
//! Layout under the data directory:
//!
//! ```text
//! groups/<id>.json      Group resources
//! profiles/<id>.json    Profile resources
//! templates/<id>        boot script templates
//! ignition/<id>         Ignition templates
//! cloud/<id>            cloud-config templates
//! ```
//!
//! Files are read on every call, so edits take effect on the next request
//! without a restart.

use super::{Result, Store, StoreError};
use async_trait::async_trait;
use netboot_crd::{sort_by_specificity, Group, Profile};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const GROUPS_DIR: &str = "groups";
const PROFILES_DIR: &str = "profiles";
const TEMPLATES_DIR: &str = "templates";
const IGNITION_DIR: &str = "ignition";
const CLOUD_DIR: &str = "cloud";

/// Storage reading resources from a directory tree
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path of a resource file, refusing ids that escape the directory
    fn resource_path(&self, dir: &str, id: &str) -> Result<PathBuf> {
        if id.is_empty()
            || id == "."
            || id == ".."
            || id.contains('/')
            || id.contains('\\')
            || id.contains('\0')
        {
            return Err(StoreError::InvalidData(format!("invalid resource id: {:?}", id)));
        }
        Ok(self.root.join(dir).join(id))
    }

    async fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Resource file not found");
                Ok(None)
            }
            Err(e) => Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    async fn read_text(&self, dir: &str, id: &str) -> Result<Option<String>> {
        let path = self.resource_path(dir, id)?;
        Self::read_optional(&path).await
    }
}

#[async_trait]
impl Store for FileStore {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        let dir = self.root.join(GROUPS_DIR);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(format!("{}: {}", dir.display(), e))),
        };

        let mut groups = Vec::new();
        let mut seen = HashSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", dir.display(), e)))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
            let mut group: Group = serde_json::from_str(&content).map_err(|e| {
                StoreError::Serialization(format!("{}: {}", path.display(), e))
            })?;
            group.normalize();
            group
                .validate()
                .map_err(|e| StoreError::InvalidData(format!("{}: {}", path.display(), e)))?;
            if !seen.insert(group.id.clone()) {
                return Err(StoreError::InvalidData(format!(
                    "{}: duplicate group id {}",
                    path.display(),
                    group.id
                )));
            }
            groups.push(group);
        }

        sort_by_specificity(&mut groups);
        Ok(groups)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let path = self.resource_path(PROFILES_DIR, &format!("{}.json", id))?;
        let Some(content) = Self::read_optional(&path).await? else {
            return Ok(None);
        };

        let profile: Profile = serde_json::from_str(&content)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))?;
        profile
            .validate()
            .map_err(|e| StoreError::InvalidData(format!("{}: {}", path.display(), e)))?;
        Ok(Some(profile))
    }

    async fn get_template(&self, id: &str) -> Result<Option<String>> {
        self.read_text(TEMPLATES_DIR, id).await
    }

    async fn get_ignition(&self, id: &str) -> Result<Option<String>> {
        self.read_text(IGNITION_DIR, id).await
    }

    async fn get_cloud_config(&self, id: &str) -> Result<Option<String>> {
        self.read_text(CLOUD_DIR, id).await
    }
}

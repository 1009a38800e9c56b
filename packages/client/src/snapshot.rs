//! Last successfully fetched resource list, kept on disk for offline use.
//!
//! A single JSON file slot, overwritten on every successful fetch. The
//! default location is `data/client/last_resources.json` under the
//! project root; `RESOURCE_MAP_SNAPSHOT_PATH` overrides it.

use std::path::{Path, PathBuf};

use resource_map_resource_models::Resource;

use crate::ClientError;

/// Environment variable overriding the snapshot location.
pub const SNAPSHOT_PATH_ENV: &str = "RESOURCE_MAP_SNAPSHOT_PATH";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory if the manifest is not nested as expected.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the default snapshot path.
#[must_use]
pub fn default_path() -> PathBuf {
    project_root()
        .join("data")
        .join("client")
        .join("last_resources.json")
}

/// A single-slot JSON snapshot of resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at `RESOURCE_MAP_SNAPSHOT_PATH`, or the default
    /// path when unset.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(SNAPSHOT_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| Self::new(default_path()), Self::new)
    }

    /// Returns the file backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the file exists but cannot be read or
    /// does not hold a resource list.
    pub fn load(&self) -> Result<Option<Vec<Resource>>, ClientError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Replaces the snapshot with `resources`.
    ///
    /// Writes to a sibling temp file and renames it over the slot so a
    /// crash never leaves a half-written snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the directory or file cannot be written.
    pub fn save(&self, resources: &[Resource]) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(resources)?)?;
        std::fs::rename(&tmp, &self.path)?;

        log::debug!("Saved {} resources to {}", resources.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use resource_map_resource_models::ResourceCategory;

    use super::*;

    pub fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "resource_map_client_{}_{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    pub fn shelter() -> Resource {
        Resource {
            id: "node-7".to_string(),
            name: "Harbour Shelter".to_string(),
            category: ResourceCategory::Shelter,
            address: "12 Lake Rd Oakville".to_string(),
            phone: "N/A".to_string(),
            hours: "24/7".to_string(),
            wheelchair: true,
            lat: 43.44,
            lng: -79.67,
        }
    }

    #[test]
    fn missing_file_is_none() {
        let store = SnapshotStore::new(scratch_dir("missing").join("last.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_overwrites_single_slot() {
        let store = SnapshotStore::new(scratch_dir("slot").join("nested").join("last.json"));

        store.save(&[shelter(), shelter()]).unwrap();
        assert_eq!(store.load().unwrap().unwrap().len(), 2);

        store.save(&[shelter()]).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), vec![shelter()]);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("last.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(SnapshotStore::new(path).load().is_err());
    }

    #[test]
    fn default_path_is_under_data() {
        let path = default_path();
        assert!(path.ends_with("data/client/last_resources.json"));
    }
}

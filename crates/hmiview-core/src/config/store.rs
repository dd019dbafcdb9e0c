// ── Atomically replaceable catalog ──

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use super::HmiConfig;
use super::loader::load_from_dir;
use crate::error::HmiError;

/// Holds the live catalog. Readers get a cheap `Arc` snapshot; a reload
/// either swaps in a fully built replacement or leaves the live copy alone.
pub struct ConfigStore {
    current: ArcSwap<HmiConfig>,
}

impl ConfigStore {
    pub fn new(config: HmiConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Load the catalog from `root`.
    pub fn load(root: &Path) -> Result<Self, HmiError> {
        Ok(Self::new(load_from_dir(root)?))
    }

    /// Current snapshot.
    pub fn get(&self) -> Arc<HmiConfig> {
        self.current.load_full()
    }

    /// Re-read the catalog from `root` and swap it in.
    pub fn reload(&self, root: &Path) -> Result<Arc<HmiConfig>, HmiError> {
        match load_from_dir(root) {
            Ok(config) => {
                let config = Arc::new(config);
                self.current.store(Arc::clone(&config));
                info!(
                    root = %root.display(),
                    modes = config.modes.len(),
                    maps = config.maps.len(),
                    vehicles = config.vehicles.len(),
                    "catalog reloaded"
                );
                Ok(config)
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "catalog reload failed, keeping previous");
                Err(e)
            }
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(HmiConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use super::*;

    #[test]
    fn failed_reload_keeps_previous_catalog() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("modes/mkz_standard")).unwrap();
        fs::write(dir.path().join("modes/mkz_standard/close_loop.launch"), "").unwrap();

        let store = ConfigStore::load(dir.path()).unwrap();
        let before = store.get();
        assert!(before.mode("Mkz Standard").is_some());

        let missing = dir.path().join("does-not-exist");
        assert!(store.reload(&missing).is_err());
        assert_eq!(*store.get(), *before);
    }

    #[test]
    fn reload_replaces_catalog() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("modes/mkz_standard")).unwrap();
        let store = ConfigStore::load(dir.path()).unwrap();
        assert!(store.get().mode("Dev Kit").is_none());

        fs::create_dir_all(dir.path().join("modes/dev_kit")).unwrap();
        store.reload(dir.path()).unwrap();
        assert!(store.get().mode("Dev Kit").is_some());
    }

    #[test]
    fn reload_derives_launch_names_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let store = ConfigStore::default();

        fs::create_dir_all(root.join("modes/mkz_standard")).unwrap();
        fs::write(root.join("modes/mkz_standard/close_loop.launch"), "").unwrap();
        fs::write(root.join("modes/mkz_standard/map_collection.launch"), "").unwrap();
        store.reload(root).unwrap();

        let config = store.get();
        let mode = config.mode("Mkz Standard").unwrap();
        assert_eq!(
            mode.launches,
            BTreeMap::from([
                (
                    "Close Loop".to_string(),
                    root.join("modes/mkz_standard/close_loop.launch")
                ),
                (
                    "Map Collection".to_string(),
                    root.join("modes/mkz_standard/map_collection.launch")
                ),
            ])
        );
    }

    #[test]
    fn snapshots_outlive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::default();
        let old = store.get();

        fs::create_dir_all(dir.path().join("modes")).unwrap();
        fs::create_dir_all(dir.path().join("maps/sunnyvale")).unwrap();
        store.reload(dir.path()).unwrap();

        assert!(old.maps.is_empty());
        assert!(store.get().has_map("Sunnyvale"));
    }
}

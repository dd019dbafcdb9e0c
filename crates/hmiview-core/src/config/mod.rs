// ── Catalog of known modes, maps, vehicles and components ──
//
// Loaded once from a directory tree and then read-only. A reload builds a
// complete replacement before swapping it in.

mod loader;
mod store;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;

pub use loader::{load_from_dir, title_case};
pub use store::ConfigStore;

/// Which component table a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentKind {
    Module,
    Hardware,
    Tool,
}

/// A mode and the launches it groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Source directory of the mode.
    pub path: PathBuf,
    /// Launch name -> launch file.
    pub launches: BTreeMap<String, PathBuf>,
    /// Launch selected and started when the mode is entered.
    pub default_launch: Option<String>,
}

/// Command templates for a module, hardware device or tool. Opaque to the
/// engine; handed to the command runner untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(default)]
    pub supported_commands: BTreeMap<String, String>,
}

/// Immutable catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmiConfig {
    pub modes: BTreeMap<String, ModeConfig>,
    /// Map name -> map data directory.
    pub maps: BTreeMap<String, PathBuf>,
    /// Vehicle name -> vehicle profile directory.
    pub vehicles: BTreeMap<String, PathBuf>,
    pub modules: BTreeMap<String, ComponentConfig>,
    pub hardware: BTreeMap<String, ComponentConfig>,
    pub tools: BTreeMap<String, ComponentConfig>,
}

impl HmiConfig {
    pub fn mode(&self, name: &str) -> Option<&ModeConfig> {
        self.modes.get(name)
    }

    pub fn has_map(&self, name: &str) -> bool {
        self.maps.contains_key(name)
    }

    pub fn has_vehicle(&self, name: &str) -> bool {
        self.vehicles.contains_key(name)
    }

    /// The component table for `kind`.
    pub fn components(&self, kind: ComponentKind) -> &BTreeMap<String, ComponentConfig> {
        match kind {
            ComponentKind::Module => &self.modules,
            ComponentKind::Hardware => &self.hardware,
            ComponentKind::Tool => &self.tools,
        }
    }

    /// Launch file for `launch` within `mode`, if both exist.
    pub fn launch_file(&self, mode: &str, launch: &str) -> Option<&PathBuf> {
        self.mode(mode)?.launches.get(launch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HmiConfig {
        let mut config = HmiConfig::default();
        let mut mode = ModeConfig::default();
        mode.launches
            .insert("Close Loop".into(), PathBuf::from("/m/close_loop.launch"));
        config.modes.insert("Mkz Standard".into(), mode);
        config.tools.insert("Recorder".into(), ComponentConfig::default());
        config
    }

    #[test]
    fn launch_file_requires_both_names() {
        let config = sample();
        assert!(config.launch_file("Mkz Standard", "Close Loop").is_some());
        assert!(config.launch_file("Mkz Standard", "Map Collection").is_none());
        assert!(config.launch_file("Lincoln", "Close Loop").is_none());
    }

    #[test]
    fn components_selects_table_by_kind() {
        let config = sample();
        assert!(config.components(ComponentKind::Tool).contains_key("Recorder"));
        assert!(config.components(ComponentKind::Module).is_empty());
        assert!(config.components(ComponentKind::Hardware).is_empty());
    }
}

// ── Catalog loader ──
//
// Layout:
//
//   <root>/hmi.toml              modules / hardware / tools (optional)
//   <root>/modes/<mode>/*.launch one launch per file
//   <root>/modes/<mode>/mode.toml default_launch (optional)
//   <root>/maps/<map>/           (optional)
//   <root>/vehicles/<vehicle>/   (optional)
//
// `modes/mkz_standard/close_loop.launch` becomes mode "Mkz Standard" with
// launch "Close Loop".

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{ComponentConfig, HmiConfig, ModeConfig};
use crate::error::HmiError;

const MANIFEST_FILE: &str = "hmi.toml";
const MODE_MANIFEST_FILE: &str = "mode.toml";
const LAUNCH_EXTENSION: &str = "launch";

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    modules: BTreeMap<String, ComponentConfig>,
    #[serde(default)]
    hardware: BTreeMap<String, ComponentConfig>,
    #[serde(default)]
    tools: BTreeMap<String, ComponentConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ModeManifest {
    default_launch: Option<String>,
}

/// Turn a directory or file base name into a display name: underscores
/// become spaces and the first letter of each word is upper-cased.
///
/// `mkz_standard` -> `Mkz Standard`, `close_loop` -> `Close Loop`.
pub fn title_case(raw: &str) -> String {
    raw.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Build a complete catalog from `root`. Nothing is returned unless every
/// entry was read and parsed.
pub fn load_from_dir(root: &Path) -> Result<HmiConfig, HmiError> {
    if !root.is_dir() {
        return Err(HmiError::config(root, "catalog root is not a directory"));
    }

    let manifest = read_manifest(&root.join(MANIFEST_FILE))?;

    let modes_dir = root.join("modes");
    if !modes_dir.is_dir() {
        return Err(HmiError::config(&modes_dir, "missing modes directory"));
    }
    let mut modes = BTreeMap::new();
    for (name, path) in named_entries(&modes_dir, EntryKind::Dir)? {
        let mode = load_mode(&path)?;
        debug!(mode = %name, launches = mode.launches.len(), "loaded mode");
        modes.insert(name, mode);
    }

    let maps = optional_dirs(&root.join("maps"))?;
    let vehicles = optional_dirs(&root.join("vehicles"))?;

    Ok(HmiConfig {
        modes,
        maps,
        vehicles,
        modules: manifest.modules,
        hardware: manifest.hardware,
        tools: manifest.tools,
    })
}

fn read_manifest(path: &Path) -> Result<Manifest, HmiError> {
    if !path.exists() {
        return Ok(Manifest::default());
    }
    let raw = fs::read_to_string(path).map_err(|e| HmiError::config(path, e.to_string()))?;
    toml::from_str(&raw).map_err(|e| HmiError::config(path, e.to_string()))
}

fn load_mode(dir: &Path) -> Result<ModeConfig, HmiError> {
    let launches = named_entries(dir, EntryKind::LaunchFile)?;

    let manifest_path = dir.join(MODE_MANIFEST_FILE);
    let manifest: ModeManifest = if manifest_path.exists() {
        let raw = fs::read_to_string(&manifest_path)
            .map_err(|e| HmiError::config(&manifest_path, e.to_string()))?;
        toml::from_str(&raw).map_err(|e| HmiError::config(&manifest_path, e.to_string()))?
    } else {
        ModeManifest::default()
    };

    // Accept either the file stem or the derived display name.
    let default_launch = match manifest.default_launch {
        Some(raw) => {
            let name = if launches.contains_key(&raw) {
                raw
            } else {
                title_case(&raw)
            };
            if !launches.contains_key(&name) {
                return Err(HmiError::config(
                    &manifest_path,
                    format!("default_launch '{name}' is not a launch of this mode"),
                ));
            }
            Some(name)
        }
        None => None,
    };

    Ok(ModeConfig {
        path: dir.to_path_buf(),
        launches,
        default_launch,
    })
}

fn optional_dirs(dir: &Path) -> Result<BTreeMap<String, PathBuf>, HmiError> {
    if !dir.exists() {
        return Ok(BTreeMap::new());
    }
    named_entries(dir, EntryKind::Dir)
}

#[derive(Clone, Copy)]
enum EntryKind {
    Dir,
    LaunchFile,
}

/// List entries of `dir` of the given kind, keyed by derived display name.
fn named_entries(dir: &Path, kind: EntryKind) -> Result<BTreeMap<String, PathBuf>, HmiError> {
    let entries = fs::read_dir(dir).map_err(|e| HmiError::config(dir, e.to_string()))?;
    let mut named = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| HmiError::config(dir, e.to_string()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| HmiError::config(&path, e.to_string()))?;

        let base = match kind {
            EntryKind::Dir if file_type.is_dir() => path.file_name(),
            EntryKind::LaunchFile
                if file_type.is_file()
                    && path.extension().is_some_and(|ext| ext == LAUNCH_EXTENSION) =>
            {
                path.file_stem()
            }
            _ => continue,
        };
        let Some(base) = base.and_then(|b| b.to_str()) else {
            return Err(HmiError::config(&path, "entry name is not valid UTF-8"));
        };
        if base.starts_with('.') {
            continue;
        }

        let name = title_case(base);
        if let Some(previous) = named.insert(name.clone(), path.clone()) {
            return Err(HmiError::config(
                &path,
                format!("name '{name}' also derived from {}", previous.display()),
            ));
        }
    }

    Ok(named)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ComponentKind;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn title_case_examples() {
        assert_eq!(title_case("mkz_standard"), "Mkz Standard");
        assert_eq!(title_case("close_loop"), "Close Loop");
        assert_eq!(title_case("map_collection"), "Map Collection");
        assert_eq!(title_case("sunnyvale"), "Sunnyvale");
        assert_eq!(title_case("dev_kit_v2"), "Dev Kit V2");
    }

    #[test]
    fn title_case_keeps_empty_words() {
        assert_eq!(title_case("a__b"), "A  B");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn loads_modes_maps_and_vehicles() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("modes/mkz_standard/close_loop.launch"));
        touch(&root.join("modes/mkz_standard/map_collection.launch"));
        touch(&root.join("modes/mkz_standard/README.md"));
        fs::create_dir_all(root.join("maps/san_mateo")).unwrap();
        fs::create_dir_all(root.join("vehicles/mkz_example")).unwrap();

        let config = load_from_dir(root).unwrap();
        let mode = config.mode("Mkz Standard").unwrap();
        assert_eq!(mode.path, root.join("modes/mkz_standard"));
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
        assert!(mode.default_launch.is_none());
        assert_eq!(
            config.maps.get("San Mateo"),
            Some(&root.join("maps/san_mateo"))
        );
        assert!(config.has_vehicle("Mkz Example"));
    }

    #[test]
    fn reads_component_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("modes")).unwrap();
        fs::write(
            root.join(MANIFEST_FILE),
            r#"
[modules.Planning.supported_commands]
start = "scripts/planning.sh start"
stop = "scripts/planning.sh stop"

[hardware.GPS.supported_commands]
health_check = "scripts/gps_check.sh"

[tools.Recorder]
"#,
        )
        .unwrap();

        let config = load_from_dir(root).unwrap();
        assert_eq!(
            config.modules["Planning"].supported_commands["start"],
            "scripts/planning.sh start"
        );
        assert!(
            config
                .components(ComponentKind::Hardware)
                .contains_key("GPS")
        );
        assert!(config.tools["Recorder"].supported_commands.is_empty());
    }

    #[test]
    fn resolves_default_launch_by_stem_or_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("modes/mkz_standard/close_loop.launch"));
        fs::write(
            root.join("modes/mkz_standard/mode.toml"),
            "default_launch = \"close_loop\"\n",
        )
        .unwrap();
        touch(&root.join("modes/dev_kit/navigation.launch"));
        fs::write(
            root.join("modes/dev_kit/mode.toml"),
            "default_launch = \"Navigation\"\n",
        )
        .unwrap();

        let config = load_from_dir(root).unwrap();
        assert_eq!(
            config.modes["Mkz Standard"].default_launch.as_deref(),
            Some("Close Loop")
        );
        assert_eq!(
            config.modes["Dev Kit"].default_launch.as_deref(),
            Some("Navigation")
        );
    }

    #[test]
    fn rejects_unknown_default_launch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("modes/mkz_standard/close_loop.launch"));
        fs::write(
            root.join("modes/mkz_standard/mode.toml"),
            "default_launch = \"teleport\"\n",
        )
        .unwrap();

        let err = load_from_dir(root).unwrap_err();
        assert!(err.to_string().contains("Teleport"), "{err}");
    }

    #[test]
    fn missing_root_or_modes_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_from_dir(&dir.path().join("nope")),
            Err(HmiError::ConfigInvalid { .. })
        ));
        assert!(matches!(
            load_from_dir(dir.path()),
            Err(HmiError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("modes")).unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "modules = [").unwrap();
        assert!(matches!(
            load_from_dir(dir.path()),
            Err(HmiError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn colliding_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("modes/dev_kit")).unwrap();
        fs::create_dir_all(dir.path().join("modes/Dev_kit")).unwrap();
        let err = load_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Dev Kit"), "{err}");
    }
}

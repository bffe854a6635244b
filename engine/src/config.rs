//! Engine configuration and definition loading
//!
//! Trait and class definitions come from JSON arrays. Several sources may be
//! concatenated; within the combined sequence later duplicates win.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::LoadError;
use crate::registry::{ClassRegistry, RawClassRecord, RawTraitRecord, Registries, TraitRegistry};

/// Keys and tags the engine uses when talking to the attribute store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Source tag attached to every stat modifier the engine writes
    pub stat_source: String,
    /// Watched string holding the JSON expiry list
    pub active_traits_key: String,
    /// Watched string list mirroring the active codes
    pub active_codes_key: String,
    /// Watched string holding the last reconciliation time
    pub reconciled_at_key: String,
    /// Watched string holding the selected character class
    pub class_key: String,
    /// Appended to an attribute name to form its timeout marker
    pub timeout_suffix: String,
    pub damage_tier: u8,
    /// World hours advanced by each host tick
    pub hours_per_tick: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stat_source: "trait".into(),
            active_traits_key: "activetraits".into(),
            active_codes_key: "activetraitcodes".into(),
            reconciled_at_key: "activetraits-reconciled".into(),
            class_key: "characterClass".into(),
            timeout_suffix: "-timeout".into(),
            damage_tier: 5,
            hours_per_tick: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|source| LoadError::Parse {
            origin: "engine config".into(),
            source,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = read_file(path)?;
        serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    /// Name of the timeout marker paired with `name`
    pub fn timeout_key(&self, name: &str) -> String {
        format!("{name}{}", self.timeout_suffix)
    }
}

/// Definition files read at startup, in concatenation order
#[derive(Debug, Clone, Default)]
pub struct DefinitionSources {
    pub trait_files: Vec<PathBuf>,
    pub class_files: Vec<PathBuf>,
}

impl DefinitionSources {
    pub fn load(&self) -> Result<Registries, LoadError> {
        let mut trait_records = Vec::new();
        for path in &self.trait_files {
            let text = read_file(path)?;
            let origin = path.display().to_string();
            trait_records.extend(parse_records::<RawTraitRecord>(&origin, &text)?);
        }

        let mut class_records = Vec::new();
        for path in &self.class_files {
            let text = read_file(path)?;
            let origin = path.display().to_string();
            class_records.extend(parse_records::<RawClassRecord>(&origin, &text)?);
        }

        info!(
            "Loading definitions from {} trait and {} class sources",
            self.trait_files.len(),
            self.class_files.len()
        );
        Ok(Registries::new(
            TraitRegistry::load(trait_records)?,
            ClassRegistry::load(class_records)?,
        ))
    }
}

impl Registries {
    /// Build registries from in-memory JSON sources
    pub fn from_json_strs(
        trait_sources: &[&str],
        class_sources: &[&str],
    ) -> Result<Self, LoadError> {
        let mut trait_records = Vec::new();
        for (i, text) in trait_sources.iter().enumerate() {
            let origin = format!("trait source #{i}");
            trait_records.extend(parse_records::<RawTraitRecord>(&origin, text)?);
        }

        let mut class_records = Vec::new();
        for (i, text) in class_sources.iter().enumerate() {
            let origin = format!("class source #{i}");
            class_records.extend(parse_records::<RawClassRecord>(&origin, text)?);
        }

        Ok(Registries::new(
            TraitRegistry::load(trait_records)?,
            ClassRegistry::load(class_records)?,
        ))
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_records<T>(origin: &str, text: &str) -> Result<Vec<T>, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(text).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.stat_source, "trait");
        assert_eq!(config.timeout_key("speedMod"), "speedMod-timeout");
    }

    #[test]
    fn test_config_partial_override() {
        let json = r#"{"statSource": "temptrait", "hoursPerTick": 0.5}"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.stat_source, "temptrait");
        assert_eq!(config.hours_per_tick, 0.5);
        assert_eq!(config.active_traits_key, "activetraits");
    }

    #[test]
    fn test_sources_concatenate_last_wins() {
        let base = r#"[{"code": "fatigue", "duration": 5, "effects": {"speedMod": -0.2}}]"#;
        let patch = r#"[{"code": "fatigue", "duration": 7, "effects": {"speedMod": -0.3}}]"#;
        let classes = r#"[{"code": "hunter", "traits": ["fatigue"], "enabled": true}]"#;

        let registries = Registries::from_json_strs(&[base, patch], &[classes]).unwrap();
        let def = registries.traits.lookup("fatigue").unwrap();
        assert_eq!(def.duration, 7.0);
        assert_eq!(def.effects["speedMod"], -0.3);
        assert_eq!(registries.classes.lookup("hunter").unwrap().traits, vec!["fatigue"]);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = Registries::from_json_strs(&["{not json"], &[]);
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_load_from_files() {
        let dir = std::env::temp_dir().join(format!("temptraits-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let traits = dir.join("traits.json");
        let classes = dir.join("characterclasses.json");
        fs::write(
            &traits,
            r#"[{"code": "focused", "effects": {"rangedWeaponsAcc": 0.1}}]"#,
        )
        .unwrap();
        fs::write(&classes, r#"[{"code": "hunter", "traits": ["focused"]}]"#).unwrap();

        let sources = DefinitionSources {
            trait_files: vec![traits],
            class_files: vec![classes],
        };
        let registries = sources.load().unwrap();
        assert!(registries.traits.lookup("focused").is_some());

        let missing = DefinitionSources {
            trait_files: vec![dir.join("nope.json")],
            class_files: vec![],
        };
        assert!(matches!(missing.load(), Err(LoadError::Io { .. })));

        fs::remove_dir_all(&dir).unwrap();
    }
}

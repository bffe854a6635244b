//! Trait and character class registries
//!
//! Both registries are built once from raw definition records and are
//! read-only afterwards. Reloading builds a fresh [`Registries`] and the host
//! swaps it in as a whole.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::error::{LoadError, TraitError};

/// Reserved effect key: deals damage on every tick instead of setting a stat
pub const INSTANT_HEALTH_DAMAGE: &str = "instantHealthDamage";

// ============================================================================
// Raw Records (as found in the definition sources)
// ============================================================================

/// Trait record as written in a definition file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTraitRecord {
    #[serde(default)]
    pub code: Option<String>,
    /// World hours until expiry, 0 or absent = permanent
    #[serde(default, alias = "time")]
    pub duration: Option<f64>,
    #[serde(default, alias = "attributes")]
    pub effects: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Character class record as written in a definition file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClassRecord {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub traits: Vec<String>,
}

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    pub code: String,
    pub duration: f64,
    pub effects: BTreeMap<String, f64>,
    pub kind: Option<String>,
}

impl TraitDefinition {
    /// Temporary traits expire and are refreshed by reconciliation
    pub fn is_temporary(&self) -> bool {
        self.duration > 0.0
    }

    /// Magnitude of the per-tick damage effect, if the trait has one
    pub fn instant_damage(&self) -> Option<f64> {
        self.effects.get(INSTANT_HEALTH_DAMAGE).copied()
    }

    /// Effects written to the attribute store (everything but the reserved key)
    pub fn attribute_effects(&self) -> impl Iterator<Item = (&str, f64)> {
        self.effects
            .iter()
            .filter(|(key, _)| key.as_str() != INSTANT_HEALTH_DAMAGE)
            .map(|(key, value)| (key.as_str(), *value))
    }

    fn from_raw(index: usize, raw: RawTraitRecord) -> Result<Self, LoadError> {
        let code = match raw.code {
            Some(code) if !code.trim().is_empty() => code,
            _ => return Err(LoadError::malformed(index, "trait record has no code")),
        };

        let duration = raw.duration.unwrap_or(0.0);
        if !duration.is_finite() || duration < 0.0 {
            return Err(LoadError::malformed(
                index,
                format!("trait '{code}' has invalid duration {duration}"),
            ));
        }

        let mut effects = BTreeMap::new();
        for (key, value) in raw.effects {
            let Some(number) = value.as_f64() else {
                return Err(LoadError::malformed(
                    index,
                    format!("trait '{code}' effect '{key}' is not a number"),
                ));
            };
            effects.insert(key, number);
        }

        Ok(Self {
            code,
            duration,
            effects,
            kind: raw.kind,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub code: String,
    /// Granted in this order on selection
    pub traits: Vec<String>,
}

// ============================================================================
// Registries
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TraitRegistry {
    by_code: HashMap<String, TraitDefinition>,
}

impl TraitRegistry {
    /// Build from records of one or more concatenated sources.
    /// A later record with a duplicate code replaces the earlier one.
    pub fn load<I>(records: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = RawTraitRecord>,
    {
        let mut by_code = HashMap::new();
        for (index, raw) in records.into_iter().enumerate() {
            let def = TraitDefinition::from_raw(index, raw)?;
            if by_code.contains_key(&def.code) {
                debug!(trait_code = %def.code, "Duplicate trait definition, later one wins");
            }
            by_code.insert(def.code.clone(), def);
        }

        info!(
            "Loaded {} trait definitions ({} temporary)",
            by_code.len(),
            by_code.values().filter(|d| d.is_temporary()).count()
        );
        Ok(Self { by_code })
    }

    pub fn lookup(&self, code: &str) -> Option<&TraitDefinition> {
        self.by_code.get(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    by_code: HashMap<String, CharacterClass>,
}

impl ClassRegistry {
    pub fn load<I>(records: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = RawClassRecord>,
    {
        let mut by_code = HashMap::new();
        for (index, raw) in records.into_iter().enumerate() {
            let code = match raw.code {
                Some(code) if !code.trim().is_empty() => code,
                _ => return Err(LoadError::malformed(index, "class record has no code")),
            };
            by_code.insert(
                code.clone(),
                CharacterClass {
                    code,
                    traits: raw.traits,
                },
            );
        }

        info!("Loaded {} character classes", by_code.len());
        Ok(Self { by_code })
    }

    /// Unknown classes are a caller error, never an empty trait list
    pub fn lookup(&self, code: &str) -> Result<&CharacterClass, TraitError> {
        self.by_code
            .get(code)
            .ok_or_else(|| TraitError::UnknownClass(code.to_string()))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.by_code.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Both registries, shared read-only across every entity's reconciliation
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub traits: TraitRegistry,
    pub classes: ClassRegistry,
}

impl Registries {
    pub fn new(traits: TraitRegistry, classes: ClassRegistry) -> Self {
        Self { traits, classes }
    }
}

//! Per-entity active trait state
//!
//! Persisted through the entity's attribute store as a JSON array of
//! `{"code", "expiresAt"}` entries. Anything unreadable degrades to an empty
//! set so a corrupt blob never blocks the entity's tick.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;
use crate::store::AttributeStore;

/// World time in hours
pub type WorldTime = f64;

/// Whole world hour containing `time`
pub fn world_hour(time: WorldTime) -> i64 {
    time.floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expiry {
    At(WorldTime),
    /// Permanent traits
    Never,
}

impl Expiry {
    pub fn is_past(&self, now: WorldTime) -> bool {
        match self {
            Expiry::At(at) => now > *at,
            Expiry::Never => false,
        }
    }

    pub fn time(&self) -> Option<WorldTime> {
        match self {
            Expiry::At(at) => Some(*at),
            Expiry::Never => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub code: String,
    pub expires_at: Expiry,
}

/// Wire form of one entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedEntry {
    code: String,
    #[serde(rename = "expiresAt", default)]
    expires_at: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveEffectState {
    effects: Vec<ActiveEffect>,
    pub last_reconciled_at: Option<WorldTime>,
}

impl ActiveEffectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn codes(&self) -> Vec<String> {
        self.effects.iter().map(|e| e.code.clone()).collect()
    }

    pub fn get(&self, code: &str) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn upsert(&mut self, code: &str, expires_at: Expiry) {
        match self.effects.iter_mut().find(|e| e.code == code) {
            Some(existing) => existing.expires_at = expires_at,
            None => self.effects.push(ActiveEffect {
                code: code.to_string(),
                expires_at,
            }),
        }
    }

    pub fn remove(&mut self, code: &str) -> Option<ActiveEffect> {
        let pos = self.effects.iter().position(|e| e.code == code)?;
        Some(self.effects.remove(pos))
    }

    /// True if a reconciliation already ran in the same world hour as `now`
    pub fn reconciled_in_hour_of(&self, now: WorldTime) -> bool {
        self.last_reconciled_at
            .is_some_and(|last| world_hour(last) == world_hour(now))
    }

    pub fn to_json(&self) -> String {
        let entries: Vec<PersistedEntry> = self
            .effects
            .iter()
            .map(|e| PersistedEntry {
                code: e.code.clone(),
                expires_at: e.expires_at.time(),
            })
            .collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Parse a persisted expiry list; duplicate codes collapse to the last entry
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<PersistedEntry> = serde_json::from_str(json)?;
        let mut state = Self::new();
        for entry in entries {
            let expiry = entry.expires_at.map_or(Expiry::Never, Expiry::At);
            state.upsert(&entry.code, expiry);
        }
        Ok(state)
    }

    /// Read the entity's state; absent or malformed data yields an empty set
    pub fn load<S: AttributeStore + ?Sized>(store: &S, config: &EngineConfig) -> Self {
        let mut state = match store.get_string(&config.active_traits_key) {
            None => Self::new(),
            Some(json) => Self::from_json(&json).unwrap_or_else(|err| {
                warn!("Discarding unreadable active trait state: {}", err);
                Self::new()
            }),
        };

        state.last_reconciled_at = store
            .get_string(&config.reconciled_at_key)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|t| t.is_finite());
        state
    }

    pub fn save<S: AttributeStore + ?Sized>(&self, store: &mut S, config: &EngineConfig) {
        store.set_string(&config.active_traits_key, self.to_json());
        store.set_string_list(&config.active_codes_key, self.codes());
        // An empty marker reads back as "never reconciled"
        let reconciled = self
            .last_reconciled_at
            .map(|at| at.to_string())
            .unwrap_or_default();
        store.set_string(&config.reconciled_at_key, reconciled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn test_world_hour() {
        assert_eq!(world_hour(10.0), 10);
        assert_eq!(world_hour(10.99), 10);
        assert_eq!(world_hour(11.0), 11);
    }

    #[test]
    fn test_expiry() {
        assert!(!Expiry::At(15.0).is_past(15.0));
        assert!(Expiry::At(15.0).is_past(15.5));
        assert!(!Expiry::Never.is_past(f64::MAX));
    }

    #[test]
    fn test_upsert_never_duplicates() {
        let mut state = ActiveEffectState::new();
        state.upsert("fatigue", Expiry::At(15.0));
        state.upsert("sturdy", Expiry::Never);
        state.upsert("fatigue", Expiry::At(20.0));

        assert_eq!(state.codes(), vec!["fatigue", "sturdy"]);
        assert_eq!(state.get("fatigue").unwrap().expires_at, Expiry::At(20.0));
    }

    #[test]
    fn test_json_format() {
        let mut state = ActiveEffectState::new();
        state.upsert("fatigue", Expiry::At(15.0));
        state.upsert("sturdy", Expiry::Never);

        let json = state.to_json();
        assert_eq!(
            json,
            r#"[{"code":"fatigue","expiresAt":15.0},{"code":"sturdy","expiresAt":null}]"#
        );
        assert_eq!(ActiveEffectState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_corrupt_blob_degrades_to_empty() {
        let config = EngineConfig::default();
        let mut store = MemoryStore::default();
        store.set_string(&config.active_traits_key, "{{ definitely not json".into());
        store.set_string(&config.reconciled_at_key, "soon".into());

        let state = ActiveEffectState::load(&store, &config);
        assert!(state.is_empty());
        assert_eq!(state.last_reconciled_at, None);
    }

    #[test]
    fn test_save_then_load() {
        let config = EngineConfig::default();
        let mut store = MemoryStore::default();
        let mut state = ActiveEffectState::new();
        state.upsert("fatigue", Expiry::At(15.0));
        state.last_reconciled_at = Some(12.5);
        state.save(&mut store, &config);

        assert_eq!(store.get_string_list(&config.active_codes_key), vec!["fatigue"]);
        assert_eq!(ActiveEffectState::load(&store, &config), state);
    }

    #[test]
    fn test_coalescing_window() {
        let mut state = ActiveEffectState::new();
        assert!(!state.reconciled_in_hour_of(10.0));
        state.last_reconciled_at = Some(10.2);
        assert!(state.reconciled_in_hour_of(10.9));
        assert!(!state.reconciled_in_hour_of(11.0));
    }
}

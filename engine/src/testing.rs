//! In-memory store used by unit tests

use std::collections::{BTreeMap, HashMap};

use crate::registry::Registries;
use crate::store::{AttributeStore, DamageSource, DamageTarget};

const TRAITS: &str = r#"[
    {"code": "fatigue", "duration": 5, "effects": {"speedMod": -0.2}},
    {"code": "sturdy", "effects": {"maxhealthExtraPoints": 4}},
    {"code": "bleeding", "duration": 1, "effects": {"instantHealthDamage": 3}},
    {"code": "focused", "duration": 48, "effects": {"rangedWeaponsAcc": 0.25, "speedMod": 0.05}},
    {"code": "nimble", "effects": {"speedMod": 0.05}}
]"#;

const CLASSES: &str = r#"[
    {"code": "hunter", "traits": ["sturdy", "fatigue"]},
    {"code": "archer", "traits": ["focused"]},
    {"code": "drifter", "traits": ["bleeding", "forgotten", "sturdy"]},
    {"code": "scout", "traits": ["nimble", "fatigue"]}
]"#;

/// Registries shared by the system tests
pub fn fixture_registries() -> Registries {
    match Registries::from_json_strs(&[TRAITS], &[CLASSES]) {
        Ok(registries) => registries,
        Err(err) => panic!("fixture definitions must load: {err}"),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    /// name -> source -> value
    pub stats: BTreeMap<String, BTreeMap<String, f64>>,
    pub strings: HashMap<String, String>,
    pub lists: HashMap<String, Vec<String>>,
    pub damage_events: Vec<f64>,
    pub accepts_damage: bool,
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accepts_damage: true,
            ..Self::default()
        }
    }

    pub fn stat(&self, name: &str, source: &str) -> Option<f64> {
        self.stats.get(name).and_then(|by_source| by_source.get(source)).copied()
    }

    /// Everything except bookkeeping counters
    pub fn snapshot(&self) -> (BTreeMap<String, BTreeMap<String, f64>>, Vec<f64>) {
        (self.stats.clone(), self.damage_events.clone())
    }
}

impl AttributeStore for MemoryStore {
    fn set_attribute(&mut self, name: &str, value: f64, source: &str) {
        self.writes += 1;
        self.stats
            .entry(name.to_string())
            .or_default()
            .insert(source.to_string(), value);
    }

    fn get_attribute(&self, name: &str) -> f64 {
        self.stats.get(name).map(|s| s.values().sum()).unwrap_or(0.0)
    }

    fn remove_attribute(&mut self, name: &str, source: &str) {
        self.writes += 1;
        if let Some(by_source) = self.stats.get_mut(name) {
            by_source.remove(source);
            if by_source.is_empty() {
                self.stats.remove(name);
            }
        }
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        self.lists.get(key).cloned().unwrap_or_default()
    }

    fn set_string_list(&mut self, key: &str, values: Vec<String>) {
        self.writes += 1;
        self.lists.insert(key.to_string(), values);
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.strings.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.writes += 1;
        self.strings.insert(key.to_string(), value);
    }
}

impl DamageTarget for MemoryStore {
    fn should_receive_damage(&self, _source: &DamageSource, amount: f64) -> bool {
        self.accepts_damage && amount > 0.0
    }

    fn apply_damage(&mut self, _source: &DamageSource, amount: f64) {
        self.damage_events.push(amount);
    }
}

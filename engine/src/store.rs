//! Interfaces the engine uses to reach an entity's stats and health
//!
//! Both traits are entity-scoped: an implementation is a view onto exactly one
//! entity. Holding it by `&mut` is what gives each entity a single writer.

use serde::{Deserialize, Serialize};

/// Numeric stats tagged by modifier source, plus watched string attributes
pub trait AttributeStore {
    /// Set the modifier `name` contributed by `source`, replacing any previous value
    fn set_attribute(&mut self, name: &str, value: f64, source: &str);

    /// Combined value of `name` across all sources, 0 if unset
    fn get_attribute(&self, name: &str) -> f64;

    fn remove_attribute(&mut self, name: &str, source: &str);

    fn get_string_list(&self, key: &str) -> Vec<String>;

    fn set_string_list(&mut self, key: &str, values: Vec<String>);

    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&mut self, key: &str, value: String);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSourceKind {
    /// Originates inside the entity, cannot be blocked or dodged
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    Injury,
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageSource {
    pub kind: DamageSourceKind,
    pub damage_type: DamageType,
    pub tier: u8,
    pub knockback: f64,
}

impl DamageSource {
    /// Source used for trait-driven damage
    pub fn internal_injury(tier: u8) -> Self {
        Self {
            kind: DamageSourceKind::Internal,
            damage_type: DamageType::Injury,
            tier,
            knockback: 0.0,
        }
    }
}

/// Damage delivery to one entity
pub trait DamageTarget {
    fn should_receive_damage(&self, source: &DamageSource, amount: f64) -> bool;

    fn apply_damage(&mut self, source: &DamageSource, amount: f64);
}

//! ECS Components for player entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::state::WorldTime;

// ============================================================================
// Identity Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

// ============================================================================
// Attribute Components
// ============================================================================

/// Numeric stats, each made of modifiers keyed by source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub modifiers: HashMap<String, HashMap<String, f64>>,
}

impl Stats {
    pub fn set(&mut self, name: &str, source: &str, value: f64) {
        self.modifiers
            .entry(name.to_string())
            .or_default()
            .insert(source.to_string(), value);
    }

    pub fn get_from(&self, name: &str, source: &str) -> Option<f64> {
        self.modifiers.get(name)?.get(source).copied()
    }

    /// Sum of all sources
    pub fn blended(&self, name: &str) -> f64 {
        self.modifiers
            .get(name)
            .map(|by_source| by_source.values().sum())
            .unwrap_or(0.0)
    }

    pub fn remove(&mut self, name: &str, source: &str) {
        if let Some(by_source) = self.modifiers.get_mut(name) {
            by_source.remove(source);
            if by_source.is_empty() {
                self.modifiers.remove(name);
            }
        }
    }
}

/// String attributes synced to clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchedAttributes {
    pub strings: HashMap<String, String>,
    pub string_lists: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
    /// Creative/spectator players take no damage
    pub invulnerable: bool,
}

impl Health {
    pub fn new(max: f64) -> Self {
        Self {
            current: max,
            max,
            invulnerable: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(15.0)
    }
}

// ============================================================================
// Calendar
// ============================================================================

pub const HOURS_PER_DAY: f64 = 24.0;

/// World clock in total elapsed hours
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub total_hours: WorldTime,
}

impl Calendar {
    pub fn new(total_hours: WorldTime) -> Self {
        Self { total_hours }
    }

    pub fn advance(&mut self, hours: f64) {
        self.total_hours += hours;
    }

    pub fn day(&self) -> u64 {
        (self.total_hours / HOURS_PER_DAY).floor() as u64
    }

    pub fn hour_of_day(&self) -> f64 {
        self.total_hours % HOURS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_sources() {
        let mut stats = Stats::default();
        stats.set("walkspeed", "trait", -0.2);
        stats.set("walkspeed", "wearable", 0.1);
        stats.set("walkspeed", "trait", -0.3);

        assert_eq!(stats.get_from("walkspeed", "trait"), Some(-0.3));
        assert!((stats.blended("walkspeed") - (-0.2)).abs() < 1e-9);

        stats.remove("walkspeed", "trait");
        stats.remove("walkspeed", "wearable");
        assert!(stats.modifiers.is_empty());
    }

    #[test]
    fn test_calendar_advance() {
        let mut cal = Calendar::new(22.5);
        cal.advance(2.0);
        assert_eq!(cal.day(), 1);
        assert!((cal.hour_of_day() - 0.5).abs() < 1e-9);
    }
}

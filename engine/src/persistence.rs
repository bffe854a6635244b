//! Persistence module for export/import of the host world
//!
//! Serializes every player (stats, watched attributes, health) along with the
//! calendar. Active trait state travels inside the watched attributes, so an
//! imported world reconciles exactly where it left off.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::components::*;
use crate::error::PersistenceError;
use crate::state::ActiveEffectState;

const EXPORT_VERSION: u8 = 1;

// ============================================================================
// Export Data Structures
// ============================================================================

/// Complete world state for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub version: u8,
    pub calendar_hours: f64,
    pub next_player_id: u64,
    pub players: Vec<ExportedPlayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedPlayer {
    pub player_id: u64,
    pub name: String,
    pub stats: HashMap<String, HashMap<String, f64>>,
    pub strings: HashMap<String, String>,
    pub string_lists: HashMap<String, Vec<String>>,
    pub health: Health,
}

/// Result of import operation
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub players: u32,
    pub active_traits: u32,
    pub calendar_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveStats {
    pub players: u32,
    pub file_bytes: u64,
}

// ============================================================================
// Export Implementation
// ============================================================================

impl crate::world::TraitWorld {
    pub fn export_data(&self) -> ExportData {
        let mut players: Vec<ExportedPlayer> = self
            .world
            .query::<(&Player, &Stats, &WatchedAttributes, &Health)>()
            .iter()
            .map(|(_, (player, stats, watched, health))| ExportedPlayer {
                player_id: player.id.0,
                name: player.name.clone(),
                stats: stats.modifiers.clone(),
                strings: watched.strings.clone(),
                string_lists: watched.string_lists.clone(),
                health: *health,
            })
            .collect();
        players.sort_by_key(|p| p.player_id);

        ExportData {
            version: EXPORT_VERSION,
            calendar_hours: self.calendar.total_hours,
            next_player_id: self.next_player_id,
            players,
        }
    }

    /// Export entire world state to JSON string
    pub fn export_world(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(&self.export_data())?)
    }

    /// Import world state from JSON string, replacing current state
    pub fn import_world(&mut self, json: &str) -> Result<ImportResult, PersistenceError> {
        let data: ExportData = serde_json::from_str(json)?;
        self.restore(data)
    }

    /// Write a compact binary snapshot
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<SaveStats, PersistenceError> {
        let data = self.export_data();
        let bytes = bincode::serialize(&data)?;
        fs::write(path.as_ref(), &bytes)?;

        info!("Saved {} players ({} bytes)", data.players.len(), bytes.len());
        Ok(SaveStats {
            players: data.players.len() as u32,
            file_bytes: bytes.len() as u64,
        })
    }

    pub fn load_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<ImportResult, PersistenceError> {
        let bytes = fs::read(path.as_ref())?;
        let data: ExportData = bincode::deserialize(&bytes)?;
        self.restore(data)
    }

    fn restore(&mut self, data: ExportData) -> Result<ImportResult, PersistenceError> {
        if data.version != EXPORT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(data.version));
        }

        self.world.clear();
        self.calendar = Calendar::new(data.calendar_hours);
        self.next_player_id = data.next_player_id;

        let mut active_traits = 0u32;
        for exported in &data.players {
            let watched = WatchedAttributes {
                strings: exported.strings.clone(),
                string_lists: exported.string_lists.clone(),
            };
            let state = watched
                .strings
                .get(&self.config().active_traits_key)
                .and_then(|json| ActiveEffectState::from_json(json).ok());
            active_traits += state.map_or(0, |s| s.len() as u32);

            self.world.spawn((
                Player {
                    id: PlayerId(exported.player_id),
                    name: exported.name.clone(),
                },
                Stats {
                    modifiers: exported.stats.clone(),
                },
                watched,
                exported.health,
            ));
        }

        Ok(ImportResult {
            players: data.players.len() as u32,
            active_traits,
            calendar_hours: self.calendar.total_hours,
        })
    }
}

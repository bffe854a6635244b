//! Trait World - host orchestrator
//!
//! Owns the player entities and the world calendar, feeds lifecycle events
//! into the grant system and reconciles every player on each tick.

use hecs::{Entity, World};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

use crate::components::*;
use crate::config::EngineConfig;
use crate::error::TraitError;
use crate::registry::Registries;
use crate::state::{ActiveEffectState, WorldTime};
use crate::store::{AttributeStore, DamageSource, DamageTarget};
use crate::systems::{self, ReconcileResult};

/// Mutable view onto one player's trait-relevant components
pub struct PlayerView<'a> {
    pub stats: &'a mut Stats,
    pub watched: &'a mut WatchedAttributes,
    pub health: &'a mut Health,
}

impl AttributeStore for PlayerView<'_> {
    fn set_attribute(&mut self, name: &str, value: f64, source: &str) {
        self.stats.set(name, source, value);
    }

    fn get_attribute(&self, name: &str) -> f64 {
        self.stats.blended(name)
    }

    fn remove_attribute(&mut self, name: &str, source: &str) {
        self.stats.remove(name, source);
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        self.watched.string_lists.get(key).cloned().unwrap_or_default()
    }

    fn set_string_list(&mut self, key: &str, values: Vec<String>) {
        self.watched.string_lists.insert(key.to_string(), values);
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.watched.strings.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.watched.strings.insert(key.to_string(), value);
    }
}

impl DamageTarget for PlayerView<'_> {
    fn should_receive_damage(&self, _source: &DamageSource, amount: f64) -> bool {
        amount > 0.0 && self.health.is_alive() && !self.health.invulnerable
    }

    fn apply_damage(&mut self, _source: &DamageSource, amount: f64) {
        self.health.current = (self.health.current - amount).max(0.0);
    }
}

/// External events that change a player's traits
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Player joined; traits are rebuilt from their stored class
    Joined(Entity),
    /// Class chosen for the first time or reselected
    ClassSelected { entity: Entity, class_code: String },
    TraitGranted { entity: Entity, code: String },
    TraitRemoved { entity: Entity, code: String },
}

/// Aggregate result of reconciling every player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    pub players: u32,
    pub coalesced: u32,
    pub active: u32,
    pub expired: u32,
    pub dangling: u32,
    pub damage_events: u32,
}

impl TickResult {
    fn record(&mut self, result: &ReconcileResult) {
        self.players += 1;
        self.coalesced += u32::from(result.coalesced);
        self.active += result.active.len() as u32;
        self.expired += result.expired.len() as u32;
        self.dangling += result.dangling.len() as u32;
        self.damage_events += result.damage_events;
    }
}

pub struct TraitWorld {
    pub world: World,
    pub calendar: Calendar,
    pub next_player_id: u64,
    registries: Arc<Registries>,
    config: EngineConfig,
}

impl TraitWorld {
    pub fn new(registries: Arc<Registries>, config: EngineConfig) -> Self {
        Self {
            world: World::new(),
            calendar: Calendar::default(),
            next_player_id: 1,
            registries,
            config,
        }
    }

    pub fn registries(&self) -> Arc<Registries> {
        Arc::clone(&self.registries)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap in freshly loaded definitions; takes effect from the next call
    pub fn reload(&mut self, registries: Registries) {
        info!(
            "Reloading registries: {} traits, {} classes",
            registries.traits.len(),
            registries.classes.len()
        );
        self.registries = Arc::new(registries);
    }

    pub fn now(&self) -> WorldTime {
        self.calendar.total_hours
    }

    pub fn spawn_player(&mut self, name: impl Into<String>) -> Entity {
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;

        self.world.spawn((
            Player {
                id,
                name: name.into(),
            },
            Stats::default(),
            WatchedAttributes::default(),
            Health::default(),
        ))
    }

    pub fn player_count(&self) -> usize {
        self.world.query::<&Player>().iter().count()
    }

    fn view(world: &mut World, entity: Entity) -> Result<PlayerView<'_>, TraitError> {
        let (stats, watched, health) = world
            .query_one_mut::<(&mut Stats, &mut WatchedAttributes, &mut Health)>(entity)
            .map_err(|_| TraitError::InvalidEntity(format!("{entity:?} is not a player")))?;
        Ok(PlayerView {
            stats,
            watched,
            health,
        })
    }

    /// Store the class on the player and rebuild its traits from it
    pub fn select_class(
        &mut self,
        entity: Entity,
        class_code: &str,
    ) -> Result<ActiveEffectState, TraitError> {
        let now = self.now();
        let mut view = Self::view(&mut self.world, entity)?;
        let state = systems::grant_class_traits(
            &self.registries,
            &self.config,
            &mut view,
            class_code,
            now,
        )?;
        view.set_string(&self.config.class_key, class_code.to_string());
        Ok(state)
    }

    /// Rebuild traits from the stored class. `None` if no class was selected yet.
    pub fn player_joined(
        &mut self,
        entity: Entity,
    ) -> Result<Option<ActiveEffectState>, TraitError> {
        let now = self.now();
        let mut view = Self::view(&mut self.world, entity)?;
        let Some(class_code) = view.get_string(&self.config.class_key) else {
            debug!(?entity, "Joined player has no class yet");
            return Ok(None);
        };

        systems::grant_class_traits(&self.registries, &self.config, &mut view, &class_code, now)
            .map(Some)
    }

    pub fn grant_trait(
        &mut self,
        entity: Entity,
        code: &str,
    ) -> Result<ActiveEffectState, TraitError> {
        let now = self.now();
        let mut view = Self::view(&mut self.world, entity)?;
        systems::grant_trait(&self.registries, &self.config, &mut view, code, now)
    }

    pub fn remove_trait(&mut self, entity: Entity, code: &str) -> Result<bool, TraitError> {
        let mut view = Self::view(&mut self.world, entity)?;
        Ok(systems::remove_trait(&self.registries, &self.config, &mut view, code))
    }

    pub fn active_traits(&mut self, entity: Entity) -> Result<ActiveEffectState, TraitError> {
        let view = Self::view(&mut self.world, entity)?;
        Ok(ActiveEffectState::load(&view, &self.config))
    }

    pub fn handle_event(&mut self, event: LifecycleEvent) -> Result<(), TraitError> {
        match event {
            LifecycleEvent::Joined(entity) => self.player_joined(entity).map(|_| ()),
            LifecycleEvent::ClassSelected { entity, class_code } => {
                self.select_class(entity, &class_code).map(|_| ())
            }
            LifecycleEvent::TraitGranted { entity, code } => {
                self.grant_trait(entity, &code).map(|_| ())
            }
            LifecycleEvent::TraitRemoved { entity, code } => {
                self.remove_trait(entity, &code).map(|_| ())
            }
        }
    }

    pub fn reconcile_player(&mut self, entity: Entity) -> Result<ReconcileResult, TraitError> {
        let now = self.now();
        let mut view = Self::view(&mut self.world, entity)?;
        Ok(systems::reconcile(&self.registries, &self.config, &mut view, now))
    }

    /// Reconcile every player at the current world time.
    /// Each player is an independent borrow, so the pass runs in parallel.
    pub fn reconcile_all(&mut self) -> TickResult {
        let now = self.now();
        let registries = &self.registries;
        let config = &self.config;

        let players: Vec<_> = self
            .world
            .query_mut::<(&mut Stats, &mut WatchedAttributes, &mut Health)>()
            .into_iter()
            .collect();

        let results: Vec<ReconcileResult> = players
            .into_par_iter()
            .map(|(_, (stats, watched, health))| {
                let mut view = PlayerView {
                    stats,
                    watched,
                    health,
                };
                systems::reconcile(registries, config, &mut view, now)
            })
            .collect();

        let mut tick = TickResult::default();
        for result in &results {
            tick.record(result);
        }
        tick
    }

    /// Run one tick (advances the calendar by `hours_per_tick`)
    pub fn tick(&mut self) -> TickResult {
        self.calendar.advance(self.config.hours_per_tick);
        let result = self.reconcile_all();
        debug!(
            now = self.now(),
            players = result.players,
            expired = result.expired,
            "Tick complete"
        );
        result
    }
}

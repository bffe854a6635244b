//! Temporary Traits Engine
//!
//! Grants character traits on class selection and reconciles them on a
//! coarse world-hour tick: temporary traits are re-applied while active and
//! pruned with their stat modifiers once expired.

pub mod components;
pub mod config;
pub mod error;
pub mod persistence;
pub mod registry;
pub mod state;
pub mod store;
pub mod systems;
pub mod world;

#[cfg(test)]
mod testing;

pub use components::*;
pub use config::{DefinitionSources, EngineConfig};
pub use error::{ErrorKind, LoadError, PersistenceError, TraitError};
pub use persistence::{ExportData, ImportResult, SaveStats};
pub use registry::{CharacterClass, ClassRegistry, Registries, TraitDefinition, TraitRegistry};
pub use state::{ActiveEffect, ActiveEffectState, Expiry, WorldTime};
pub use store::{AttributeStore, DamageSource, DamageTarget};
pub use systems::ReconcileResult;
pub use world::{LifecycleEvent, PlayerView, TickResult, TraitWorld};

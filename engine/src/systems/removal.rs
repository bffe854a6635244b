//! Removal System

use tracing::debug;

use super::modifiers::{clear_modifiers, restore_cleared};
use crate::config::EngineConfig;
use crate::registry::Registries;
use crate::state::ActiveEffectState;
use crate::store::AttributeStore;

/// Remove a trait and its modifiers from the entity.
/// Returns whether it was active; removing an inactive code leaves every
/// effect key alone.
pub fn remove_trait<S>(
    registries: &Registries,
    config: &EngineConfig,
    entity: &mut S,
    code: &str,
) -> bool
where
    S: AttributeStore + ?Sized,
{
    let source = config.stat_source.as_str();
    entity.remove_attribute(code, source);
    entity.remove_attribute(&config.timeout_key(code), source);

    let mut state = ActiveEffectState::load(entity, config);
    if state.remove(code).is_none() {
        return false;
    }

    if let Some(def) = registries.traits.lookup(code) {
        let cleared = clear_modifiers(entity, config, def);
        restore_cleared(entity, config, registries, &state, &cleared);
    }
    state.save(entity, config);
    debug!(trait_code = code, "Removed trait");
    true
}

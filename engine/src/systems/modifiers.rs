//! Writing and clearing a trait's stat modifiers

use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::registry::{Registries, TraitDefinition};
use crate::state::{ActiveEffectState, Expiry, WorldTime};
use crate::store::AttributeStore;

/// Expiry of a trait granted at `now`
pub(crate) fn expiry_for(def: &TraitDefinition, now: WorldTime) -> Expiry {
    if def.is_temporary() {
        Expiry::At(now + def.duration)
    } else {
        Expiry::Never
    }
}

/// Set every modifier of `def`. Only expiring traits get timeout markers.
pub(crate) fn apply_modifiers<S>(
    store: &mut S,
    config: &EngineConfig,
    def: &TraitDefinition,
    expiry: Expiry,
) where
    S: AttributeStore + ?Sized,
{
    for (name, value) in def.attribute_effects() {
        set_modifier(store, config, name, value, expiry);
    }
}

/// Remove every modifier of `def`; returns the cleared attribute names
pub(crate) fn clear_modifiers<S>(
    store: &mut S,
    config: &EngineConfig,
    def: &TraitDefinition,
) -> BTreeSet<String>
where
    S: AttributeStore + ?Sized,
{
    let source = config.stat_source.as_str();
    let mut cleared = BTreeSet::new();
    for (name, _) in def.attribute_effects() {
        store.remove_attribute(name, source);
        store.remove_attribute(&config.timeout_key(name), source);
        cleared.insert(name.to_string());
    }
    cleared
}

/// Rewrite only the `cleared` attributes of `def`
pub(crate) fn reapply_cleared<S>(
    store: &mut S,
    config: &EngineConfig,
    def: &TraitDefinition,
    expiry: Expiry,
    cleared: &BTreeSet<String>,
) where
    S: AttributeStore + ?Sized,
{
    for (name, value) in def.attribute_effects() {
        if cleared.contains(name) {
            set_modifier(store, config, name, value, expiry);
        }
    }
}

/// Give `cleared` attributes back to the traits still in `state`, in
/// insertion order, so the last surviving writer owns the slot.
pub(crate) fn restore_cleared<S>(
    store: &mut S,
    config: &EngineConfig,
    registries: &Registries,
    state: &ActiveEffectState,
    cleared: &BTreeSet<String>,
) where
    S: AttributeStore + ?Sized,
{
    if cleared.is_empty() {
        return;
    }
    for effect in state.effects() {
        if let Some(def) = registries.traits.lookup(&effect.code) {
            reapply_cleared(store, config, def, effect.expires_at, cleared);
        }
    }
}

fn set_modifier<S>(
    store: &mut S,
    config: &EngineConfig,
    name: &str,
    value: f64,
    expiry: Expiry,
) where
    S: AttributeStore + ?Sized,
{
    let source = config.stat_source.as_str();
    store.set_attribute(name, value, source);
    if let Expiry::At(at) = expiry {
        store.set_attribute(&config.timeout_key(name), at, source);
    }
}

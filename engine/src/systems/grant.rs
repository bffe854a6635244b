//! Grant System
//!
//! Builds an entity's active trait state when a class is selected, and
//! handles one-off trait grants.

use tracing::{info, warn};

use super::modifiers::{apply_modifiers, clear_modifiers, expiry_for};
use crate::config::EngineConfig;
use crate::error::TraitError;
use crate::registry::Registries;
use crate::state::{ActiveEffectState, WorldTime};
use crate::store::AttributeStore;

/// Replace the entity's traits with those granted by `class_code`.
///
/// Trait codes the class lists but the registry doesn't know are skipped.
/// Modifiers left by the previous state are cleared before the new ones are set.
pub fn grant_class_traits<S>(
    registries: &Registries,
    config: &EngineConfig,
    entity: &mut S,
    class_code: &str,
    now: WorldTime,
) -> Result<ActiveEffectState, TraitError>
where
    S: AttributeStore + ?Sized,
{
    let class = registries.classes.lookup(class_code)?;

    let previous = ActiveEffectState::load(entity, config);
    for effect in previous.effects() {
        if let Some(def) = registries.traits.lookup(&effect.code) {
            clear_modifiers(entity, config, def);
        }
    }

    let mut state = ActiveEffectState::new();
    for code in &class.traits {
        let Some(def) = registries.traits.lookup(code) else {
            warn!(class_code, trait_code = %code, "Class grants unknown trait, skipping");
            continue;
        };

        let expiry = expiry_for(def, now);
        state.upsert(code, expiry);
        apply_modifiers(entity, config, def, expiry);
    }

    state.save(entity, config);
    info!(class_code, now, "Granted {} traits", state.len());
    Ok(state)
}

/// Grant a single trait, replacing any existing entry for the same code
pub fn grant_trait<S>(
    registries: &Registries,
    config: &EngineConfig,
    entity: &mut S,
    code: &str,
    now: WorldTime,
) -> Result<ActiveEffectState, TraitError>
where
    S: AttributeStore + ?Sized,
{
    let def = registries
        .traits
        .lookup(code)
        .ok_or_else(|| TraitError::UnknownTrait(code.to_string()))?;

    let mut state = ActiveEffectState::load(entity, config);
    let expiry = expiry_for(def, now);
    state.upsert(code, expiry);
    apply_modifiers(entity, config, def, expiry);
    state.save(entity, config);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Expiry;
    use crate::testing::{fixture_registries, MemoryStore};

    #[test]
    fn test_grant_sets_expiry_and_modifiers() {
        let registries = fixture_registries();
        let config = EngineConfig::default();
        let mut store = MemoryStore::new();

        let state = grant_class_traits(&registries, &config, &mut store, "hunter", 10.0).unwrap();

        assert_eq!(state.codes(), vec!["sturdy", "fatigue"]);
        assert_eq!(state.get("fatigue").unwrap().expires_at, Expiry::At(15.0));
        assert_eq!(state.get("sturdy").unwrap().expires_at, Expiry::Never);

        assert_eq!(store.stat("speedMod", "trait"), Some(-0.2));
        assert_eq!(store.stat("speedMod-timeout", "trait"), Some(15.0));
        assert_eq!(store.stat("maxhealthExtraPoints", "trait"), Some(4.0));
        assert_eq!(store.stat("maxhealthExtraPoints-timeout", "trait"), None);
        assert_eq!(ActiveEffectState::load(&store, &config), state);
    }

    #[test]
    fn test_unknown_class_fails() {
        let registries = fixture_registries();
        let config = EngineConfig::default();
        let mut store = MemoryStore::new();

        let result = grant_class_traits(&registries, &config, &mut store, "tailor", 0.0);
        assert_eq!(result, Err(TraitError::UnknownClass("tailor".into())));
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_missing_trait_codes_are_skipped() {
        let registries = fixture_registries();
        let config = EngineConfig::default();
        let mut store = MemoryStore::new();

        let state = grant_class_traits(&registries, &config, &mut store, "drifter", 0.0).unwrap();
        assert_eq!(state.codes(), vec!["bleeding", "sturdy"]);
        // Reserved key is never written as a stat and deals no damage on grant
        assert_eq!(store.stat("instantHealthDamage", "trait"), None);
        assert!(store.damage_events.is_empty());
    }

    #[test]
    fn test_regrant_replaces_previous_class() {
        let registries = fixture_registries();
        let config = EngineConfig::default();
        let mut store = MemoryStore::new();

        grant_class_traits(&registries, &config, &mut store, "hunter", 10.0).unwrap();
        let state = grant_class_traits(&registries, &config, &mut store, "archer", 11.0).unwrap();

        assert_eq!(state.codes(), vec!["focused"]);
        assert_eq!(store.stat("maxhealthExtraPoints", "trait"), None);
        assert_eq!(store.stat("speedMod", "trait"), Some(0.05));
        assert_eq!(store.stat("speedMod-timeout", "trait"), Some(59.0));
        assert_eq!(store.get_string_list(&config.active_codes_key), vec!["focused"]);
    }

    #[test]
    fn test_grant_is_idempotent() {
        let registries = fixture_registries();
        let config = EngineConfig::default();
        let mut store = MemoryStore::new();

        let first = grant_class_traits(&registries, &config, &mut store, "hunter", 10.0).unwrap();
        let snapshot = store.snapshot();
        let second = grant_class_traits(&registries, &config, &mut store, "hunter", 10.0).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.snapshot(), snapshot);
    }

    #[test]
    fn test_grant_single_trait() {
        let registries = fixture_registries();
        let config = EngineConfig::default();
        let mut store = MemoryStore::new();

        grant_class_traits(&registries, &config, &mut store, "hunter", 10.0).unwrap();
        let state = grant_trait(&registries, &config, &mut store, "fatigue", 20.0).unwrap();

        assert_eq!(state.codes(), vec!["sturdy", "fatigue"]);
        assert_eq!(state.get("fatigue").unwrap().expires_at, Expiry::At(25.0));
        assert_eq!(store.stat("speedMod-timeout", "trait"), Some(25.0));

        let unknown = grant_trait(&registries, &config, &mut store, "haunted", 20.0);
        assert_eq!(unknown, Err(TraitError::UnknownTrait("haunted".into())));
    }
}

//! Reconcile System
//!
//! Runs once per tick per entity. Expired temporary traits are pruned and
//! their modifiers cleared; active ones are re-applied. Ticks inside an
//! already reconciled world hour are skipped.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::modifiers::{apply_modifiers, clear_modifiers, reapply_cleared};
use crate::config::EngineConfig;
use crate::registry::Registries;
use crate::state::{ActiveEffectState, WorldTime};
use crate::store::{AttributeStore, DamageSource, DamageTarget};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileResult {
    /// Skipped because this world hour was already reconciled
    pub coalesced: bool,
    pub active: Vec<String>,
    pub expired: Vec<String>,
    /// Codes with no definition, left in place
    pub dangling: Vec<String>,
    pub damage_events: u32,
}

impl ReconcileResult {
    fn coalesced() -> Self {
        Self {
            coalesced: true,
            ..Self::default()
        }
    }
}

pub fn reconcile<E>(
    registries: &Registries,
    config: &EngineConfig,
    entity: &mut E,
    now: WorldTime,
) -> ReconcileResult
where
    E: AttributeStore + DamageTarget + ?Sized,
{
    let mut state = ActiveEffectState::load(entity, config);
    if state.reconciled_in_hour_of(now) {
        return ReconcileResult::coalesced();
    }

    let mut result = ReconcileResult::default();
    let damage_source = DamageSource::internal_injury(config.damage_tier);

    // Every expired trait is pruned before any survivor is re-applied
    let mut cleared = BTreeSet::new();
    for effect in state.effects().to_vec() {
        let Some(def) = registries.traits.lookup(&effect.code) else {
            warn!(trait_code = %effect.code, "Active trait has no definition, skipping");
            result.dangling.push(effect.code);
            continue;
        };

        if def.is_temporary() && effect.expires_at.is_past(now) {
            debug!(trait_code = %effect.code, now, "Trait expired");
            cleared.extend(clear_modifiers(entity, config, def));
            state.remove(&effect.code);
            result.expired.push(effect.code);
        }
    }

    for effect in state.effects() {
        let Some(def) = registries.traits.lookup(&effect.code) else {
            continue;
        };

        // Permanent traits were applied at grant time; only slots an expired
        // trait just cleared are written back.
        if !def.is_temporary() {
            reapply_cleared(entity, config, def, effect.expires_at, &cleared);
            continue;
        }

        apply_modifiers(entity, config, def, effect.expires_at);
        if let Some(amount) = def.instant_damage() {
            if entity.should_receive_damage(&damage_source, amount) {
                entity.apply_damage(&damage_source, amount);
                result.damage_events += 1;
            }
        }
        result.active.push(effect.code.clone());
    }

    state.last_reconciled_at = Some(now);
    state.save(entity, config);

    debug!(
        now,
        active = result.active.len(),
        expired = result.expired.len(),
        "Reconciled traits"
    );
    result
}

//! Applying tagged effects to a character snapshot.
//!
//! Techniques and consumables carry a list of [`Effect`] values decoded at
//! the storage boundary. This module is the single place they touch the
//! numeric state, with exhaustive variant handling -- a new effect category
//! will not compile until it is handled here.
//!
//! Buff expiry bookkeeping belongs to the technique subsystem that issued
//! the effect; the core applies the stat delta and reports what it did.

use ascension_types::{CharacterSnapshot, Effect, StatKind};

use crate::error::SimError;
use crate::fatigue::clamp_fatigue;

/// Apply one effect to the character, clamping into valid ranges.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] for a negative magnitude on any
/// variant -- effect payloads encode direction in their kind, not their
/// sign.
pub fn apply_effect(character: &mut CharacterSnapshot, effect: &Effect) -> Result<(), SimError> {
    match *effect {
        Effect::Damage { amount } => {
            if amount < 0.0 {
                return Err(SimError::invalid("damage amount must not be negative"));
            }
            character.current_health = (character.current_health - amount).max(0.0);
        }
        Effect::Healing { amount } => {
            if amount < 0.0 {
                return Err(SimError::invalid("healing amount must not be negative"));
            }
            character.current_health =
                (character.current_health + amount).min(character.max_health);
        }
        Effect::QiRestore { amount } => {
            if amount < 0.0 {
                return Err(SimError::invalid("qi restore amount must not be negative"));
            }
            character.current_qi =
                (character.current_qi + amount).min(character.core_capacity);
        }
        Effect::QiRegen {
            amount_per_minute,
            duration_minutes,
        } => {
            if amount_per_minute < 0.0 {
                return Err(SimError::invalid("qi regen rate must not be negative"));
            }
            let total = amount_per_minute * f64::from(duration_minutes);
            character.current_qi = (character.current_qi + total).min(character.core_capacity);
        }
        Effect::StatBuff { stat, amount, .. } => match stat {
            StatKind::Conductivity => {
                character.conductivity = (character.conductivity + amount).max(0.0);
            }
            StatKind::Perception => {
                character.perception = (character.perception + amount).max(0.0);
            }
            StatKind::MaxHealth => {
                character.max_health = (character.max_health + amount).max(1.0);
                character.current_health =
                    character.current_health.min(character.max_health);
            }
        },
        Effect::FatigueRelief { physical, mental } => {
            if physical < 0.0 || mental < 0.0 {
                return Err(SimError::invalid("fatigue relief must not be negative"));
            }
            character.physical_fatigue = clamp_fatigue(character.physical_fatigue - physical);
            character.mental_fatigue = clamp_fatigue(character.mental_fatigue - mental);
        }
    }
    Ok(())
}

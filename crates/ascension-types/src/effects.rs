//! Tagged effect variants for techniques and consumables.
//!
//! The original storage format kept effect payloads as opaque serialized
//! strings. Here every effect category is a closed variant of [`Effect`],
//! decoded at the storage boundary, so the core never manipulates untyped
//! blobs internally. The simulation layer handles every variant
//! exhaustively -- adding a category is a compile-time event.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A character attribute that a buff can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StatKind {
    /// Environmental qi absorption scaling.
    Conductivity,
    /// Spiritual sense (interruption avoidance).
    Perception,
    /// Maximum health points.
    MaxHealth,
}

/// One effect carried by a technique or consumable.
///
/// Serialized with an internal `kind` tag so rows read back from storage
/// decode directly into the right variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Effect {
    /// Immediate health loss.
    Damage {
        /// Health points removed.
        amount: f64,
    },
    /// Immediate health restoration.
    Healing {
        /// Health points restored (clamped to max health).
        amount: f64,
    },
    /// Immediate qi restoration into the core.
    QiRestore {
        /// Qi added (clamped to core capacity).
        amount: f64,
    },
    /// Sustained qi regeneration over a duration.
    QiRegen {
        /// Qi added per in-world minute.
        amount_per_minute: f64,
        /// How many minutes the regeneration lasts.
        duration_minutes: u32,
    },
    /// Temporary attribute increase.
    StatBuff {
        /// The attribute being raised.
        stat: StatKind,
        /// Flat amount added to the attribute.
        amount: f64,
        /// How many minutes the buff lasts (0 = permanent).
        duration_minutes: u32,
    },
    /// Fatigue reduction (elixirs, massage techniques).
    FatigueRelief {
        /// Physical fatigue removed.
        physical: f64,
        /// Mental fatigue removed.
        mental: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_serializes_with_kind_tag() {
        let effect = Effect::Damage { amount: 12.5 };
        let json = serde_json::to_value(&effect).ok();
        assert_eq!(
            json.as_ref().and_then(|v| v.get("kind")).and_then(|k| k.as_str()),
            Some("damage")
        );
    }

    #[test]
    fn effect_decodes_from_tagged_json() {
        let json = r#"{"kind":"stat_buff","stat":"Perception","amount":5.0,"duration_minutes":60}"#;
        let effect: Result<Effect, _> = serde_json::from_str(json);
        assert_eq!(
            effect.ok(),
            Some(Effect::StatBuff {
                stat: StatKind::Perception,
                amount: 5.0,
                duration_minutes: 60,
            })
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{"kind":"mystery","amount":1.0}"#;
        let effect: Result<Effect, _> = serde_json::from_str(json);
        assert!(effect.is_err());
    }
}

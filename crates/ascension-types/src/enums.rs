//! Closed enumeration types for the Ascension core.
//!
//! Everything the simulation branches on is a closed enum with exhaustive
//! handling. Nothing in the core manipulates stringly-typed categories.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Location classification
// ---------------------------------------------------------------------------

/// How dangerous a location is for an unattended cultivator.
///
/// Drives the base interruption probability during meditation. The map
/// subsystem owns the assignment; the core only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DangerLevel {
    /// Warded ground: sect interiors, formation-protected valleys.
    Safe,
    /// Settled areas with occasional wildlife.
    Low,
    /// Wilderness with active spirit beasts.
    Moderate,
    /// Contested or cursed territory.
    High,
    /// Places no sane cultivator meditates in.
    Deadly,
}

/// Terrain classification of a map location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Terrain {
    /// Open farmland and grassland.
    Plains,
    /// Dense woodland.
    Forest,
    /// High peaks, typically qi-rich.
    Mountain,
    /// Riverlands and wetlands.
    Swamp,
    /// Qi-depleted ruins and deserts.
    Wasteland,
}

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

/// Phase of the in-world day, derived from the hour field of a world time.
///
/// Never stored -- always computed from the hour so it cannot drift out of
/// sync with the authoritative tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TimeOfDay {
    /// Hours 0-4: the most dangerous stretch for meditation.
    Night,
    /// Hours 5-7.
    Dawn,
    /// Hours 8-11.
    Morning,
    /// Hours 12-17.
    Afternoon,
    /// Hours 18-23.
    Dusk,
}

// ---------------------------------------------------------------------------
// Interruption categories
// ---------------------------------------------------------------------------

/// Category of a meditation interruption, drawn from a weighted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum InterruptionKind {
    /// A beast or spirit animal approaches.
    Creature,
    /// Another cultivator or mortal stumbles onto the site.
    Person,
    /// A wandering spirit or apparition manifests.
    Spirit,
    /// A natural or qi phenomenon disturbs the session.
    Phenomenon,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danger_levels_are_ordered() {
        assert!(DangerLevel::Safe < DangerLevel::Low);
        assert!(DangerLevel::High < DangerLevel::Deadly);
    }

    #[test]
    fn enums_roundtrip_serde() {
        let json = serde_json::to_string(&InterruptionKind::Spirit).ok();
        assert_eq!(json.as_deref(), Some("\"Spirit\""));
        let back: Result<InterruptionKind, _> = serde_json::from_str("\"Spirit\"");
        assert_eq!(back.ok(), Some(InterruptionKind::Spirit));
    }
}

//! Core record types for the Ascension simulation.
//!
//! These structs are plain data: the session authority owns the mutable
//! copies, the simulation layer computes transitions over them, and the
//! storage gateway moves them across the persistence boundary. Invariants
//! (qi bounds, fatigue ranges, calendar field consistency) are enforced by
//! the functions in `ascension-sim`, not by constructors here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DangerLevel, InterruptionKind, Terrain};
use crate::ids::{CharacterId, LocationId, SessionId};

// ---------------------------------------------------------------------------
// Character snapshot
// ---------------------------------------------------------------------------

/// The numeric state of a cultivator that the core simulates.
///
/// Invariants (maintained by the simulation layer):
/// - `current_qi` never exceeds `core_capacity` except transiently inside a
///   breakthrough transaction, which resolves by raising the capacity.
/// - `physical_fatigue` and `mental_fatigue` stay within `[0, 100]`.
/// - `cultivation_level` is in `[1, 10]`, `cultivation_sub_level` in `[0, 9]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterSnapshot {
    /// Maximum qi the core can hold at the current cultivation level.
    pub core_capacity: f64,
    /// Qi currently held, `0 <= current_qi <= core_capacity`.
    pub current_qi: f64,
    /// Lifetime qi counter gating breakthroughs; independent of `current_qi`.
    pub accumulated_qi: f64,
    /// Major cultivation realm, `1..=10`.
    pub cultivation_level: u8,
    /// Sub-level within the realm, `0..=9`.
    pub cultivation_sub_level: u8,
    /// Physical exhaustion, `0..=100` (100 = collapsed).
    pub physical_fatigue: f64,
    /// Mental exhaustion, `0..=100` (100 = qi deviation risk).
    pub mental_fatigue: f64,
    /// How readily the body channels environmental qi (`>= 0`).
    pub conductivity: f64,
    /// Spiritual sense; reduces the chance of being caught off guard.
    pub perception: f64,
    /// Current health points.
    pub current_health: f64,
    /// Maximum health points.
    pub max_health: f64,
}

// ---------------------------------------------------------------------------
// World time
// ---------------------------------------------------------------------------

/// A point in the game calendar.
///
/// `ticks_since_epoch` is the monotonic authoritative counter; the calendar
/// fields are always derived from it by `ascension-sim::calendar` and are
/// never advanced independently. One tick is one in-world minute. The epoch
/// (tick 0) is year 1, month 1, day 1, 00:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldTime {
    /// Calendar year, starting at 1.
    pub year: u32,
    /// Month of the year, `1..=12`.
    pub month: u8,
    /// Day of the month, `1..=30`.
    pub day: u8,
    /// Hour of the day, `0..=23`.
    pub hour: u8,
    /// Minute of the hour, `0..=59`.
    pub minute: u8,
    /// Total ticks (minutes) elapsed since the epoch.
    pub ticks_since_epoch: u64,
}

// ---------------------------------------------------------------------------
// Location snapshot
// ---------------------------------------------------------------------------

/// Read-only description of the location a character occupies.
///
/// Owned by the map subsystem; the core only consumes it as input to the
/// resource model and the interruption oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationSnapshot {
    /// Identifier of the location.
    pub location_id: LocationId,
    /// Ambient qi concentration, scales environmental absorption.
    pub qi_density: f64,
    /// Danger classification driving interruption probability.
    pub danger_level: DangerLevel,
    /// Terrain classification.
    pub terrain: Terrain,
    /// Distance from the map center in map units.
    pub distance_from_center: f64,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The persistable truth of one active game session.
///
/// This is what the persistence gateway loads on session start and what the
/// authority flushes on checkpoint and unload. Bookkeeping that never leaves
/// memory (dirty flag, load/save timestamps) lives on the authority's
/// internal record, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionState {
    /// Identifier of the session.
    pub session_id: SessionId,
    /// Identifier of the character this session plays.
    pub character_id: CharacterId,
    /// The character's numeric state.
    pub character: CharacterSnapshot,
    /// The session's world time.
    pub time: WorldTime,
}

// ---------------------------------------------------------------------------
// Interruption event
// ---------------------------------------------------------------------------

/// An event that cut a meditation session short.
///
/// Ephemeral: produced by the interruption oracle, consumed once by the
/// caller (typically fed to the narrative layer), never persisted as a
/// standalone entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InterruptionEvent {
    /// Category the event was drawn from.
    pub kind: InterruptionKind,
    /// Narrative seed text describing what happened.
    pub description: String,
    /// Minute of the session (0-based) at which the interruption fired.
    pub check_tick: u32,
    /// Whether the character may ignore the event and keep meditating.
    pub can_ignore: bool,
    /// Whether the character may attempt to stay hidden.
    pub can_hide: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A baseline mortal-realm character used across type tests.
    fn sample_character() -> CharacterSnapshot {
        CharacterSnapshot {
            core_capacity: 1000.0,
            current_qi: 250.0,
            accumulated_qi: 4000.0,
            cultivation_level: 1,
            cultivation_sub_level: 3,
            physical_fatigue: 20.0,
            mental_fatigue: 10.0,
            conductivity: 5.0,
            perception: 12.0,
            current_health: 100.0,
            max_health: 100.0,
        }
    }

    #[test]
    fn character_roundtrip_serde() {
        let original = sample_character();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let back: Result<CharacterSnapshot, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(back.ok(), Some(original));
    }

    #[test]
    fn world_time_is_copy() {
        let t = WorldTime {
            year: 1,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            ticks_since_epoch: 0,
        };
        let t2 = t;
        // Both still usable: WorldTime is Copy.
        assert_eq!(t, t2);
    }
}

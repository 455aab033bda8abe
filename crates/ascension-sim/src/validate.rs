//! Invariant checks over character snapshots.
//!
//! Production code paths clamp defensively at every mutation site; these
//! checks exist so tests (and the session authority, on load) can detect a
//! snapshot that somehow escaped those clamps instead of silently
//! normalizing it.

use ascension_types::{CharacterSnapshot, WorldTime};

use crate::breakthrough::{MAX_CULTIVATION_LEVEL, MAX_SUB_LEVEL};
use crate::calendar;
use crate::error::SimError;

/// Verify every invariant the character snapshot is supposed to hold.
///
/// # Errors
///
/// Returns [`SimError::InvariantViolation`] naming the first breached
/// invariant.
pub fn validate_character(character: &CharacterSnapshot) -> Result<(), SimError> {
    if character.core_capacity <= 0.0 {
        return Err(violation("core_capacity must be positive"));
    }
    if character.current_qi < 0.0 || character.current_qi > character.core_capacity {
        return Err(violation(format!(
            "current_qi {} outside [0, {}]",
            character.current_qi, character.core_capacity
        )));
    }
    if character.accumulated_qi < 0.0 {
        return Err(violation("accumulated_qi must not be negative"));
    }
    if !(1..=MAX_CULTIVATION_LEVEL).contains(&character.cultivation_level) {
        return Err(violation(format!(
            "cultivation_level {} outside 1..=10",
            character.cultivation_level
        )));
    }
    if character.cultivation_sub_level > MAX_SUB_LEVEL {
        return Err(violation(format!(
            "cultivation_sub_level {} outside 0..=9",
            character.cultivation_sub_level
        )));
    }
    if !(0.0..=100.0).contains(&character.physical_fatigue) {
        return Err(violation("physical_fatigue outside [0, 100]"));
    }
    if !(0.0..=100.0).contains(&character.mental_fatigue) {
        return Err(violation("mental_fatigue outside [0, 100]"));
    }
    if character.conductivity < 0.0 {
        return Err(violation("conductivity must not be negative"));
    }
    Ok(())
}

/// Verify that the calendar fields of a world time match its tick counter.
///
/// # Errors
///
/// Returns [`SimError::InvariantViolation`] if the fields have drifted
/// from what the tick counter derives.
pub fn validate_world_time(time: &WorldTime) -> Result<(), SimError> {
    let derived = calendar::from_ticks(time.ticks_since_epoch)?;
    if derived == *time {
        Ok(())
    } else {
        Err(violation(format!(
            "calendar fields drifted from tick counter {}",
            time.ticks_since_epoch
        )))
    }
}

fn violation(reason: impl Into<String>) -> SimError {
    SimError::InvariantViolation {
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::calendar::from_parts;

    fn sound_character() -> CharacterSnapshot {
        CharacterSnapshot {
            core_capacity: 1000.0,
            current_qi: 500.0,
            accumulated_qi: 100.0,
            cultivation_level: 3,
            cultivation_sub_level: 7,
            physical_fatigue: 10.0,
            mental_fatigue: 5.0,
            conductivity: 4.0,
            perception: 12.0,
            current_health: 90.0,
            max_health: 100.0,
        }
    }

    #[test]
    fn sound_snapshot_passes() {
        assert!(validate_character(&sound_character()).is_ok());
    }

    #[test]
    fn overfull_core_is_a_violation() {
        let mut character = sound_character();
        character.current_qi = 1000.1;
        assert!(matches!(
            validate_character(&character),
            Err(SimError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn negative_fatigue_is_a_violation() {
        let mut character = sound_character();
        character.physical_fatigue = -0.5;
        assert!(validate_character(&character).is_err());
    }

    #[test]
    fn consistent_time_passes() {
        let time = from_parts(2, 6, 15, 12, 30).unwrap();
        assert!(validate_world_time(&time).is_ok());
    }

    #[test]
    fn drifted_calendar_fields_detected() {
        let mut time = from_parts(2, 6, 15, 12, 30).unwrap();
        time.minute = 31;
        assert!(validate_world_time(&time).is_err());
    }
}

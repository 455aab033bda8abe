//! Fatigue recovery and accrual.
//!
//! Both fatigue pools are clamped to `[0, 100]`. Recovery depends on the
//! activity and is scaled by a per-cultivation-level multiplier table
//! (higher realms recover faster). Meditation is deliberately asymmetric:
//! it restores the body while taxing the mind, so a cultivator cannot
//! meditate indefinitely.

use ascension_types::{CharacterSnapshot, RecoveryActivity};

use crate::config::TuningConfig;

/// The fatigue change actually applied by a recovery window.
///
/// Positive values are fatigue removed; a negative `mental` value records
/// the mental cost meditation charges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FatigueDelta {
    /// Physical fatigue removed.
    pub physical: f64,
    /// Mental fatigue removed (negative when the activity taxed the mind).
    pub mental: f64,
}

/// Clamp a fatigue value into the valid `[0, 100]` range.
pub fn clamp_fatigue(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Recovery multiplier for a cultivation level.
///
/// Index 0 of the table corresponds to level 1; levels past the end of the
/// table use the last entry. An empty table (rejected by config validation,
/// but defended against here) yields 1.0.
pub fn recovery_multiplier(level: u8, config: &TuningConfig) -> f64 {
    let table = &config.fatigue.level_recovery_multipliers;
    let index = usize::from(level.saturating_sub(1));
    table
        .get(index)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(1.0)
}

/// Apply a recovery activity for a number of minutes.
///
/// Returns the delta actually applied after clamping, so a caller reporting
/// "recovered 12.5 physical fatigue" never overstates the effect.
pub fn recover_fatigue(
    character: &mut CharacterSnapshot,
    activity: RecoveryActivity,
    minutes: u32,
    config: &TuningConfig,
) -> FatigueDelta {
    let multiplier = recovery_multiplier(character.cultivation_level, config);
    let duration = f64::from(minutes);

    let (physical_rate, mental_rate) = match activity {
        RecoveryActivity::RestLight => (
            config.fatigue.rest_light_physical_per_minute,
            config.fatigue.rest_light_mental_per_minute,
        ),
        RecoveryActivity::Sleep => (
            config.fatigue.sleep_physical_per_minute,
            config.fatigue.sleep_mental_per_minute,
        ),
        // Meditation restores the body but charges the mind. The mental
        // cost scales with duration only, not with the recovery table.
        RecoveryActivity::Meditation => (
            config.fatigue.meditation_physical_per_minute,
            -config.fatigue.meditation_mental_cost_per_minute / multiplier,
        ),
    };

    let physical_before = character.physical_fatigue;
    let mental_before = character.mental_fatigue;

    character.physical_fatigue =
        clamp_fatigue(character.physical_fatigue - physical_rate * multiplier * duration);
    character.mental_fatigue =
        clamp_fatigue(character.mental_fatigue - mental_rate * multiplier * duration);

    FatigueDelta {
        physical: physical_before - character.physical_fatigue,
        mental: mental_before - character.mental_fatigue,
    }
}

/// Accrue fatigue from exertion (travel, technique execution).
///
/// Both pools clamp at 100; the caller decides what hitting the ceiling
/// means for the action being performed.
pub fn accrue_fatigue(character: &mut CharacterSnapshot, physical: f64, mental: f64) {
    character.physical_fatigue = clamp_fatigue(character.physical_fatigue + physical.max(0.0));
    character.mental_fatigue = clamp_fatigue(character.mental_fatigue + mental.max(0.0));
}

//! Breakthrough resolution: advancing the cultivation ladder.
//!
//! A breakthrough is the only transition allowed to touch `core_capacity`.
//! It is gated by the lifetime `accumulated_qi` counter: the character must
//! have channeled `required_fills * core_capacity` total qi, where
//! `required_fills = level * 10 + sub_level`. Failure is an expected,
//! user-visible outcome returned as data -- never an error -- and performs
//! no mutation beyond the fatigue/time cost already charged by the caller.

use ascension_types::CharacterSnapshot;

use crate::config::TuningConfig;
use crate::error::SimError;

/// Highest attainable cultivation level.
pub const MAX_CULTIVATION_LEVEL: u8 = 10;

/// Highest sub-level within a cultivation level.
pub const MAX_SUB_LEVEL: u8 = 9;

/// Why a breakthrough attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakthroughFailure {
    /// The lifetime qi counter has not reached the threshold.
    InsufficientAccumulation {
        /// Qi required for this rung of the ladder.
        required: f64,
        /// Qi the character has accumulated so far.
        available: f64,
    },
    /// The character already stands at the peak of the ladder.
    AtPeak,
}

/// The outcome of a breakthrough attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakthroughOutcome {
    /// The attempt succeeded and the character advanced.
    Advanced {
        /// Cultivation level after the breakthrough.
        new_level: u8,
        /// Sub-level after the breakthrough.
        new_sub_level: u8,
        /// Core capacity after the growth multiplier.
        new_capacity: f64,
    },
    /// The attempt was refused; no state changed.
    Failed {
        /// Why the attempt was refused.
        reason: BreakthroughFailure,
    },
}

/// Number of full core fills required to break through from a given rung.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] if the level/sub-level pair is out
/// of the valid ladder range.
pub fn required_fills(level: u8, sub_level: u8) -> Result<u32, SimError> {
    if !(1..=MAX_CULTIVATION_LEVEL).contains(&level) {
        return Err(SimError::invalid(format!(
            "cultivation_level {level} out of range 1..=10"
        )));
    }
    if sub_level > MAX_SUB_LEVEL {
        return Err(SimError::invalid(format!(
            "cultivation_sub_level {sub_level} out of range 0..=9"
        )));
    }
    let fills = u32::from(level)
        .checked_mul(10)
        .and_then(|f| f.checked_add(u32::from(sub_level)))
        .ok_or_else(|| SimError::invalid("required_fills overflow"))?;
    Ok(fills)
}

/// Attempt a breakthrough for the character.
///
/// On success: the sub-level advances (wrapping 9 -> 0 into the next
/// level), `core_capacity` grows by the configured multiplier, the
/// threshold qi is consumed from `accumulated_qi`, `current_qi` settles at
/// the configured post-breakthrough fill of the new capacity, and the
/// mental fatigue cost is charged. On failure the reason is reported and
/// nothing is mutated.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] only for a malformed snapshot
/// (level outside the ladder, non-positive capacity). Refusal is not an
/// error.
pub fn attempt_breakthrough(
    character: &mut CharacterSnapshot,
    config: &TuningConfig,
) -> Result<BreakthroughOutcome, SimError> {
    if character.core_capacity <= 0.0 {
        return Err(SimError::invalid("core_capacity must be positive"));
    }

    let fills = required_fills(character.cultivation_level, character.cultivation_sub_level)?;

    if character.cultivation_level == MAX_CULTIVATION_LEVEL
        && character.cultivation_sub_level == MAX_SUB_LEVEL
    {
        return Ok(BreakthroughOutcome::Failed {
            reason: BreakthroughFailure::AtPeak,
        });
    }

    let required = f64::from(fills) * character.core_capacity;
    if character.accumulated_qi < required {
        return Ok(BreakthroughOutcome::Failed {
            reason: BreakthroughFailure::InsufficientAccumulation {
                required,
                available: character.accumulated_qi,
            },
        });
    }

    // Advance the ladder: sub-level 9 wraps into the next level.
    let (new_level, new_sub_level) = if character.cultivation_sub_level == MAX_SUB_LEVEL {
        (character.cultivation_level.saturating_add(1), 0)
    } else {
        (
            character.cultivation_level,
            character.cultivation_sub_level.saturating_add(1),
        )
    };

    let new_capacity = character.core_capacity * config.breakthrough.growth_multiplier;

    character.accumulated_qi -= required;
    character.cultivation_level = new_level;
    character.cultivation_sub_level = new_sub_level;
    character.core_capacity = new_capacity;
    character.current_qi = new_capacity * config.breakthrough.post_breakthrough_fill;
    character.mental_fatigue =
        (character.mental_fatigue + config.breakthrough.mental_fatigue_cost).min(100.0);

    tracing::info!(
        new_level,
        new_sub_level,
        new_capacity,
        "Breakthrough succeeded"
    );

    Ok(BreakthroughOutcome::Advanced {
        new_level,
        new_sub_level,
        new_capacity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn novice(accumulated_qi: f64) -> CharacterSnapshot {
        CharacterSnapshot {
            core_capacity: 1000.0,
            current_qi: 800.0,
            accumulated_qi,
            cultivation_level: 1,
            cultivation_sub_level: 0,
            physical_fatigue: 0.0,
            mental_fatigue: 0.0,
            conductivity: 5.0,
            perception: 10.0,
            current_health: 100.0,
            max_health: 100.0,
        }
    }

    #[test]
    fn fills_formula() {
        assert_eq!(required_fills(1, 0).unwrap(), 10);
        assert_eq!(required_fills(1, 9).unwrap(), 19);
        assert_eq!(required_fills(3, 4).unwrap(), 34);
        assert_eq!(required_fills(10, 9).unwrap(), 109);
    }

    #[test]
    fn fills_rejects_bad_ladder_position() {
        assert!(required_fills(0, 0).is_err());
        assert!(required_fills(11, 0).is_err());
        assert!(required_fills(1, 10).is_err());
    }

    #[test]
    fn one_short_of_threshold_fails_without_mutation() {
        let mut character = novice(9_999.0);
        let before = character.clone();
        let config = TuningConfig::default();

        let outcome = attempt_breakthrough(&mut character, &config).unwrap();
        assert!(matches!(
            outcome,
            BreakthroughOutcome::Failed {
                reason: BreakthroughFailure::InsufficientAccumulation { .. }
            }
        ));
        assert_eq!(character, before);
    }

    #[test]
    fn exact_threshold_succeeds() {
        let mut character = novice(10_000.0);
        let config = TuningConfig::default();

        let outcome = attempt_breakthrough(&mut character, &config).unwrap();
        assert_eq!(
            outcome,
            BreakthroughOutcome::Advanced {
                new_level: 1,
                new_sub_level: 1,
                new_capacity: 1000.0 * 1.10,
            }
        );
        assert_eq!(character.cultivation_sub_level, 1);
        assert!((character.accumulated_qi - 0.0).abs() < 1e-9);
        // Current qi settles at the post-breakthrough fill of the new core.
        assert!((character.current_qi - 1100.0 * 0.10).abs() < 1e-9);
        assert!((character.mental_fatigue - 25.0).abs() < 1e-9);
    }

    #[test]
    fn sub_level_nine_wraps_into_next_level() {
        let mut character = novice(0.0);
        character.cultivation_sub_level = 9;
        character.accumulated_qi = 19_000.0;
        let config = TuningConfig::default();

        let outcome = attempt_breakthrough(&mut character, &config).unwrap();
        assert!(matches!(
            outcome,
            BreakthroughOutcome::Advanced {
                new_level: 2,
                new_sub_level: 0,
                ..
            }
        ));
    }

    #[test]
    fn peak_is_refused() {
        let mut character = novice(f64::MAX / 2.0);
        character.cultivation_level = 10;
        character.cultivation_sub_level = 9;
        let config = TuningConfig::default();

        let outcome = attempt_breakthrough(&mut character, &config).unwrap();
        assert_eq!(
            outcome,
            BreakthroughOutcome::Failed {
                reason: BreakthroughFailure::AtPeak,
            }
        );
    }

    #[test]
    fn surplus_accumulation_is_kept() {
        let mut character = novice(12_500.0);
        let config = TuningConfig::default();

        let _ = attempt_breakthrough(&mut character, &config).unwrap();
        assert!((character.accumulated_qi - 2_500.0).abs() < 1e-9);
    }

    #[test]
    fn mental_fatigue_clamps_at_hundred() {
        let mut character = novice(10_000.0);
        character.mental_fatigue = 90.0;
        let config = TuningConfig::default();

        let _ = attempt_breakthrough(&mut character, &config).unwrap();
        assert!((character.mental_fatigue - 100.0).abs() < 1e-9);
    }
}

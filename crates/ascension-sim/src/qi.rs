//! Qi generation, caps, and dissipation.
//!
//! The generation rate is the sum of two independent components:
//!
//! - **Core generation**: a passive trickle proportional to core size,
//!   `core_capacity * core_regen_fraction / seconds_per_day` qi per second.
//! - **Environmental absorption**: `qi_density * conductivity /
//!   seconds_per_day` qi per second, from the surrounding location.
//!
//! Accumulation is two-tiered: passive (non-meditative) gain stops at 90%
//! of capacity, meditative gain at 100%. Gain past the cap is never granted
//! silently -- it is clamped, the clamped amount is reported, and the
//! excess is reported as dissipated so an active breakthrough attempt can
//! choose to retain it instead.

use ascension_types::{CharacterSnapshot, LocationSnapshot};

use crate::config::TuningConfig;
use crate::error::SimError;

/// The result of a qi accumulation computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QiGain {
    /// Qi actually added to the core.
    pub gained: f64,
    /// Qi drawn but lost to the cap (or retained as breakthrough potential
    /// by the caller when the action is an active breakthrough attempt).
    pub dissipated: f64,
    /// Whether the cap cut the gain short.
    pub capped: bool,
}

/// Compute the qi generation rate in qi per second.
///
/// A missing location (character in transit, or map data unavailable)
/// falls back to the configured ambient density.
pub fn qi_generation_rate(
    character: &CharacterSnapshot,
    location: Option<&LocationSnapshot>,
    config: &TuningConfig,
) -> f64 {
    let qi_density = location.map_or(config.qi.default_qi_density, |loc| loc.qi_density);

    let core_rate =
        character.core_capacity * config.qi.core_regen_fraction_per_day / config.qi.seconds_per_day;
    let environmental_rate = qi_density * character.conductivity / config.qi.seconds_per_day;

    core_rate + environmental_rate
}

/// Compute the qi gained over a duration, clamped to a capacity fraction.
///
/// `cap_fraction` is 0.90 for passive accumulation and 1.0 for meditative
/// accumulation. When the cap is reached mid-duration the gain is clamped
/// to the cap and the remainder is reported in [`QiGain::dissipated`].
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] for a non-positive capacity or a
/// negative rate, duration, or cap fraction.
pub fn calculate_passive_qi_gain(
    current_qi: f64,
    core_capacity: f64,
    rate_per_second: f64,
    duration_seconds: f64,
    cap_fraction: f64,
) -> Result<QiGain, SimError> {
    if core_capacity <= 0.0 {
        return Err(SimError::invalid("core_capacity must be positive"));
    }
    if rate_per_second < 0.0 {
        return Err(SimError::invalid("rate_per_second must not be negative"));
    }
    if duration_seconds < 0.0 {
        return Err(SimError::invalid("duration_seconds must not be negative"));
    }
    if !(0.0..=1.0).contains(&cap_fraction) {
        return Err(SimError::invalid("cap_fraction must be within [0, 1]"));
    }

    let cap = core_capacity * cap_fraction;
    let drawn = rate_per_second * duration_seconds;

    if current_qi >= cap {
        // Already at or past the cap: everything drawn dissipates.
        return Ok(QiGain {
            gained: 0.0,
            dissipated: drawn,
            capped: drawn > 0.0,
        });
    }

    let headroom = cap - current_qi;
    if drawn <= headroom {
        Ok(QiGain {
            gained: drawn,
            dissipated: 0.0,
            capped: false,
        })
    } else {
        Ok(QiGain {
            gained: headroom,
            dissipated: drawn - headroom,
            capped: true,
        })
    }
}

/// Compute how much above-cap qi dissipates over a duration.
///
/// Qi held above the passive cap (e.g. right after a full meditative fill)
/// decays toward the cap at `dissipation_fraction_per_day` of the excess
/// per in-world day, and never decays below the cap itself.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] for a non-positive capacity or a
/// negative duration.
pub fn calculate_passive_qi_dissipation(
    current_qi: f64,
    core_capacity: f64,
    duration_seconds: f64,
    config: &TuningConfig,
) -> Result<f64, SimError> {
    if core_capacity <= 0.0 {
        return Err(SimError::invalid("core_capacity must be positive"));
    }
    if duration_seconds < 0.0 {
        return Err(SimError::invalid("duration_seconds must not be negative"));
    }

    let cap = core_capacity * config.qi.passive_cap_fraction;
    let excess = current_qi - cap;
    if excess <= 0.0 {
        return Ok(0.0);
    }

    let days = duration_seconds / config.qi.seconds_per_day;
    let loss = excess * config.qi.dissipation_fraction_per_day * days;
    Ok(loss.min(excess))
}

/// Apply a passive (non-meditative) accumulation window to a character.
///
/// Adds the clamped gain to both `current_qi` and the lifetime
/// `accumulated_qi` counter, then applies above-cap dissipation for the
/// same window. Returns the gain record for the caller to report.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] on malformed input.
pub fn apply_passive_window(
    character: &mut CharacterSnapshot,
    location: Option<&LocationSnapshot>,
    duration_seconds: f64,
    config: &TuningConfig,
) -> Result<QiGain, SimError> {
    let rate = qi_generation_rate(character, location, config);
    let gain = calculate_passive_qi_gain(
        character.current_qi,
        character.core_capacity,
        rate,
        duration_seconds,
        config.qi.passive_cap_fraction,
    )?;

    let dissipation = calculate_passive_qi_dissipation(
        character.current_qi,
        character.core_capacity,
        duration_seconds,
        config,
    )?;

    character.current_qi = character.current_qi + gain.gained - dissipation;
    character.accumulated_qi += gain.gained;

    Ok(gain)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ascension_types::{DangerLevel, LocationId, Terrain};

    use super::*;

    fn test_character() -> CharacterSnapshot {
        CharacterSnapshot {
            core_capacity: 1000.0,
            current_qi: 100.0,
            accumulated_qi: 0.0,
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

    fn mountain_peak() -> LocationSnapshot {
        LocationSnapshot {
            location_id: LocationId::new(),
            qi_density: 40.0,
            danger_level: DangerLevel::Moderate,
            terrain: Terrain::Mountain,
            distance_from_center: 120.0,
        }
    }

    #[test]
    fn rate_sums_core_and_environment() {
        let character = test_character();
        let config = TuningConfig::default();
        let location = mountain_peak();

        let rate = qi_generation_rate(&character, Some(&location), &config);
        // Core: 1000 * 0.10 / 86400; environment: 40 * 5 / 86400.
        let expected = (100.0 + 200.0) / 86_400.0;
        assert!((rate - expected).abs() < 1e-12);
    }

    #[test]
    fn missing_location_uses_ambient_density() {
        let character = test_character();
        let config = TuningConfig::default();

        let rate = qi_generation_rate(&character, None, &config);
        let expected = (100.0 + 10.0 * 5.0) / 86_400.0;
        assert!((rate - expected).abs() < 1e-12);
    }

    #[test]
    fn passive_gain_clamps_at_ninety_percent() {
        // coreCapacity=1000, currentQi=890, a 50-qi draw: only 10 fits
        // under the 900 passive cap.
        let gain = calculate_passive_qi_gain(890.0, 1000.0, 1.0, 50.0, 0.90).unwrap();
        assert!((gain.gained - 10.0).abs() < 1e-9);
        assert!((gain.dissipated - 40.0).abs() < 1e-9);
        assert!(gain.capped);
    }

    #[test]
    fn meditative_gain_reaches_full_capacity() {
        let gain = calculate_passive_qi_gain(950.0, 1000.0, 1.0, 100.0, 1.0).unwrap();
        assert!((gain.gained - 50.0).abs() < 1e-9);
        assert!(gain.capped);
    }

    #[test]
    fn gain_below_cap_is_uncapped() {
        let gain = calculate_passive_qi_gain(100.0, 1000.0, 0.5, 60.0, 0.90).unwrap();
        assert!((gain.gained - 30.0).abs() < 1e-9);
        assert!((gain.dissipated - 0.0).abs() < 1e-12);
        assert!(!gain.capped);
    }

    #[test]
    fn at_cap_everything_dissipates() {
        let gain = calculate_passive_qi_gain(900.0, 1000.0, 1.0, 25.0, 0.90).unwrap();
        assert!((gain.gained - 0.0).abs() < 1e-12);
        assert!((gain.dissipated - 25.0).abs() < 1e-9);
        assert!(gain.capped);
    }

    #[test]
    fn invalid_inputs_rejected() {
        assert!(calculate_passive_qi_gain(0.0, 0.0, 1.0, 1.0, 0.9).is_err());
        assert!(calculate_passive_qi_gain(0.0, 100.0, -1.0, 1.0, 0.9).is_err());
        assert!(calculate_passive_qi_gain(0.0, 100.0, 1.0, -1.0, 0.9).is_err());
        assert!(calculate_passive_qi_gain(0.0, 100.0, 1.0, 1.0, 1.5).is_err());
    }

    #[test]
    fn dissipation_only_above_cap() {
        let config = TuningConfig::default();
        let none = calculate_passive_qi_dissipation(850.0, 1000.0, 86_400.0, &config).unwrap();
        assert!((none - 0.0).abs() < 1e-12);

        // 100 excess above the 900 cap, 25% per day over one day.
        let some = calculate_passive_qi_dissipation(1000.0, 1000.0, 86_400.0, &config).unwrap();
        assert!((some - 25.0).abs() < 1e-9);
    }

    #[test]
    fn dissipation_never_exceeds_excess() {
        let config = TuningConfig::default();
        // Ten days of decay cannot remove more than the excess itself.
        let loss =
            calculate_passive_qi_dissipation(1000.0, 1000.0, 10.0 * 86_400.0, &config).unwrap();
        assert!((loss - 100.0).abs() < 1e-9);
    }

    #[test]
    fn passive_window_updates_both_counters() {
        let mut character = test_character();
        let config = TuningConfig::default();

        // One in-world day at ambient density: 100 core + 50 environmental.
        let gain =
            apply_passive_window(&mut character, None, 86_400.0, &config).unwrap();
        assert!((gain.gained - 150.0).abs() < 1e-9);
        assert!((character.current_qi - 250.0).abs() < 1e-9);
        assert!((character.accumulated_qi - 150.0).abs() < 1e-9);
    }
}

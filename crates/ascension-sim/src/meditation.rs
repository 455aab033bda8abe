//! Meditation session resolution.
//!
//! Pulls the oracle, the qi model, and the fatigue model together into a
//! single state transition: run the interruption draws, credit qi for the
//! minutes that actually elapsed (never the full requested duration when
//! interrupted), and apply the recover-body/tax-mind fatigue asymmetry.
//!
//! The caller owns the clock: it advances world time by
//! [`MeditationOutcome::minutes_elapsed`] after applying the outcome.

use ascension_types::{
    CharacterSnapshot, InterruptionEvent, LocationSnapshot, RecoveryActivity, WorldTime,
};
use rand::Rng;

use crate::config::TuningConfig;
use crate::error::SimError;
use crate::fatigue::recover_fatigue;
use crate::interruption::check_meditation_interruption;
use crate::qi::{calculate_passive_qi_gain, qi_generation_rate};

/// Seconds per in-world minute.
const SECONDS_PER_MINUTE: f64 = 60.0;

/// What happened over one meditation session.
#[derive(Debug, Clone, PartialEq)]
pub struct MeditationOutcome {
    /// Whether the session ran its full requested duration.
    pub completed: bool,
    /// Minutes that actually elapsed; the caller advances time by this.
    pub minutes_elapsed: u32,
    /// Qi credited to the core.
    pub qi_gained: f64,
    /// Qi drawn past the full-capacity cap and lost.
    pub qi_dissipated: f64,
    /// Physical fatigue recovered.
    pub physical_recovered: f64,
    /// Mental fatigue charged by the session.
    pub mental_cost: f64,
    /// The event that cut the session short, if any.
    pub interruption: Option<InterruptionEvent>,
}

/// Resolve a meditation session against a character snapshot.
///
/// Meditative accumulation runs at the boosted meditation rate and may fill
/// the core to 100% of capacity (the passive 90% cap does not apply). Qi
/// drawn while the core is full dissipates, but still counts toward the
/// lifetime accumulation that gates breakthroughs -- channeling the qi is
/// what tempers the core, holding it is not required.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] for a malformed snapshot
/// (non-positive capacity). Interruption is an outcome, not an error.
pub fn perform_meditation(
    character: &mut CharacterSnapshot,
    location: Option<&LocationSnapshot>,
    time: &WorldTime,
    duration_minutes: u32,
    rng: &mut impl Rng,
    config: &TuningConfig,
) -> Result<MeditationOutcome, SimError> {
    if character.core_capacity <= 0.0 {
        return Err(SimError::invalid("core_capacity must be positive"));
    }

    let check = check_meditation_interruption(
        character,
        location,
        time,
        duration_minutes,
        rng,
        config,
    );
    let minutes_elapsed = check.check_tick;

    let rate = qi_generation_rate(character, location, config)
        * config.qi.meditation_rate_multiplier;
    let gain = calculate_passive_qi_gain(
        character.current_qi,
        character.core_capacity,
        rate,
        f64::from(minutes_elapsed) * SECONDS_PER_MINUTE,
        1.0,
    )?;

    character.current_qi += gain.gained;
    character.accumulated_qi += gain.gained + gain.dissipated;

    let fatigue = recover_fatigue(
        character,
        RecoveryActivity::Meditation,
        minutes_elapsed,
        config,
    );

    tracing::debug!(
        minutes_elapsed,
        qi_gained = gain.gained,
        interrupted = check.interrupted,
        "Meditation resolved"
    );

    Ok(MeditationOutcome {
        completed: !check.interrupted,
        minutes_elapsed,
        qi_gained: gain.gained,
        qi_dissipated: gain.dissipated,
        physical_recovered: fatigue.physical.max(0.0),
        mental_cost: (-fatigue.mental).max(0.0),
        interruption: check.event,
    })
}

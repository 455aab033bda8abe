//! The interruption oracle for meditation sessions.
//!
//! A meditation session runs minute by minute; each minute gets an
//! independent pseudo-random draw against a probability built from the
//! location's danger level, the time-of-day phase at that minute, and the
//! character's perception. The first triggering draw ends the session at
//! that tick and synthesizes an event from a weighted category table.
//!
//! The random source is injected by the caller, as with every stochastic
//! path in this workspace: given the same inputs and the same seeded
//! generator, the check is fully reproducible.

use ascension_types::{
    CharacterSnapshot, DangerLevel, InterruptionEvent, InterruptionKind, LocationSnapshot,
    WorldTime,
};
use rand::Rng;

use crate::calendar;
use crate::config::TuningConfig;

/// Danger level assumed when no location snapshot is available.
const DEFAULT_DANGER: DangerLevel = DangerLevel::Low;

/// Narrative seeds for creature interruptions.
const CREATURE_DESCRIPTIONS: [&str; 3] = [
    "A spirit beast prowls the edge of your meditation site, nostrils flaring.",
    "Heavy footfalls circle closer; something large has caught your scent.",
    "A horned serpent slides out of the undergrowth, tasting the disturbed qi.",
];

/// Narrative seeds for person interruptions.
const PERSON_DESCRIPTIONS: [&str; 3] = [
    "A rogue cultivator lands nearby, openly appraising your unguarded state.",
    "A woodcutter blunders into the clearing and freezes at the sight of you.",
    "Footsteps on the trail: a patrol from a nearby sect is sweeping the area.",
];

/// Narrative seeds for spirit interruptions.
const SPIRIT_DESCRIPTIONS: [&str; 3] = [
    "A resentful apparition coalesces from the mist, drawn to your open core.",
    "Whispers without a source thread through your spiritual sense.",
    "A pale figure watches from between the trees, flickering like a candle.",
];

/// Narrative seeds for phenomenon interruptions.
const PHENOMENON_DESCRIPTIONS: [&str; 3] = [
    "The ambient qi shudders and reverses flow, scattering your rhythm.",
    "A sudden storm front rolls in; thunder cracks directly overhead.",
    "The ground trembles as a distant formation discharges violently.",
];

/// Result of running the interruption oracle over a requested duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptionCheck {
    /// Whether any minute's draw triggered an interruption.
    pub interrupted: bool,
    /// The minute (0-based) the session ended at; equals the requested
    /// duration when the session completed.
    pub check_tick: u32,
    /// The synthesized event when interrupted.
    pub event: Option<InterruptionEvent>,
}

/// Run the per-minute interruption draws for a meditation session.
///
/// A `None` location implies default low-risk values. The probability for
/// each minute uses the time-of-day phase *at that minute*, so a session
/// that starts at dusk and runs into the night gets the night multiplier
/// for its later draws.
pub fn check_meditation_interruption(
    character: &CharacterSnapshot,
    location: Option<&LocationSnapshot>,
    time: &WorldTime,
    duration_minutes: u32,
    rng: &mut impl Rng,
    config: &TuningConfig,
) -> InterruptionCheck {
    let danger = location.map_or(DEFAULT_DANGER, |loc| loc.danger_level);
    let base = config.interruption.base_chance(danger);
    let perception_factor =
        1.0 + character.perception.max(0.0) / config.interruption.perception_scale;

    for minute in 0..duration_minutes {
        let ticks = time
            .ticks_since_epoch
            .saturating_add(u64::from(minute));
        let phase = calendar::from_ticks(ticks)
            .map(|t| calendar::time_of_day(&t))
            .unwrap_or(ascension_types::TimeOfDay::Night);

        let chance =
            (base * config.interruption.time_multiplier(phase) / perception_factor).clamp(0.0, 1.0);

        if rng.random::<f64>() < chance {
            let event = synthesize_event(minute, rng, config);
            tracing::debug!(
                minute,
                kind = ?event.kind,
                ?danger,
                "Meditation interrupted"
            );
            return InterruptionCheck {
                interrupted: true,
                check_tick: minute,
                event: Some(event),
            };
        }
    }

    InterruptionCheck {
        interrupted: false,
        check_tick: duration_minutes,
        event: None,
    }
}

/// Draw an interruption category and build the event for it.
fn synthesize_event(
    check_tick: u32,
    rng: &mut impl Rng,
    config: &TuningConfig,
) -> InterruptionEvent {
    let kind = draw_kind(rng, config);
    let (descriptions, can_ignore, can_hide) = match kind {
        // A creature must be dealt with, but the cultivator can try to
        // stay unnoticed.
        InterruptionKind::Creature => (&CREATURE_DESCRIPTIONS, false, true),
        InterruptionKind::Person => (&PERSON_DESCRIPTIONS, true, true),
        // A spirit senses the open core directly: no ignoring, no hiding.
        InterruptionKind::Spirit => (&SPIRIT_DESCRIPTIONS, false, false),
        InterruptionKind::Phenomenon => (&PHENOMENON_DESCRIPTIONS, true, false),
    };

    let idx: usize = rng.random_range(0..descriptions.len());
    let description = descriptions.get(idx).copied().unwrap_or_default().to_owned();

    InterruptionEvent {
        kind,
        description,
        check_tick,
        can_ignore,
        can_hide,
    }
}

/// Weighted draw over the interruption categories.
fn draw_kind(rng: &mut impl Rng, config: &TuningConfig) -> InterruptionKind {
    let cfg = &config.interruption;
    let total = cfg
        .creature_weight
        .saturating_add(cfg.person_weight)
        .saturating_add(cfg.spirit_weight)
        .saturating_add(cfg.phenomenon_weight)
        .max(1);

    let roll: u32 = rng.random_range(0..total);
    if roll < cfg.creature_weight {
        InterruptionKind::Creature
    } else if roll < cfg.creature_weight.saturating_add(cfg.person_weight) {
        InterruptionKind::Person
    } else if roll
        < cfg
            .creature_weight
            .saturating_add(cfg.person_weight)
            .saturating_add(cfg.spirit_weight)
    {
        InterruptionKind::Spirit
    } else {
        InterruptionKind::Phenomenon
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use ascension_types::{LocationId, Terrain};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::calendar::from_parts;

    fn watcher(perception: f64) -> CharacterSnapshot {
        CharacterSnapshot {
            core_capacity: 1000.0,
            current_qi: 100.0,
            accumulated_qi: 0.0,
            cultivation_level: 1,
            cultivation_sub_level: 0,
            physical_fatigue: 0.0,
            mental_fatigue: 0.0,
            conductivity: 5.0,
            perception,
            current_health: 100.0,
            max_health: 100.0,
        }
    }

    fn deadly_ruin() -> LocationSnapshot {
        LocationSnapshot {
            location_id: LocationId::new(),
            qi_density: 5.0,
            danger_level: DangerLevel::Deadly,
            terrain: Terrain::Wasteland,
            distance_from_center: 300.0,
        }
    }

    #[test]
    fn same_seed_same_outcome() {
        let character = watcher(10.0);
        let location = deadly_ruin();
        let time = from_parts(1, 1, 1, 22, 0).unwrap();
        let config = TuningConfig::default();

        let mut rng_a = SmallRng::seed_from_u64(42);
        let mut rng_b = SmallRng::seed_from_u64(42);

        let a = check_meditation_interruption(
            &character, Some(&location), &time, 480, &mut rng_a, &config,
        );
        let b = check_meditation_interruption(
            &character, Some(&location), &time, 480, &mut rng_b, &config,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn zero_duration_always_completes() {
        let character = watcher(10.0);
        let time = from_parts(1, 1, 1, 0, 0).unwrap();
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);

        let check =
            check_meditation_interruption(&character, None, &time, 0, &mut rng, &config);
        assert!(!check.interrupted);
        assert_eq!(check.check_tick, 0);
        assert!(check.event.is_none());
    }

    #[test]
    fn interrupted_session_carries_event_at_check_tick() {
        let character = watcher(0.0);
        let location = deadly_ruin();
        let time = from_parts(1, 1, 1, 1, 0).unwrap();
        let config = TuningConfig::default();

        // Deadly ground at night for a week of minutes: some seed in this
        // range must interrupt; verify the event invariants when one does.
        let mut saw_interruption = false;
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let check = check_meditation_interruption(
                &character, Some(&location), &time, 10_080, &mut rng, &config,
            );
            if check.interrupted {
                saw_interruption = true;
                let event = check.event.unwrap();
                assert_eq!(event.check_tick, check.check_tick);
                assert!(check.check_tick < 10_080);
                assert!(!event.description.is_empty());
            }
        }
        assert!(saw_interruption, "deadly ground never interrupted across 20 seeds");
    }

    #[test]
    fn perception_reduces_interruption_rate() {
        let location = deadly_ruin();
        let time = from_parts(1, 1, 1, 12, 0).unwrap();
        let config = TuningConfig::default();

        let count_interruptions = |perception: f64| -> u32 {
            let character = watcher(perception);
            let mut hits = 0;
            for seed in 0..200 {
                let mut rng = SmallRng::seed_from_u64(seed);
                let check = check_meditation_interruption(
                    &character, Some(&location), &time, 120, &mut rng, &config,
                );
                if check.interrupted {
                    hits += 1;
                }
            }
            hits
        };

        let blind = count_interruptions(0.0);
        let keen = count_interruptions(400.0);
        assert!(
            keen < blind,
            "keen perception ({keen}) should interrupt less than none ({blind})"
        );
    }

    #[test]
    fn kind_draw_respects_degenerate_weights() {
        let mut config = TuningConfig::default();
        config.interruption.creature_weight = 0;
        config.interruption.person_weight = 0;
        config.interruption.spirit_weight = 0;
        config.interruption.phenomenon_weight = 1;

        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..50 {
            assert_eq!(draw_kind(&mut rng, &config), InterruptionKind::Phenomenon);
        }
    }

    #[test]
    fn safe_ground_rarely_interrupts_short_sessions() {
        let character = watcher(50.0);
        let time = from_parts(1, 1, 1, 10, 0).unwrap();
        let config = TuningConfig::default();

        let safe = LocationSnapshot {
            danger_level: DangerLevel::Safe,
            ..deadly_ruin()
        };

        let mut hits = 0;
        for seed in 0..100 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let check = check_meditation_interruption(
                &character, Some(&safe), &time, 60, &mut rng, &config,
            );
            if check.interrupted {
                hits += 1;
            }
        }
        // Expected rate is ~0.0002/minute over 60 minutes: about 1%.
        assert!(hits < 15, "safe ground interrupted {hits}/100 hour sessions");
    }
}

//! Translating inbound game actions into simulation transitions.
//!
//! Every action resolves to "mutate the character, then advance the clock
//! by the minutes the action consumed", executed atomically under the
//! session's slot lock. The transition is computed on a scratch copy and
//! committed only if every step succeeds, so a rejected action leaves the
//! session exactly as it was.

use ascension_sim::{
    BreakthroughOutcome, FatigueDelta, MeditationOutcome, QiGain, SimError, TuningConfig,
    accrue_fatigue, apply_effect, apply_passive_window, attempt_breakthrough, calendar,
    perform_meditation, recover_fatigue,
};
use ascension_types::{
    CharacterSnapshot, GameAction, LocationSnapshot, SessionId, SessionState, WorldTime,
};
use rand::Rng;

use crate::authority::SessionAuthority;
use crate::error::SessionError;

/// Seconds per in-world minute.
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Errors produced while resolving a game action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The target session could not be used.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The simulation rejected the transition.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// A technique demanded more qi than the core holds.
    #[error("insufficient qi: technique needs {required}, core holds {available}")]
    InsufficientQi {
        /// Qi the technique requires.
        required: f64,
        /// Qi currently in the core.
        available: f64,
    },
}

/// What an applied action did to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Ticks the world clock advanced.
    pub ticks_advanced: u64,
    /// Meditation result, for meditate actions.
    pub meditation: Option<MeditationOutcome>,
    /// Breakthrough result, for breakthrough actions.
    pub breakthrough: Option<BreakthroughOutcome>,
    /// Passive qi accumulation over the action window, where applicable.
    pub qi: Option<QiGain>,
    /// Fatigue recovery applied, for rest actions.
    pub fatigue: Option<FatigueDelta>,
    /// Session state after the action.
    pub state: SessionState,
}

/// The per-field results of a transition, before the state is attached.
#[derive(Debug)]
struct Applied {
    ticks_advanced: u64,
    meditation: Option<MeditationOutcome>,
    breakthrough: Option<BreakthroughOutcome>,
    qi: Option<QiGain>,
    fatigue: Option<FatigueDelta>,
}

impl Applied {
    const fn advance(ticks_advanced: u64) -> Self {
        Self {
            ticks_advanced,
            meditation: None,
            breakthrough: None,
            qi: None,
            fatigue: None,
        }
    }
}

/// Resolve a game action against a resident session.
///
/// The location snapshot is whatever the map subsystem knows about the
/// character's surroundings; `None` falls back to ambient qi density and
/// low danger. Randomness is injected so callers control reproducibility.
///
/// # Errors
///
/// Returns [`ActionError::Session`] if the session is not resident,
/// [`ActionError::InsufficientQi`] if a technique cannot be paid for, or
/// [`ActionError::Sim`] if the simulation rejects the transition. On any
/// error the session state is unchanged.
pub async fn apply_action(
    authority: &SessionAuthority,
    id: SessionId,
    action: &GameAction,
    location: Option<&LocationSnapshot>,
    rng: &mut impl Rng,
    config: &TuningConfig,
) -> Result<ActionOutcome, ActionError> {
    let (applied, state) = authority
        .mutate(id, |character, time| {
            apply_to_snapshot(character, time, action, location, rng, config)
        })
        .await?;
    let applied = applied?;

    tracing::debug!(
        session_id = %id,
        ticks_advanced = applied.ticks_advanced,
        "Action applied"
    );

    Ok(ActionOutcome {
        ticks_advanced: applied.ticks_advanced,
        meditation: applied.meditation,
        breakthrough: applied.breakthrough,
        qi: applied.qi,
        fatigue: applied.fatigue,
        state,
    })
}

/// Compute the transition on scratch copies; commit only on full success.
fn apply_to_snapshot(
    character: &mut CharacterSnapshot,
    time: &mut WorldTime,
    action: &GameAction,
    location: Option<&LocationSnapshot>,
    rng: &mut impl Rng,
    config: &TuningConfig,
) -> Result<Applied, ActionError> {
    let mut scratch = character.clone();
    let mut clock = *time;

    let applied = match *action {
        GameAction::Meditate { duration_minutes } => {
            let outcome = perform_meditation(
                &mut scratch,
                location,
                &clock,
                duration_minutes,
                rng,
                config,
            )?;
            // Interruption cuts the clock short along with the session.
            let ticks = u64::from(outcome.minutes_elapsed);
            clock = calendar::advance(&clock, ticks)?;
            Applied {
                meditation: Some(outcome),
                ..Applied::advance(ticks)
            }
        }
        GameAction::Rest {
            activity,
            duration_minutes,
        } => {
            let fatigue = recover_fatigue(&mut scratch, activity, duration_minutes, config);
            let qi = apply_passive_window(
                &mut scratch,
                location,
                f64::from(duration_minutes) * SECONDS_PER_MINUTE,
                config,
            )?;
            let ticks = u64::from(duration_minutes);
            clock = calendar::advance(&clock, ticks)?;
            Applied {
                qi: Some(qi),
                fatigue: Some(fatigue),
                ..Applied::advance(ticks)
            }
        }
        GameAction::Travel { duration_minutes } => {
            accrue_fatigue(
                &mut scratch,
                config.fatigue.travel_physical_cost_per_minute * f64::from(duration_minutes),
                0.0,
            );
            // The body still absorbs ambient qi on the road.
            let qi = apply_passive_window(
                &mut scratch,
                location,
                f64::from(duration_minutes) * SECONDS_PER_MINUTE,
                config,
            )?;
            let ticks = u64::from(duration_minutes);
            clock = calendar::advance(&clock, ticks)?;
            Applied {
                qi: Some(qi),
                ..Applied::advance(ticks)
            }
        }
        GameAction::Breakthrough { duration_minutes } => {
            let outcome = attempt_breakthrough(&mut scratch, config)?;
            // Time is spent whether the attempt succeeds or not.
            let ticks = u64::from(duration_minutes);
            clock = calendar::advance(&clock, ticks)?;
            Applied {
                breakthrough: Some(outcome),
                ..Applied::advance(ticks)
            }
        }
        GameAction::UseTechnique {
            qi_cost,
            mental_fatigue_cost,
            duration_minutes,
            ref effects,
        } => {
            if qi_cost < 0.0 || mental_fatigue_cost < 0.0 {
                return Err(SimError::invalid("technique costs must not be negative").into());
            }
            if scratch.current_qi < qi_cost {
                return Err(ActionError::InsufficientQi {
                    required: qi_cost,
                    available: scratch.current_qi,
                });
            }
            scratch.current_qi -= qi_cost;
            accrue_fatigue(&mut scratch, 0.0, mental_fatigue_cost);
            for effect in effects {
                apply_effect(&mut scratch, effect)?;
            }
            let ticks = u64::from(duration_minutes);
            clock = calendar::advance(&clock, ticks)?;
            Applied::advance(ticks)
        }
    };

    *character = scratch;
    *time = clock;
    Ok(applied)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use ascension_sim::calendar::from_parts;
    use ascension_types::{
        CharacterId, DangerLevel, Effect, LocationId, RecoveryActivity, Terrain,
    };
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::PersistenceGateway;

    struct MemoryGateway {
        stored: std::sync::Mutex<BTreeMap<SessionId, SessionState>>,
    }

    #[async_trait]
    impl PersistenceGateway for MemoryGateway {
        async fn find_session(
            &self,
            id: SessionId,
        ) -> Result<Option<SessionState>, GatewayError> {
            Ok(self.stored.lock().unwrap().get(&id).cloned())
        }

        async fn update_character(&self, state: &SessionState) -> Result<(), GatewayError> {
            self.stored
                .lock()
                .unwrap()
                .insert(state.session_id, state.clone());
            Ok(())
        }

        async fn update_session_time(&self, state: &SessionState) -> Result<(), GatewayError> {
            self.stored
                .lock()
                .unwrap()
                .insert(state.session_id, state.clone());
            Ok(())
        }
    }

    fn seeded_state() -> SessionState {
        SessionState {
            session_id: SessionId::new(),
            character_id: CharacterId::new(),
            character: CharacterSnapshot {
                core_capacity: 1000.0,
                current_qi: 300.0,
                accumulated_qi: 2000.0,
                cultivation_level: 1,
                cultivation_sub_level: 2,
                physical_fatigue: 50.0,
                mental_fatigue: 20.0,
                conductivity: 5.0,
                perception: 10.0,
                current_health: 100.0,
                max_health: 100.0,
            },
            time: from_parts(1, 3, 10, 8, 0).unwrap(),
        }
    }

    async fn loaded_authority(state: SessionState) -> SessionAuthority {
        let mut stored = BTreeMap::new();
        stored.insert(state.session_id, state.clone());
        let gateway = Arc::new(MemoryGateway {
            stored: std::sync::Mutex::new(stored),
        });
        let authority = SessionAuthority::new(gateway);
        authority.load_session(state.session_id).await.unwrap();
        authority
    }

    fn safe_meadow() -> LocationSnapshot {
        LocationSnapshot {
            location_id: LocationId::new(),
            qi_density: 20.0,
            danger_level: DangerLevel::Safe,
            terrain: Terrain::Plains,
            distance_from_center: 10.0,
        }
    }

    #[tokio::test]
    async fn meditate_advances_clock_by_elapsed_minutes() {
        let state = seeded_state();
        let id = state.session_id;
        let before_ticks = state.time.ticks_since_epoch;
        let authority = loaded_authority(state).await;
        let location = safe_meadow();
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);

        let outcome = apply_action(
            &authority,
            id,
            &GameAction::Meditate {
                duration_minutes: 60,
            },
            Some(&location),
            &mut rng,
            &config,
        )
        .await
        .unwrap();

        let meditation = outcome.meditation.unwrap();
        assert_eq!(
            outcome.ticks_advanced,
            u64::from(meditation.minutes_elapsed)
        );
        assert_eq!(
            outcome.state.time.ticks_since_epoch,
            before_ticks + outcome.ticks_advanced
        );
    }

    #[tokio::test]
    async fn rest_recovers_fatigue_and_advances_clock() {
        let state = seeded_state();
        let id = state.session_id;
        let before = state.character.clone();
        let authority = loaded_authority(state).await;
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let outcome = apply_action(
            &authority,
            id,
            &GameAction::Rest {
                activity: RecoveryActivity::Sleep,
                duration_minutes: 120,
            },
            None,
            &mut rng,
            &config,
        )
        .await
        .unwrap();

        assert_eq!(outcome.ticks_advanced, 120);
        assert!(outcome.state.character.physical_fatigue < before.physical_fatigue);
        assert!(outcome.state.character.mental_fatigue < before.mental_fatigue);
        // Passive absorption still ran during sleep.
        assert!(outcome.state.character.current_qi > before.current_qi);
    }

    #[tokio::test]
    async fn travel_accrues_physical_fatigue() {
        let state = seeded_state();
        let id = state.session_id;
        let before_fatigue = state.character.physical_fatigue;
        let authority = loaded_authority(state).await;
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let outcome = apply_action(
            &authority,
            id,
            &GameAction::Travel {
                duration_minutes: 100,
            },
            None,
            &mut rng,
            &config,
        )
        .await
        .unwrap();

        // 0.30 physical per minute over 100 minutes.
        let expected = before_fatigue + 30.0;
        assert!((outcome.state.character.physical_fatigue - expected).abs() < 1e-9);
        assert_eq!(outcome.ticks_advanced, 100);
    }

    #[tokio::test]
    async fn technique_spends_qi_and_applies_effects() {
        let state = seeded_state();
        let id = state.session_id;
        let authority = loaded_authority(state).await;
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let outcome = apply_action(
            &authority,
            id,
            &GameAction::UseTechnique {
                qi_cost: 100.0,
                mental_fatigue_cost: 5.0,
                duration_minutes: 2,
                effects: vec![Effect::Healing { amount: 10.0 }],
            },
            None,
            &mut rng,
            &config,
        )
        .await
        .unwrap();

        assert!((outcome.state.character.current_qi - 200.0).abs() < f64::EPSILON);
        assert!((outcome.state.character.mental_fatigue - 25.0).abs() < f64::EPSILON);
        assert_eq!(outcome.ticks_advanced, 2);
    }

    #[tokio::test]
    async fn technique_rejects_insufficient_qi_without_mutation() {
        let state = seeded_state();
        let id = state.session_id;
        let before = state.clone();
        let authority = loaded_authority(state).await;
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let result = apply_action(
            &authority,
            id,
            &GameAction::UseTechnique {
                qi_cost: 10_000.0,
                mental_fatigue_cost: 0.0,
                duration_minutes: 1,
                effects: vec![],
            },
            None,
            &mut rng,
            &config,
        )
        .await;

        assert!(matches!(result, Err(ActionError::InsufficientQi { .. })));
        // The session is untouched by the rejected action.
        let after = authority.get_session_state(id).await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn failed_breakthrough_still_charges_time() {
        let mut state = seeded_state();
        state.character.accumulated_qi = 0.0;
        let id = state.session_id;
        let before_ticks = state.time.ticks_since_epoch;
        let before_character = state.character.clone();
        let authority = loaded_authority(state).await;
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let outcome = apply_action(
            &authority,
            id,
            &GameAction::Breakthrough {
                duration_minutes: 30,
            },
            None,
            &mut rng,
            &config,
        )
        .await
        .unwrap();

        assert!(matches!(
            outcome.breakthrough,
            Some(BreakthroughOutcome::Failed { .. })
        ));
        assert_eq!(outcome.state.time.ticks_since_epoch, before_ticks + 30);
        assert_eq!(outcome.state.character, before_character);
    }

    #[tokio::test]
    async fn successful_breakthrough_advances_ladder() {
        let mut state = seeded_state();
        // Level 1 sub 2 requires 12 fills of a 1000-capacity core.
        state.character.accumulated_qi = 12_000.0;
        let id = state.session_id;
        let authority = loaded_authority(state).await;
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let outcome = apply_action(
            &authority,
            id,
            &GameAction::Breakthrough {
                duration_minutes: 30,
            },
            None,
            &mut rng,
            &config,
        )
        .await
        .unwrap();

        assert!(matches!(
            outcome.breakthrough,
            Some(BreakthroughOutcome::Advanced {
                new_sub_level: 3,
                ..
            })
        ));
        assert_eq!(outcome.state.character.cultivation_sub_level, 3);
        assert!((outcome.state.character.core_capacity - 1100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn action_on_unknown_session_is_not_found() {
        let authority = loaded_authority(seeded_state()).await;
        let config = TuningConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let result = apply_action(
            &authority,
            SessionId::new(),
            &GameAction::Travel { duration_minutes: 1 },
            None,
            &mut rng,
            &config,
        )
        .await;

        assert!(matches!(
            result,
            Err(ActionError::Session(SessionError::NotFound(_)))
        ));
    }
}

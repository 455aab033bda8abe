//! Inbound game actions handled by the session authority.
//!
//! Every action is translated into "advance N ticks" plus a domain-specific
//! mutation computed by the simulation layer. The HTTP route layer (out of
//! scope here) only constructs these values and renders the results.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::effects::Effect;

/// A restorative activity with distinct fatigue recovery behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RecoveryActivity {
    /// Sitting down, light stretching: slow recovery of both pools.
    RestLight,
    /// Full sleep: fastest recovery of both pools.
    Sleep,
    /// Meditation: recovers the body while taxing the mind.
    Meditation,
}

/// An action submitted against an active session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameAction {
    /// Meditate for up to `duration_minutes`, subject to interruption.
    Meditate {
        /// Requested meditation length in minutes.
        duration_minutes: u32,
    },
    /// Rest using the given activity for the full duration.
    Rest {
        /// Which recovery activity to perform.
        activity: RecoveryActivity,
        /// Rest length in minutes.
        duration_minutes: u32,
    },
    /// Travel for `duration_minutes`, accruing physical fatigue.
    Travel {
        /// Travel time in minutes.
        duration_minutes: u32,
    },
    /// Attempt a breakthrough to the next rung of the cultivation ladder.
    ///
    /// The time cost is charged whether or not the attempt succeeds.
    Breakthrough {
        /// Time the attempt takes in minutes.
        duration_minutes: u32,
    },
    /// Execute a technique: spend qi, tax the mind, apply its effects.
    UseTechnique {
        /// Qi drawn from the core to power the technique.
        qi_cost: f64,
        /// Mental fatigue charged by the execution.
        mental_fatigue_cost: f64,
        /// Time the execution takes in minutes.
        duration_minutes: u32,
        /// Effects the technique applies to the user.
        effects: Vec<Effect>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_with_action_tag() {
        let action = GameAction::Meditate {
            duration_minutes: 60,
        };
        let json = serde_json::to_value(&action).ok();
        assert_eq!(
            json.as_ref().and_then(|v| v.get("action")).and_then(|a| a.as_str()),
            Some("meditate")
        );
    }

    #[test]
    fn rest_action_roundtrip() {
        let action = GameAction::Rest {
            activity: RecoveryActivity::Sleep,
            duration_minutes: 480,
        };
        let json = serde_json::to_string(&action).ok();
        let back: Result<GameAction, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(back.ok(), Some(action));
    }
}

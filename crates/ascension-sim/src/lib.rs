//! Deterministic resource simulation for the Ascension core.
//!
//! Everything in this crate is pure computation over the shared types:
//! no I/O, no global state, no ambient randomness. Stochastic paths take
//! an injected [`rand::Rng`] so every outcome is reproducible under a
//! seeded generator. The session authority (`ascension-session`) is the
//! only component that applies these transitions to live state.
//!
//! # Modules
//!
//! - [`calendar`] -- Tick-derived game calendar and time advancement
//! - [`config`] -- Tuning knobs ([`TuningConfig`]), YAML-loadable
//! - [`qi`] -- Generation rates, two-tier caps, dissipation
//! - [`breakthrough`] -- Cultivation ladder advancement
//! - [`fatigue`] -- Recovery/accrual with the meditation asymmetry
//! - [`interruption`] -- The meditation interruption oracle
//! - [`meditation`] -- Full meditation session resolution
//! - [`effects`] -- Applying tagged technique/consumable effects
//! - [`validate`] -- Invariant checks for tests and load-time auditing
//! - [`error`] -- [`SimError`]

pub mod breakthrough;
pub mod calendar;
pub mod config;
pub mod effects;
pub mod error;
pub mod fatigue;
pub mod interruption;
pub mod meditation;
pub mod qi;
pub mod validate;

// Re-export primary types at the crate root for convenience.
pub use breakthrough::{
    BreakthroughFailure, BreakthroughOutcome, MAX_CULTIVATION_LEVEL, MAX_SUB_LEVEL,
    attempt_breakthrough, required_fills,
};
pub use calendar::{advance, from_parts, from_ticks, time_of_day, total_days};
pub use config::{ConfigError, TuningConfig};
pub use effects::apply_effect;
pub use error::SimError;
pub use fatigue::{FatigueDelta, accrue_fatigue, clamp_fatigue, recover_fatigue};
pub use interruption::{InterruptionCheck, check_meditation_interruption};
pub use meditation::{MeditationOutcome, perform_meditation};
pub use qi::{
    QiGain, apply_passive_window, calculate_passive_qi_dissipation, calculate_passive_qi_gain,
    qi_generation_rate,
};
pub use validate::{validate_character, validate_world_time};

//! Shared type definitions for the Ascension cultivation simulation core.
//!
//! This crate defines the data model that the simulation layer, session
//! authority, and storage gateway all operate on. It contains no logic
//! beyond trivial accessors -- every state transition lives in
//! `ascension-sim` or `ascension-session`.
//!
//! # Modules
//!
//! - [`ids`] -- Typed UUID wrappers ([`SessionId`], [`CharacterId`], [`LocationId`])
//! - [`enums`] -- Closed enumerations (danger, terrain, time of day, interruption kinds)
//! - [`structs`] -- Core records (character snapshot, world time, location, session state)
//! - [`effects`] -- Tagged effect variants decoded at the storage boundary
//! - [`actions`] -- Inbound game actions and recovery activities

pub mod actions;
pub mod effects;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export everything at the crate root for convenience.
pub use actions::{GameAction, RecoveryActivity};
pub use effects::{Effect, StatKind};
pub use enums::{DangerLevel, InterruptionKind, Terrain, TimeOfDay};
pub use ids::{CharacterId, LocationId, SessionId};
pub use structs::{
    CharacterSnapshot, InterruptionEvent, LocationSnapshot, SessionState, WorldTime,
};

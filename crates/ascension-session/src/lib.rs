//! Session authority for the Ascension core.
//!
//! While a session is active its state lives here, in memory, as the
//! single source of truth: gameplay reads and writes never touch the
//! database directly. The database sees checkpoints -- on explicit flush,
//! on unload, and on shutdown -- through the [`PersistenceGateway`] port,
//! which `ascension-db` implements for Postgres.
//!
//! # Modules
//!
//! - [`authority`] -- The resident-session registry and its lifecycle
//! - [`actions`] -- Translating game actions into simulation transitions
//! - [`gateway`] -- The storage port the authority writes through
//! - [`error`] -- [`SessionError`] and [`GatewayError`]

pub mod actions;
pub mod authority;
pub mod error;
pub mod gateway;

pub use actions::{ActionError, ActionOutcome, apply_action};
pub use authority::{SessionAuthority, SessionRecord, UnloadOutcome};
pub use error::{GatewayError, SessionError};
pub use gateway::PersistenceGateway;

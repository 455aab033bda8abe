//! `PostgreSQL` persistence layer for Ascension sessions.
//!
//! The session authority (`ascension-session`) owns the hot in-memory
//! state; this crate is the cold store it checkpoints into. The only
//! gameplay-facing surface is the [`PersistenceGateway`] implementation on
//! [`SessionStore`] -- everything else is pool plumbing.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration, migrations
//! - [`session_store`] -- `sessions`/`characters` tables and the gateway
//! - [`error`] -- [`DbError`]
//!
//! [`PersistenceGateway`]: ascension_session::PersistenceGateway

pub mod error;
pub mod postgres;
pub mod session_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use session_store::{SessionRow, SessionStore};

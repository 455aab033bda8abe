//! The persistence port the session authority writes through.
//!
//! The authority owns the in-memory truth; this trait is its only view of
//! durable storage. Implementations live in `ascension-db` (Postgres) and
//! in test code (in-memory maps with failure injection).

use ascension_types::{SessionId, SessionState};
use async_trait::async_trait;

use crate::error::GatewayError;

/// Durable storage operations for session state.
///
/// Character and time are persisted by separate calls because they live in
/// separate tables; the authority treats a flush as complete only when both
/// succeed.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Load a session's persisted state, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the store cannot be read.
    async fn find_session(&self, id: SessionId) -> Result<Option<SessionState>, GatewayError>;

    /// Persist the character snapshot of the given session state.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails.
    async fn update_character(&self, state: &SessionState) -> Result<(), GatewayError>;

    /// Persist the world time of the given session state.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails.
    async fn update_session_time(&self, state: &SessionState) -> Result<(), GatewayError>;
}

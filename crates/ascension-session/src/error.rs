//! Error types for the session authority and its storage port.

use ascension_types::SessionId;

/// Errors produced by a persistence gateway implementation.
///
/// Gateway backends translate their native errors into these variants so
/// the authority never depends on a concrete storage crate.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backing store rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored payload could not be decoded into the expected shape.
    #[error("stored payload could not be decoded: {0}")]
    Decode(String),

    /// The backing store is unreachable.
    #[error("storage backend unavailable")]
    Unavailable,
}

/// Errors produced by the session authority.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session with the given id is resident or stored.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The persistence gateway failed.
    #[error(transparent)]
    Storage(#[from] GatewayError),
}

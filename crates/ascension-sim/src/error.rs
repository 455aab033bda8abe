//! Error types for the simulation layer.
//!
//! The pure computation functions are total except for malformed input:
//! bad arguments surface as [`SimError::InvalidArgument`], tick-counter
//! exhaustion as [`SimError::TickOverflow`]. Invariant breaches are
//! reported (and asserted in tests) rather than silently clamped away.

/// Errors that can occur during simulation computations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The caller supplied an out-of-contract argument.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Explanation of what is wrong with the input.
        reason: String,
    },

    /// Tick counter would overflow `u64::MAX`.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// A state invariant would be violated by the requested transition.
    #[error("invariant violation: {reason}")]
    InvariantViolation {
        /// Explanation of the breached invariant.
        reason: String,
    },
}

impl SimError {
    /// Shorthand for building an [`SimError::InvalidArgument`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

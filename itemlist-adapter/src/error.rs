//! Error types for adapter operations.

use itemlist::ListError;

use crate::Action;

/// Result type alias for adapter operations.
pub type Result<T> = core::result::Result<T, AdapterError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// The underlying list rejected the operation.
    #[error(transparent)]
    List(#[from] ListError),

    /// An interceptor declined the operation.
    #[error("{action} was vetoed: {reason}")]
    Vetoed { action: Action, reason: String },

    /// The controller was torn down while the operation was pending.
    #[error("controller has been torn down")]
    Detached,

    /// The collection was replaced while the operation was pending.
    #[error("collection was replaced while {action} was pending")]
    Superseded { action: Action },
}

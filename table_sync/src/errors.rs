//! Error types for table synchronisation and action dispatch.

use thiserror::Error;

/// Errors raised while following a table or acting on it.
///
/// The type is `Clone` so the last failure can sit in the snapshot store
/// next to the last-known-good snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Network or HTTP failure talking to the table server
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered, but not with the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// An action was attempted before any nonce was known
    #[error("No nonce known for the acting identity")]
    UnknownNonce,

    /// The submission capability rejected the action
    #[error("Action submission failed: {0}")]
    Submission(String),

    /// The table session was torn down
    #[error("Table session has ended")]
    SessionClosed,
}

/// Result type for synchronisation operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value is out of range or unparsable
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

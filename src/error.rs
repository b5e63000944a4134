//! Error types for capgate

use thiserror::Error;

/// The main error type for capgate operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// A permission value string could not be read as a non-negative integer
    #[error("invalid permission value {value:?}: {reason}")]
    InvalidPermissionValue { value: String, reason: String },

    /// A capability expression is malformed
    #[error("invalid expression {expression:?} at {position}: {reason}")]
    InvalidExpression {
        expression: String,
        position: usize,
        reason: String,
    },

    /// No ability object was available for the check
    #[error("no ability available")]
    MissingAbility,

    #[error("flag {0:?} is already registered")]
    DuplicateFlag(String),

    #[error("invalid flag name {0:?}")]
    InvalidFlagName(String),

    #[error("flag {0:?} is not registered")]
    UnknownFlag(String),

    /// A registry is not an append-only successor of an older one
    #[error("registry conflict at bit {bit}: expected {expected:?}, found {found:?}")]
    RegistryConflict {
        bit: usize,
        expected: String,
        found: Option<String>,
    },

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for capgate operations
pub type Result<T> = std::result::Result<T, AclError>;

/// Convert any error into a config error
pub(crate) fn config_err<E: std::error::Error>(e: E) -> AclError {
    AclError::Config(e.to_string())
}

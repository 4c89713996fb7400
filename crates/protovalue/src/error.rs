//! Error types for schema construction and loading
//!
//! Container operations do not return errors: misuse of a message or array
//! (an out-of-range index, a value whose kind does not match its field) is a
//! programming error and panics. Only building and loading schema metadata
//! can fail in a recoverable way.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised while building or loading message definitions
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Two fields in one message share a name
    #[error("Duplicate field name '{field}' in message '{message}'")]
    DuplicateFieldName {
        /// Message being built
        message: String,
        /// Offending field name
        field: String,
    },

    /// Two fields in one message share a field number
    #[error("Duplicate field number {number} in message '{message}'")]
    DuplicateFieldNumber {
        /// Message being built
        message: String,
        /// Offending field number
        number: u32,
    },

    /// Field number outside the valid protocol buffer range
    #[error("Field '{field}' has invalid number {number}")]
    InvalidFieldNumber {
        /// Offending field name
        field: String,
        /// The rejected number
        number: u32,
    },

    /// A message or group field without a nested definition
    #[error("Field '{field}' is a submessage but has no message type")]
    MissingMessageType {
        /// Offending field name
        field: String,
    },

    /// A nested definition attached to a non-message field
    #[error("Field '{field}' is not a submessage but names message type '{type_name}'")]
    UnexpectedMessageType {
        /// Offending field name
        field: String,
        /// The attached message type
        type_name: String,
    },

    /// A default value whose kind does not match the field
    #[error("Default for field '{field}': expected {expected}, got {got}")]
    DefaultTypeMismatch {
        /// Offending field name
        field: String,
        /// Kind required by the field type
        expected: ValueKind,
        /// Kind (or JSON shape) supplied
        got: String,
    },

    /// A default value on a field that cannot carry one
    #[error("Field '{field}' cannot have an explicit default (repeated or submessage)")]
    DefaultNotAllowed {
        /// Offending field name
        field: String,
    },

    /// A descriptor referenced a message type that is not registered
    #[error("Unknown message type '{0}'")]
    UnknownType(String),

    /// Descriptor JSON could not be decoded
    #[error("Descriptor JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

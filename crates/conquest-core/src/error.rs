//! Error types for conquest-core

use crate::identity::EntityKind;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An encoded option string could not be decoded.
    #[error("{attachment}: cannot decode '{option}' value '{value}': {reason}")]
    Decode {
        attachment: String,
        option: String,
        value: String,
        reason: String,
    },

    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    #[error("No attachment '{key}' on {target}")]
    AttachmentNotFound { target: String, key: String },

    #[error("Attachment '{key}' on {target} is a {actual}, expected {expected}")]
    WrongAttachmentKind {
        target: String,
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Attachment '{attachment}' has no property '{property}'")]
    UnknownProperty { attachment: String, property: String },

    /// Cross-reference or range check failed after loading.
    #[error("Invalid attachment '{attachment}': {reason}")]
    InvalidAttachment { attachment: String, reason: String },

    #[error("No trigger named '{0}'")]
    TriggerNotFound(String),

    #[error("Trigger '{trigger}' re-enters itself through activation chain {}", .chain.join(" -> "))]
    ActivationCycle { trigger: String, chain: Vec<String> },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Shorthand for a missing named entity.
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

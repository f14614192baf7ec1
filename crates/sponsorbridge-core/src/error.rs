//! Error types for the core library.

use thiserror::Error;

use crate::model::{MessageId, UserId};

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Message cannot be attributed to a counterparty.
    #[error("Malformed message {id}: {reason}")]
    MalformedMessage {
        /// Identifier of the offending message.
        id: MessageId,
        /// What is missing or invalid.
        reason: &'static str,
    },

    /// Neither side of the message is the current user.
    #[error("Message {message_id} does not involve user {user_id}")]
    AmbiguousCounterparty {
        /// Identifier of the offending message.
        message_id: MessageId,
        /// The user the message was resolved against.
        user_id: UserId,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] crate::session::credentials::CredentialError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

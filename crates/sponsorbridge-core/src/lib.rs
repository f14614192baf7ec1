//! # sponsorbridge-core
//!
//! Core logic for the `SponsorBridge` messaging client.
//!
//! This crate provides:
//! - Domain models for users, messages and notifications
//! - **Conversation aggregation** - groups inbox and sent messages into a
//!   per-counterparty conversation list with unread counts
//! - An explicit session context passed to the fetch layer
//! - Session persistence with the bearer token kept in the system keyring

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod conversation;
mod error;
pub mod model;
pub mod session;

pub use conversation::{
    ConversationList, ConversationSummary, build_conversations, select_counterparty_for_message,
};
pub use error::{Error, Result};
pub use model::{
    LoginResponse, Message, MessageId, Notification, NotificationData, NotificationId,
    NotificationList, Role, UserId, UserRef, parse_instant,
};
pub use session::credentials;
pub use session::{CredentialError, CredentialResult, SessionContext, SessionStore};

//! # sponsorbridge-client
//!
//! Async client for the `SponsorBridge` REST backend.
//!
//! ## Features
//!
//! - **Login**: exchanges credentials for a [`SessionContext`](sponsorbridge_core::SessionContext)
//! - **Messaging**: inbox, sent, thread, send
//! - **Conversations**: concurrent inbox/sent fetch feeding the aggregator
//! - **Notifications**: list and mark as read
//!
//! ## Quick Start
//!
//! ```ignore
//! use sponsorbridge_client::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("http://localhost:5000/api")?;
//!     let session = client.login("sam@example.com", "secret").await?;
//!     let client = client.with_session(session);
//!
//!     for conversation in client.load_conversations().await?.conversations {
//!         println!("{} ({} unread)", conversation.counterparty.name, conversation.unread_count);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod auth;
mod client;
mod error;
mod messages;
mod notifications;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{Error, Result};

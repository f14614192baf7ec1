//! Command-line interface definition.

use clap::{Parser, Subcommand};
use sponsorbridge_core::{MessageId, UserId};

/// Inbox and notifications for `SponsorBridge`.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides the saved setting)
    #[arg(long, global = true, env = "SPONSORBRIDGE_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login {
        /// Account email
        email: String,

        /// Account password; read from stdin when omitted
        #[arg(long, env = "SPONSORBRIDGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Save the backend URL for later runs
    Config {
        /// Backend base URL
        url: String,
    },

    /// List conversations, most recent first
    Conversations {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the full thread with one user
    Thread {
        /// Counterparty user id
        user_id: UserId,
    },

    /// Send a message, then show the refreshed conversation list
    Send {
        /// Recipient user id
        user_id: UserId,

        /// Message text
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },

    /// Reply to whoever is on the other side of a message
    Reply {
        /// Message id from inbox or sent
        message_id: MessageId,

        /// Reply text
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },

    /// List notifications
    Notifications,

    /// Mark a notification as read
    ReadNotification {
        /// Notification id
        id: i64,
    },
}

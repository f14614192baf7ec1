//! Message data models.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UserRef, lenient, null_as_default};

/// Naive layouts accepted after RFC 3339 and RFC 2822 fail; read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses a backend timestamp into an instant.
///
/// Accepts RFC 3339, RFC 2822 and a few naive layouts (with or without
/// zero-padding) that are interpreted as UTC. Returns `None` when nothing
/// matches.
#[must_use]
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Unique identifier for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MessageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,
    /// Author of the message. `None` when the backend sent `null` or a
    /// reference without a usable id.
    #[serde(default, deserialize_with = "lenient")]
    pub sender: Option<UserRef>,
    /// Recipient of the message, with the same leniency as `sender`.
    #[serde(default, deserialize_with = "lenient")]
    pub receiver: Option<UserRef>,
    /// Text body.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Whether the recipient has viewed the message; `null` reads as unread.
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
    /// Creation timestamp as sent by the backend.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

impl Message {
    /// Parsed creation instant, if the timestamp is readable.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.created_at)
    }

    /// Short single-line preview of the content.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self.content.lines().next().unwrap_or_default().trim();
        if line.chars().count() <= max_chars {
            return line.to_string();
        }
        let truncated: String = line.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

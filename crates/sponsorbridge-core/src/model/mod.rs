//! Domain models shared by the client and the aggregator.
//!
//! These mirror the JSON shapes served by the backend; field names are
//! camelCase on the wire.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

mod message;
mod notification;
mod user;

pub use message::{Message, MessageId, parse_instant};
pub use notification::{Notification, NotificationData, NotificationId, NotificationList};
pub use user::{LoginResponse, Role, UserId, UserRef};

/// Reads an optional value, treating anything that does not decode as absent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Reads `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

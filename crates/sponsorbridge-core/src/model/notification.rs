//! In-app notification models.

use serde::{Deserialize, Serialize};

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional payload attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// In-app path to open when the notification is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A notification shown in the header dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique identifier.
    pub id: NotificationId,
    /// Human-readable text.
    #[serde(default)]
    pub message: String,
    /// Whether the user has seen it.
    #[serde(default)]
    pub read: bool,
    /// Creation timestamp as sent by the backend.
    #[serde(default)]
    pub created_at: String,
    /// Extra payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
}

impl Notification {
    /// Link to follow, if any.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.link.as_deref())
    }
}

/// Notifications for the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationList(pub Vec<Notification>);

impl NotificationList {
    /// Number of notifications not yet read.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.0.iter().filter(|n| !n.read).count()
    }

    /// Marks a notification as read locally.
    ///
    /// Returns `false` if no notification has that id.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        self.0
            .iter_mut()
            .find(|n| n.id == id)
            .is_some_and(|n| {
                n.read = true;
                true
            })
    }

    /// Iterates over the notifications.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.0.iter()
    }

    /// Returns true if there are no notifications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

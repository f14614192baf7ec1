//! Notification endpoints.

use reqwest::Method;
use sponsorbridge_core::{Notification, NotificationId, NotificationList};

use crate::client::{ApiClient, expect_success};
use crate::error::Result;

/// Reads a notification payload; anything but an array yields an empty list.
fn parse_notifications(value: serde_json::Value) -> Result<NotificationList> {
    if !value.is_array() {
        return Ok(NotificationList::default());
    }
    let items: Vec<Notification> = serde_json::from_value(value)?;
    Ok(NotificationList(items))
}

impl ApiClient {
    /// Notifications for the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn notifications(&self) -> Result<NotificationList> {
        let value: serde_json::Value = self.get_json("notifications").await?;
        parse_notifications(value)
    }

    /// Marks a notification as read on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<()> {
        let response = self
            .authed(Method::PATCH, &format!("notifications/{id}/read"))?
            .send()
            .await?;
        expect_success(response).await
    }
}

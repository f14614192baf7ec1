//! Direct messaging endpoints.

use reqwest::Method;
use serde::Serialize;
use sponsorbridge_core::{
    ConversationList, Message, MessageId, UserId, UserRef, build_conversations,
    select_counterparty_for_message,
};
use tracing::{debug, info, warn};

use crate::client::{ApiClient, expect_success};
use crate::error::{Error, Result};

/// Decodes a message list element by element.
///
/// Elements that do not decode are dropped with a warning; the second value
/// is how many were dropped.
fn decode_messages(values: Vec<serde_json::Value>, list: &str) -> (Vec<Message>, usize) {
    let mut dropped = 0;
    let messages: Vec<Message> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Dropping undecodable {list} message: {e}");
                dropped += 1;
                None
            }
        })
        .collect();
    (messages, dropped)
}

/// Body of `POST /messages`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    receiver_id: UserId,
    content: &'a str,
}

impl ApiClient {
    /// Messages received by the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn inbox(&self) -> Result<Vec<Message>> {
        Ok(self.fetch_messages("messages/inbox", "inbox").await?.0)
    }

    /// Messages sent by the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn sent(&self) -> Result<Vec<Message>> {
        Ok(self.fetch_messages("messages/sent", "sent").await?.0)
    }

    /// Full thread with one counterparty, as ordered by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn conversation(&self, counterparty: UserId) -> Result<Vec<Message>> {
        let path = format!("messages/conversation/{counterparty}");
        Ok(self.fetch_messages(&path, "conversation").await?.0)
    }

    /// Sends a message to `receiver`.
    ///
    /// Blank content is rejected without contacting the backend; anything
    /// else is sent as given.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in, the content is blank, or the
    /// backend rejects the message.
    pub async fn send_message(&self, receiver: UserId, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput("message content is empty".to_string()));
        }

        let response = self
            .authed(Method::POST, "messages")?
            .json(&SendMessageRequest {
                receiver_id: receiver,
                content,
            })
            .send()
            .await?;
        expect_success(response).await?;

        info!("Message sent to user {receiver}");
        Ok(())
    }

    /// Fetches inbox and sent concurrently and groups them into conversations.
    ///
    /// No consistency is assumed between the two snapshots. Elements that
    /// cannot be decoded are counted in [`ConversationList::skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] naming the list that failed, or
    /// [`Error::NotAuthenticated`] without a session.
    pub async fn load_conversations(&self) -> Result<ConversationList> {
        let current_user = self.require_session()?.user_id;
        let (inbox, sent, dropped) = self.fetch_both().await?;
        let mut list = build_conversations(&inbox, &sent, current_user);
        list.skipped += dropped;
        Ok(list)
    }

    /// Replies to the other participant of a message from inbox or sent.
    ///
    /// Returns the user the reply went to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the content is blank or the message
    /// is not in either list, and a core
    /// [`AmbiguousCounterparty`](sponsorbridge_core::Error::AmbiguousCounterparty)
    /// error if the current user is on neither side of it.
    pub async fn reply_to(&self, message_id: MessageId, content: &str) -> Result<UserRef> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput("message content is empty".to_string()));
        }
        let current_user = self.require_session()?.user_id;
        let (inbox, sent, _) = self.fetch_both().await?;

        let message = inbox
            .iter()
            .chain(&sent)
            .find(|m| m.id == message_id)
            .ok_or_else(|| Error::InvalidInput(format!("message {message_id} not found")))?;
        let counterparty = select_counterparty_for_message(message, current_user)?.clone();

        self.send_message(counterparty.id, content).await?;
        Ok(counterparty)
    }

    /// Fetches a message list, dropping elements that do not decode.
    async fn fetch_messages(&self, path: &str, list: &str) -> Result<(Vec<Message>, usize)> {
        let values: Vec<serde_json::Value> = self.get_json(path).await?;
        Ok(decode_messages(values, list))
    }

    /// Fetches inbox and sent concurrently, tagging failures with the list name.
    ///
    /// The third value is the number of undecodable elements across both.
    async fn fetch_both(&self) -> Result<(Vec<Message>, Vec<Message>, usize)> {
        let ((inbox, inbox_dropped), (sent, sent_dropped)) = tokio::try_join!(
            async {
                self.fetch_messages("messages/inbox", "inbox")
                    .await
                    .map_err(|e| Error::fetch("inbox", e))
            },
            async {
                self.fetch_messages("messages/sent", "sent")
                    .await
                    .map_err(|e| Error::fetch("sent", e))
            },
        )?;
        debug!("Fetched {} inbox and {} sent messages", inbox.len(), sent.len());
        Ok((inbox, sent, inbox_dropped + sent_dropped))
    }

    /// Sends a message, then reloads the conversation list.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reloading fails.
    pub async fn send_and_refresh(&self, receiver: UserId, content: &str) -> Result<ConversationList> {
        self.send_message(receiver, content).await?;
        self.load_conversations().await
    }
}

//! Conversation aggregation.
//!
//! Turns the flat inbox and sent lists into one summary per counterparty,
//! ordered by most recent activity. Pure functions: nothing here performs
//! I/O or keeps state between calls.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Message, MessageId, UserId, UserRef};

/// Which list a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Received,
    Sent,
}

/// All messages exchanged with one counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// The user on the other side of the conversation.
    pub counterparty: UserRef,
    /// Messages in both directions, deduplicated by id, in input order.
    pub messages: Vec<Message>,
    /// Most recent message.
    pub last_message: Message,
    /// Parsed creation instant of `last_message`.
    pub last_activity: DateTime<Utc>,
    /// Received messages not yet read.
    pub unread_count: usize,
}

impl ConversationSummary {
    /// Returns the number of messages in the conversation.
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if any received message is unread.
    #[must_use]
    pub const fn has_unread(&self) -> bool {
        self.unread_count > 0
    }
}

/// Result of [`build_conversations`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationList {
    /// Conversations, most recently active first.
    pub conversations: Vec<ConversationSummary>,
    /// Messages left out because they were malformed.
    pub skipped: usize,
    /// Messages left out because the current user was not on the expected side.
    pub ambiguous: usize,
}

impl ConversationList {
    /// Total unread messages across all conversations.
    #[must_use]
    pub fn total_unread(&self) -> usize {
        self.conversations.iter().map(|c| c.unread_count).sum()
    }

    /// Finds the conversation with a counterparty.
    #[must_use]
    pub fn find(&self, counterparty: UserId) -> Option<&ConversationSummary> {
        self.conversations
            .iter()
            .find(|c| c.counterparty.id == counterparty)
    }

    /// Returns the number of conversations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns true if there are no conversations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

/// Messages collected for one counterparty before the derived fields exist.
#[derive(Debug)]
struct Accumulator {
    user: UserRef,
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    message: Message,
    at: DateTime<Utc>,
    unread: bool,
}

impl Accumulator {
    fn into_summary(self) -> Option<ConversationSummary> {
        let unread_count = self.entries.iter().filter(|e| e.unread).count();

        // First occurrence wins among equal instants.
        let latest = self
            .entries
            .iter()
            .reduce(|best, e| if e.at > best.at { e } else { best })?;
        let last_message = latest.message.clone();
        let last_activity = latest.at;

        Some(ConversationSummary {
            counterparty: self.user,
            messages: self.entries.into_iter().map(|e| e.message).collect(),
            last_message,
            last_activity,
            unread_count,
        })
    }
}

/// Resolves the counterparty and instant of a message from the list it came from.
///
/// An inbox message must be addressed to `current_user` and a sent message
/// must come from them.
fn attribute(
    message: &Message,
    direction: Direction,
    current_user: UserId,
) -> Result<(&UserRef, DateTime<Utc>)> {
    let malformed = |reason| Error::MalformedMessage {
        id: message.id,
        reason,
    };

    let sender = message
        .sender
        .as_ref()
        .ok_or_else(|| malformed("missing sender"))?;
    let receiver = message
        .receiver
        .as_ref()
        .ok_or_else(|| malformed("missing receiver"))?;
    let at = message
        .created_at()
        .ok_or_else(|| malformed("unreadable createdAt"))?;

    let (me, counterparty) = match direction {
        Direction::Received => (receiver, sender),
        Direction::Sent => (sender, receiver),
    };
    if me.id != current_user {
        return Err(Error::AmbiguousCounterparty {
            message_id: message.id,
            user_id: current_user,
        });
    }
    Ok((counterparty, at))
}

/// Groups inbox and sent messages into per-counterparty conversations.
///
/// Inbox messages are attributed to their sender and sent messages to their
/// receiver. Unread counts only include inbox messages whose `read` flag is
/// false. A message id seen twice is kept once (first usable occurrence,
/// inbox before sent). Messages with a missing participant or an unreadable
/// timestamp are counted in [`ConversationList::skipped`]; messages where
/// `current_user` is not the receiver (inbox) or sender (sent) are counted
/// in [`ConversationList::ambiguous`]. Neither kind is assigned to a
/// conversation.
///
/// The result is ordered by last activity, newest first, with ties broken
/// by counterparty id ascending.
#[must_use]
pub fn build_conversations(
    inbox: &[Message],
    sent: &[Message],
    current_user: UserId,
) -> ConversationList {
    let mut groups: HashMap<UserId, Accumulator> = HashMap::new();
    let mut seen: HashSet<MessageId> = HashSet::new();
    let mut skipped = 0;
    let mut ambiguous = 0;

    let tagged = inbox
        .iter()
        .map(|m| (m, Direction::Received))
        .chain(sent.iter().map(|m| (m, Direction::Sent)));

    for (message, direction) in tagged {
        if seen.contains(&message.id) {
            debug!("Dropping duplicate message {}", message.id);
            continue;
        }

        let (counterparty, at) = match attribute(message, direction, current_user) {
            Ok(resolved) => resolved,
            Err(e @ Error::AmbiguousCounterparty { .. }) => {
                warn!("Skipping message: {e}");
                ambiguous += 1;
                continue;
            }
            Err(e) => {
                warn!("Skipping message: {e}");
                skipped += 1;
                continue;
            }
        };
        seen.insert(message.id);

        let unread = direction == Direction::Received && !message.read;

        groups
            .entry(counterparty.id)
            .or_insert_with(|| Accumulator {
                user: counterparty.clone(),
                entries: Vec::new(),
            })
            .entries
            .push(Entry {
                message: message.clone(),
                at,
                unread,
            });
    }

    let mut conversations: Vec<ConversationSummary> = groups
        .into_values()
        .filter_map(Accumulator::into_summary)
        .collect();

    conversations.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.counterparty.id.cmp(&b.counterparty.id))
    });

    debug!(
        "Built {} conversations ({} skipped, {} ambiguous)",
        conversations.len(),
        skipped,
        ambiguous
    );

    ConversationList {
        conversations,
        skipped,
        ambiguous,
    }
}

/// Returns the participant of `message` who is not `current_user`.
///
/// Used when a single message row is selected instead of a conversation.
///
/// # Errors
///
/// Returns [`Error::MalformedMessage`] if either participant is missing and
/// [`Error::AmbiguousCounterparty`] if neither participant is `current_user`.
pub fn select_counterparty_for_message(message: &Message, current_user: UserId) -> Result<&UserRef> {
    let (Some(sender), Some(receiver)) = (&message.sender, &message.receiver) else {
        return Err(Error::MalformedMessage {
            id: message.id,
            reason: "missing sender or receiver",
        });
    };

    if sender.id == current_user {
        Ok(receiver)
    } else if receiver.id == current_user {
        Ok(sender)
    } else {
        Err(Error::AmbiguousCounterparty {
            message_id: message.id,
            user_id: current_user,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    const ME: UserId = UserId(9);

    fn user(id: i64) -> UserRef {
        UserRef::new(UserId(id), format!("User {id}"))
    }

    fn message(id: i64, from: i64, to: i64, read: bool, created_at: &str) -> Message {
        Message {
            id: MessageId(id),
            sender: Some(user(from)),
            receiver: Some(user(to)),
            content: format!("message {id}"),
            read,
            created_at: created_at.to_string(),
        }
    }

    fn minute(offset: i64) -> String {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (base + Duration::minutes(offset)).to_rfc3339()
    }

    #[test]
    fn test_single_unread_inbox_message() {
        let inbox = vec![message(1, 2, 9, false, "2024-01-01T00:00:00Z")];
        let list = build_conversations(&inbox, &[], ME);

        assert_eq!(list.len(), 1);
        let conversation = &list.conversations[0];
        assert_eq!(conversation.counterparty.id, UserId(2));
        assert_eq!(conversation.unread_count, 1);
        assert_eq!(conversation.last_message.id, MessageId(1));
        assert_eq!(list.skipped, 0);
    }

    #[test]
    fn test_read_inbox_message_is_not_unread() {
        let inbox = vec![message(1, 2, 9, true, "2024-01-01T00:00:00Z")];
        let list = build_conversations(&inbox, &[], ME);

        assert_eq!(list.conversations[0].unread_count, 0);
        assert!(!list.conversations[0].has_unread());
    }

    #[test]
    fn test_sent_only_conversation() {
        let sent = vec![message(2, 9, 3, false, "2024-01-02T00:00:00Z")];
        let list = build_conversations(&[], &sent, ME);

        assert_eq!(list.len(), 1);
        assert_eq!(list.conversations[0].counterparty.id, UserId(3));
        assert_eq!(list.conversations[0].counterparty.name, "User 3");
        assert_eq!(list.conversations[0].unread_count, 0);
    }

    #[test]
    fn test_orders_by_latest_activity() {
        let inbox = vec![
            message(1, 2, 9, true, "2024-01-01T00:00:00Z"),
            message(2, 3, 9, true, "2024-01-03T00:00:00Z"),
        ];
        let list = build_conversations(&inbox, &[], ME);

        let order: Vec<UserId> = list.conversations.iter().map(|c| c.counterparty.id).collect();
        assert_eq!(order, vec![UserId(3), UserId(2)]);
    }

    #[test]
    fn test_null_sender_is_skipped() {
        let mut orphan = message(1, 2, 9, false, "2024-01-05T00:00:00Z");
        orphan.sender = None;
        let inbox = vec![orphan, message(2, 4, 9, false, "2024-01-01T00:00:00Z")];

        let list = build_conversations(&inbox, &[], ME);

        assert_eq!(list.len(), 1);
        assert_eq!(list.conversations[0].counterparty.id, UserId(4));
        assert_eq!(list.conversations[0].unread_count, 1);
        assert_eq!(list.skipped, 1);
    }

    #[test]
    fn test_unreadable_timestamp_is_skipped() {
        let inbox = vec![message(1, 2, 9, false, "not a date")];
        let list = build_conversations(&inbox, &[], ME);

        assert!(list.is_empty());
        assert_eq!(list.skipped, 1);
    }

    #[test]
    fn test_ambiguous_counterparty() {
        let stray = message(1, 2, 3, false, "2024-01-01T00:00:00Z");
        let err = select_counterparty_for_message(&stray, ME).unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousCounterparty {
                message_id: MessageId(1),
                user_id: ME
            }
        ));
    }

    #[test]
    fn test_select_counterparty_either_direction() {
        let received = message(1, 2, 9, false, "2024-01-01T00:00:00Z");
        let sent = message(2, 9, 3, false, "2024-01-01T00:00:00Z");

        assert_eq!(select_counterparty_for_message(&received, ME).unwrap().id, UserId(2));
        assert_eq!(select_counterparty_for_message(&sent, ME).unwrap().id, UserId(3));
    }

    #[test]
    fn test_select_counterparty_missing_side() {
        let mut broken = message(1, 2, 9, false, "2024-01-01T00:00:00Z");
        broken.receiver = None;
        assert!(matches!(
            select_counterparty_for_message(&broken, ME),
            Err(Error::MalformedMessage { .. })
        ));
    }

    #[test]
    fn test_both_directions_group_together() {
        let inbox = vec![message(1, 2, 9, false, "2024-01-01T00:00:00Z")];
        let sent = vec![message(2, 9, 2, false, "2024-01-02T00:00:00Z")];

        let list = build_conversations(&inbox, &sent, ME);

        assert_eq!(list.len(), 1);
        let conversation = &list.conversations[0];
        assert_eq!(conversation.message_count(), 2);
        assert_eq!(conversation.unread_count, 1);
        assert_eq!(conversation.last_message.id, MessageId(2));
    }

    #[test]
    fn test_duplicate_across_lists_counted_once() {
        let duplicated = message(1, 2, 9, false, "2024-01-01T00:00:00Z");
        let list = build_conversations(&[duplicated.clone()], &[duplicated], ME);

        assert_eq!(list.len(), 1);
        assert_eq!(list.conversations[0].message_count(), 1);
        assert_eq!(list.conversations[0].unread_count, 1);
    }

    #[test]
    fn test_duplicate_within_inbox_counted_once() {
        let duplicated = message(1, 2, 9, false, "2024-01-01T00:00:00Z");
        let list = build_conversations(&[duplicated.clone(), duplicated], &[], ME);

        assert_eq!(list.conversations[0].message_count(), 1);
        assert_eq!(list.conversations[0].unread_count, 1);
    }

    #[test]
    fn test_tie_broken_by_counterparty_id() {
        let inbox = vec![
            message(1, 7, 9, true, "2024-01-01T00:00:00Z"),
            message(2, 4, 9, true, "2024-01-01T00:00:00Z"),
            message(3, 5, 9, true, "2024-01-01T00:00:00Z"),
        ];
        let list = build_conversations(&inbox, &[], ME);

        let order: Vec<i64> = list.conversations.iter().map(|c| c.counterparty.id.0).collect();
        assert_eq!(order, vec![4, 5, 7]);
    }

    #[test]
    fn test_chronological_not_lexical_ordering() {
        let inbox = vec![
            message(1, 2, 9, true, "2024-1-9T00:00:00Z"),
            message(2, 3, 9, true, "2024-1-10T00:00:00Z"),
        ];
        let list = build_conversations(&inbox, &[], ME);

        assert_eq!(list.conversations[0].counterparty.id, UserId(3));
    }

    #[test]
    fn test_equal_instants_keep_first_as_last_message() {
        let inbox = vec![
            message(1, 2, 9, true, "2024-01-01T00:00:00Z"),
            message(2, 2, 9, true, "2024-01-01T00:00:00Z"),
        ];
        let list = build_conversations(&inbox, &[], ME);

        assert_eq!(list.conversations[0].last_message.id, MessageId(1));
    }

    #[test]
    fn test_message_between_other_users_is_excluded() {
        let inbox = vec![
            message(1, 2, 3, false, "2024-01-02T00:00:00Z"),
            message(2, 4, 9, false, "2024-01-01T00:00:00Z"),
        ];
        let list = build_conversations(&inbox, &[], ME);

        assert_eq!(list.len(), 1);
        assert_eq!(list.conversations[0].counterparty.id, UserId(4));
        assert!(list.find(UserId(2)).is_none());
        assert!(list.find(UserId(3)).is_none());
        assert_eq!(list.total_unread(), 1);
        assert_eq!(list.ambiguous, 1);
        assert_eq!(list.skipped, 0);
    }

    #[test]
    fn test_sent_message_not_from_me_is_excluded() {
        let sent = vec![message(1, 5, 3, false, "2024-01-01T00:00:00Z")];
        let list = build_conversations(&[], &sent, ME);

        assert!(list.is_empty());
        assert_eq!(list.ambiguous, 1);
    }

    #[test]
    fn test_excluded_copy_does_not_hide_usable_one() {
        let misfiled = message(1, 9, 5, false, "2024-01-01T00:00:00Z");
        let list = build_conversations(&[misfiled.clone()], &[misfiled], ME);

        assert_eq!(list.len(), 1);
        assert_eq!(list.conversations[0].counterparty.id, UserId(5));
        assert_eq!(list.conversations[0].unread_count, 0);
        assert_eq!(list.ambiguous, 1);
    }

    #[test]
    fn test_empty_inputs() {
        let list = build_conversations(&[], &[], ME);
        assert!(list.is_empty());
        assert_eq!(list.total_unread(), 0);
    }

    #[test]
    fn test_total_unread_and_find() {
        let inbox = vec![
            message(1, 2, 9, false, "2024-01-01T00:00:00Z"),
            message(2, 2, 9, false, "2024-01-02T00:00:00Z"),
            message(3, 3, 9, false, "2024-01-03T00:00:00Z"),
        ];
        let list = build_conversations(&inbox, &[], ME);

        assert_eq!(list.total_unread(), 3);
        assert_eq!(list.find(UserId(2)).unwrap().unread_count, 2);
        assert!(list.find(UserId(42)).is_none());
    }

    /// Inbox messages from counterparties 1..6 and sent messages to them,
    /// with unique ids.
    fn mailbox() -> impl Strategy<Value = (Vec<Message>, Vec<Message>)> {
        (
            prop::collection::vec((1i64..6, any::<bool>(), 0i64..10_000), 0..20),
            prop::collection::vec((1i64..6, 0i64..10_000), 0..20),
        )
            .prop_map(|(received, sent)| {
                let inbox: Vec<Message> = (0_i64..)
                    .zip(received)
                    .map(|(id, (from, read, at))| message(id, from, ME.0, read, &minute(at)))
                    .collect();
                let sent = (1000_i64..)
                    .zip(sent)
                    .map(|(id, (to, at))| message(id, ME.0, to, false, &minute(at)))
                    .collect();
                (inbox, sent)
            })
    }

    proptest! {
        #[test]
        fn prop_one_summary_per_counterparty((inbox, sent) in mailbox()) {
            let list = build_conversations(&inbox, &sent, ME);

            let mut expected: HashSet<UserId> = HashSet::new();
            expected.extend(inbox.iter().filter_map(|m| m.sender.as_ref().map(|u| u.id)));
            expected.extend(sent.iter().filter_map(|m| m.receiver.as_ref().map(|u| u.id)));

            prop_assert_eq!(list.len(), expected.len());
        }

        #[test]
        fn prop_unread_counts_only_inbox((inbox, sent) in mailbox()) {
            let list = build_conversations(&inbox, &sent, ME);

            for conversation in &list.conversations {
                let expected = inbox
                    .iter()
                    .filter(|m| !m.read)
                    .filter(|m| m.sender.as_ref().is_some_and(|u| u.id == conversation.counterparty.id))
                    .count();
                prop_assert_eq!(conversation.unread_count, expected);
            }
        }

        #[test]
        fn prop_sorted_newest_first((inbox, sent) in mailbox()) {
            let list = build_conversations(&inbox, &sent, ME);

            for pair in list.conversations.windows(2) {
                prop_assert!(pair[0].last_activity >= pair[1].last_activity);
                prop_assert!(pair[0].last_message.created_at() >= pair[1].last_message.created_at());
            }
        }

        #[test]
        fn prop_idempotent((inbox, sent) in mailbox()) {
            prop_assert_eq!(
                build_conversations(&inbox, &sent, ME),
                build_conversations(&inbox, &sent, ME)
            );
        }

        #[test]
        fn prop_overlapping_lists_do_not_double_count((inbox, sent) in mailbox()) {
            let mut overlapping = sent.clone();
            overlapping.extend(inbox.iter().cloned());

            let clean = build_conversations(&inbox, &sent, ME);
            let noisy = build_conversations(&inbox, &overlapping, ME);

            let total: usize = noisy.conversations.iter().map(ConversationSummary::message_count).sum();
            prop_assert_eq!(total, inbox.len() + sent.len());
            prop_assert_eq!(clean, noisy);
        }
    }
}

//! Plain-text rendering of conversations, threads and notifications.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use sponsorbridge_core::{ConversationList, Message, NotificationList, UserId};

/// Width of the message preview column.
const PREVIEW_CHARS: usize = 48;

/// Formats an instant in the local timezone.
fn format_local(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%a, %d %b %Y %H:%M").to_string()
}

/// Formats a raw backend timestamp, keeping it verbatim if unparseable.
fn format_timestamp(message: &Message) -> String {
    message
        .created_at()
        .map_or_else(|| message.created_at.clone(), format_local)
}

/// Renders the conversation sidebar.
pub fn render_conversations(list: &ConversationList) -> String {
    if list.is_empty() {
        return "No conversations yet.\n".to_string();
    }

    let mut out = String::new();
    for conversation in &list.conversations {
        let marker = if conversation.has_unread() { '●' } else { ' ' };
        let unread = if conversation.has_unread() {
            format!("{} unread", conversation.unread_count)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{marker} {:<24} #{:<6} {:<10} {:<22} {}",
            conversation.counterparty.display_name(),
            conversation.counterparty.id,
            unread,
            format_local(conversation.last_activity),
            conversation.last_message.preview(PREVIEW_CHARS),
        );
    }

    let _ = writeln!(
        out,
        "\n{} conversations, {} unread",
        list.len(),
        list.total_unread()
    );
    if list.skipped > 0 {
        let _ = writeln!(out, "{} malformed messages ignored", list.skipped);
    }
    if list.ambiguous > 0 {
        let _ = writeln!(out, "{} messages not involving you ignored", list.ambiguous);
    }
    out
}

/// Renders a thread with one counterparty.
pub fn render_thread(messages: &[Message], current_user: UserId) -> String {
    if messages.is_empty() {
        return "No messages in this conversation.\n".to_string();
    }

    let mut out = String::new();
    for message in messages {
        let author = match &message.sender {
            Some(sender) if sender.id == current_user => "You".to_string(),
            Some(sender) => sender.display_name(),
            None => "Unknown".to_string(),
        };
        let _ = writeln!(
            out,
            "[{}] {author}: {}",
            format_timestamp(message),
            message.content
        );
    }
    out
}

/// Renders the notification dropdown.
pub fn render_notifications(list: &NotificationList) -> String {
    if list.is_empty() {
        return "No notifications.\n".to_string();
    }

    let mut out = String::new();
    for notification in list.iter() {
        let marker = if notification.read { ' ' } else { '●' };
        let _ = write!(out, "{marker} #{:<6} {}", notification.id, notification.message);
        if let Some(link) = notification.link() {
            let _ = write!(out, " ({link})");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "\n{} unread", list.unread_count());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sponsorbridge_core::{
        MessageId, Notification, NotificationData, NotificationId, UserRef, build_conversations,
    };

    const ME: UserId = UserId(9);

    fn message(id: i64, from: UserRef, to: UserRef, read: bool, created_at: &str) -> Message {
        Message {
            id: MessageId(id),
            sender: Some(from),
            receiver: Some(to),
            content: format!("message {id}"),
            read,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_render_conversations() {
        let me = UserRef::new(ME, "Me");
        let ada = UserRef::new(UserId(2), "Ada");
        let inbox = vec![message(1, ada, me, false, "2024-01-01T00:00:00Z")];
        let list = build_conversations(&inbox, &[], ME);

        let out = render_conversations(&list);
        assert!(out.contains("Ada"));
        assert!(out.contains("1 unread"));
        assert!(out.contains("message 1"));
        assert!(out.contains("1 conversations, 1 unread"));
    }

    #[test]
    fn test_render_reports_excluded_messages() {
        let me = UserRef::new(ME, "Me");
        let ada = UserRef::new(UserId(2), "Ada");
        let bo = UserRef::new(UserId(3), "Bo");
        let inbox = vec![
            message(1, ada.clone(), me, false, "2024-01-01T00:00:00Z"),
            message(2, ada, bo, false, "2024-01-02T00:00:00Z"),
        ];
        let list = build_conversations(&inbox, &[], ME);

        let out = render_conversations(&list);
        assert!(out.contains("1 messages not involving you ignored"));
        assert!(!out.contains("Bo"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(
            render_conversations(&ConversationList::default()),
            "No conversations yet.\n"
        );
        assert_eq!(render_thread(&[], ME), "No messages in this conversation.\n");
    }

    #[test]
    fn test_render_thread_marks_own_messages() {
        let me = UserRef::new(ME, "Me");
        let ada = UserRef::new(UserId(2), "Ada");
        let thread = vec![
            message(1, ada.clone(), me.clone(), true, "2024-01-01T00:00:00Z"),
            message(2, me, ada, false, "garbled"),
        ];

        let out = render_thread(&thread, ME);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].ends_with("Ada: message 1"));
        assert_eq!(lines[1], "[garbled] You: message 2");
    }

    #[test]
    fn test_render_notifications() {
        let list = NotificationList(vec![Notification {
            id: NotificationId(5),
            message: "New sponsorship".into(),
            read: false,
            created_at: String::new(),
            data: Some(NotificationData {
                link: Some("/sponsorships/5".into()),
            }),
        }]);

        let out = render_notifications(&list);
        assert!(out.contains("New sponsorship (/sponsorships/5)"));
        assert!(out.contains("1 unread"));
    }
}

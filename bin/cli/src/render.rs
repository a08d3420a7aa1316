//! Plain-text rendering of conversations.

use chrono::Local;
use colloquy_conversation::{Conversation, MessageRole, Snapshot};
use colloquy_core::ConversationId;
use std::fmt::Write;

/// Renders one conversation as a transcript.
#[must_use]
pub fn conversation(conversation: &Conversation, loading: bool) -> String {
    let mut out = format!("── {} ──\n", conversation.title);
    if conversation.messages.is_empty() && !loading {
        out.push_str("(no messages yet)\n");
    }
    for message in &conversation.messages {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "assistant",
        };
        let at = message.created_at.with_timezone(&Local).format("%H:%M");
        let _ = writeln!(out, "[{at}] {who}: {}", message.content);
    }
    if loading {
        out.push_str("assistant is typing…\n");
    }
    out
}

/// Renders the conversation list, most recently updated first.
///
/// Positions in this list are what `/select 2` and friends refer to.
#[must_use]
pub fn list(snapshot: &Snapshot, is_loading: impl Fn(&ConversationId) -> bool) -> String {
    let ordered = snapshot.by_recent_activity();
    if ordered.is_empty() {
        return "No conversations yet. Type a message or /new to start one.\n".to_string();
    }

    let mut out = String::new();
    for (index, conversation) in ordered.iter().enumerate() {
        let marker = if snapshot.active_id.as_ref() == Some(&conversation.id) {
            '*'
        } else {
            ' '
        };
        let busy = if is_loading(&conversation.id) { " …" } else { "" };
        let _ = writeln!(
            out,
            "{marker} {}. {} ({} messages, {}){busy}  [{}]",
            index + 1,
            conversation.title,
            conversation.message_count(),
            conversation.updated_at.with_timezone(&Local).format("%b %d %H:%M"),
            conversation.id,
        );
    }
    out
}

/// Renders the numbered starter prompts.
#[must_use]
pub fn examples(prompts: &[&str]) -> String {
    let mut out = String::from("Try one of these with /try <n>:\n");
    for (index, prompt) in prompts.iter().enumerate() {
        let _ = writeln!(out, "  {}. {prompt}", index + 1);
    }
    out
}

/// Resolves a list position (1-based, as shown by [`list`]) or an ID.
#[must_use]
pub fn resolve_target(snapshot: &Snapshot, target: &str) -> Option<ConversationId> {
    if let Ok(position) = target.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| snapshot.by_recent_activity().get(index).map(|c| c.id.clone()));
    }
    let id: ConversationId = target.parse().ok()?;
    snapshot.contains(&id).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use colloquy_conversation::Message;

    fn snapshot() -> Snapshot {
        let older = Conversation::new("Older").with_message(Message::user("hi"));
        let mut newer = Conversation::new("Newer");
        newer.updated_at = older.updated_at + TimeDelta::minutes(5);
        let active = newer.id.clone();
        Snapshot::new(vec![older, newer], Some(active))
    }

    #[test]
    fn list_orders_by_recent_activity_and_marks_active() {
        let rendered = list(&snapshot(), |_| false);
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("* 1. Newer"));
        assert!(lines[1].starts_with("  2. Older (1 messages"));
    }

    #[test]
    fn list_marks_loading_conversations() {
        let snapshot = snapshot();
        let busy = snapshot.conversations[0].id.clone();
        let rendered = list(&snapshot, |id| id == &busy);

        assert!(rendered.lines().nth(1).unwrap().contains('…'));
        assert!(!rendered.lines().next().unwrap().contains('…'));
    }

    #[test]
    fn empty_list_has_hint() {
        assert!(list(&Snapshot::default(), |_| false).contains("/new"));
    }

    #[test]
    fn conversation_shows_roles_and_typing() {
        let conversation = Conversation::new("Chat")
            .with_message(Message::user("Question?"))
            .with_message(Message::assistant("Answer."));

        let rendered = super::conversation(&conversation, true);

        assert!(rendered.starts_with("── Chat ──"));
        assert!(rendered.contains("you: Question?"));
        assert!(rendered.contains("assistant: Answer."));
        assert!(rendered.ends_with("assistant is typing…\n"));
    }

    #[test]
    fn resolve_by_position_and_id() {
        let snapshot = snapshot();
        let newer = snapshot.conversations[1].id.clone();
        let older = snapshot.conversations[0].id.clone();

        assert_eq!(resolve_target(&snapshot, "1"), Some(newer));
        assert_eq!(resolve_target(&snapshot, older.as_str()), Some(older));
        assert_eq!(resolve_target(&snapshot, "0"), None);
        assert_eq!(resolve_target(&snapshot, "7"), None);
        assert_eq!(resolve_target(&snapshot, "conv_missing"), None);
    }

    #[test]
    fn examples_are_numbered() {
        let rendered = examples(&["a", "b"]);
        assert!(rendered.contains("  1. a"));
        assert!(rendered.contains("  2. b"));
    }
}

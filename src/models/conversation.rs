use uuid::Uuid;

use super::message::Message;

/// How many user/assistant exchanges are sent back to the model as context.
pub const MAX_HISTORY_PAIRS: usize = 6;

/// The in-memory message log for one chat. Turns are appended in arrival
/// order and never mutated afterwards; nothing is persisted across runs.
///
/// Only user and assistant turns live here. The intermediate tool-call
/// traffic of a single turn stays in that turn's request window.
pub struct Conversation {
    id: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    /// Build the message window for one model request: a system message
    /// followed by the most recent exchanges, oldest first.
    pub fn window(&self, system_prompt: &str, max_pairs: usize) -> Vec<Message> {
        let mut window = Vec::with_capacity(self.messages.len() + 1);
        window.push(Message::system(system_prompt));

        let keep = max_pairs * 2;
        let start = self.messages.len().saturating_sub(keep);
        window.extend(self.messages[start..].iter().cloned());
        window
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_keep_arrival_order() {
        let mut conv = Conversation::new();
        conv.push_user("first question");
        conv.push_assistant("first answer");
        conv.push_user("second question");

        let roles: Vec<&str> = conv.messages().iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["user", "assistant", "user"]);
        assert_eq!(conv.messages()[2].text(), "second question");
    }

    #[test]
    fn window_starts_with_system_and_trims_old_pairs() {
        let mut conv = Conversation::new();
        for i in 0..10 {
            conv.push_user(format!("q{}", i));
            conv.push_assistant(format!("a{}", i));
        }

        let window = conv.window("be helpful", 2);
        assert_eq!(window[0].role, "system");
        assert_eq!(window[0].text(), "be helpful");
        // 2 pairs = 4 messages after the system prompt
        assert_eq!(window.len(), 5);
        assert_eq!(window[1].text(), "q8");
        assert_eq!(window[4].text(), "a9");
    }

    #[test]
    fn window_shorter_than_limit_is_untouched() {
        let mut conv = Conversation::new();
        conv.push_user("only question");

        let window = conv.window("sys", MAX_HISTORY_PAIRS);
        assert_eq!(window.len(), 2);
        assert_eq!(window[1].role, "user");
    }
}

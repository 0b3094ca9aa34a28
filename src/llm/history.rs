//! Bounded conversation history.
//!
//! The history always starts with the system message. Everything after it is
//! user/assistant exchange pairs, and trimming drops the oldest of those first.

use crate::llm::models::LlmMessage;

/// Role-tagged message log with a sliding retention window.
///
/// # Examples
///
/// ```
/// use ticket_talk::llm::history::ConversationHistory;
///
/// let mut history = ConversationHistory::new("You answer ticket questions.");
/// history.push_user("What is open in OPS?");
/// history.push_assistant("OPS-1 and OPS-2.");
/// history.trim(0);
///
/// assert_eq!(history.len(), 1);
/// assert_eq!(history.system_prompt(), "You answer ticket questions.");
/// ```
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<LlmMessage>,
}

impl ConversationHistory {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![LlmMessage::system(system_prompt)],
        }
    }

    /// Full history including the system message, oldest first.
    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: the system message is always present.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        self.messages[0].content_str()
    }

    /// Number of exchanges currently retained.
    pub fn pair_count(&self) -> usize {
        (self.messages.len() - 1) / 2
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(LlmMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(LlmMessage::assistant(content));
    }

    /// Drop the oldest messages after the system message until at most
    /// `history_length` exchanges remain.
    ///
    /// Returns the number of messages removed.
    pub fn trim(&mut self, history_length: usize) -> usize {
        let limit = history_length.saturating_mul(2).saturating_add(1);
        let excess = self.messages.len().saturating_sub(limit);
        if excess > 0 {
            self.messages.drain(1..1 + excess);
        }
        excess
    }

    /// Remove everything but the system message.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::MessageRole;

    const PROMPT: &str = "You are a ticket assistant.";

    fn with_exchanges(n: usize) -> ConversationHistory {
        let mut history = ConversationHistory::new(PROMPT);
        for i in 1..=n {
            history.push_user(format!("question {}", i));
            history.push_assistant(format!("answer {}", i));
        }
        history
    }

    #[test]
    fn test_new_holds_only_system_message() {
        let history = ConversationHistory::new(PROMPT);

        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
        assert_eq!(history.messages()[0].role, MessageRole::System);
        assert_eq!(history.system_prompt(), PROMPT);
        assert_eq!(history.pair_count(), 0);
    }

    #[test]
    fn test_trim_keeps_min_of_exchanges_and_limit() {
        for n in 0..6 {
            for h in 0..6 {
                let mut history = with_exchanges(n);
                history.trim(h);

                assert_eq!(history.len(), n.min(h) * 2 + 1, "n={} h={}", n, h);
                assert_eq!(history.messages()[0].role, MessageRole::System);
                assert_eq!(history.system_prompt(), PROMPT);
            }
        }
    }

    #[test]
    fn test_trim_evicts_oldest_exchange_first() {
        let mut history = with_exchanges(3);
        let removed = history.trim(2);

        assert_eq!(removed, 2);
        assert_eq!(history.len(), 5);
        let contents: Vec<_> = history.messages().iter().map(|m| m.content_str()).collect();
        assert_eq!(
            contents,
            vec![PROMPT, "question 2", "answer 2", "question 3", "answer 3"]
        );
    }

    #[test]
    fn test_trim_with_odd_count_removes_exact_excess() {
        let mut history = with_exchanges(2);
        history.push_user("dangling");

        history.trim(1);

        assert_eq!(history.len(), 3);
        assert_eq!(history.messages()[1].content_str(), "answer 2");
        assert_eq!(history.messages()[2].content_str(), "dangling");
    }

    #[test]
    fn test_shrinking_limit_reflows_immediately() {
        let mut history = with_exchanges(4);
        history.trim(10);
        assert_eq!(history.pair_count(), 4);

        history.trim(1);

        assert_eq!(history.pair_count(), 1);
        assert_eq!(history.messages()[1].content_str(), "question 4");
    }

    #[test]
    fn test_trim_within_limit_is_noop() {
        let mut history = with_exchanges(2);
        assert_eq!(history.trim(2), 0);
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut history = with_exchanges(3);

        history.clear();
        let once: Vec<_> = history.messages().to_vec();
        history.clear();

        assert_eq!(history.len(), 1);
        assert_eq!(history.messages(), once.as_slice());
        assert_eq!(history.system_prompt(), PROMPT);
    }
}

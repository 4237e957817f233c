//! Role-tagged prompt assembly.
//!
//! The prompt carries `context`, `history`, and `question` as named fields
//! and flattens them into a message sequence in one fixed order: context
//! first (as a system message), then prior turns chronologically, then the
//! current question last. No stage ever recovers these parts by position
//! in a message array.

use serde::{Deserialize, Serialize};

use crate::generation::ChatMessage;
use crate::turn::{ConversationTurn, Role};

/// Header prefixed to the retrieved context in the system message.
pub const CONTEXT_HEADER: &str = "Context from the collection:";

/// System message used when retrieval found nothing to ground on.
pub const NO_CONTEXT_MARKER: &str =
    "No context is available for this question. Answer from general knowledge \
     and say so when you are unsure.";

/// A question with its grounding context and conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPrompt {
    /// Retrieved passages joined with blank-line boundaries, or `None`
    /// when the collection produced nothing.
    pub context: Option<String>,
    /// Prior turns in chronological order.
    pub history: Vec<ConversationTurn>,
    /// The current user question.
    pub question: String,
}

impl ChatPrompt {
    /// Flatten into the message sequence presented to the model:
    /// `[system(context), ...history chronological, user(question)]`.
    ///
    /// Context precedes history so older turns do not overshadow freshly
    /// retrieved facts; the question comes last so it is the most recent
    /// thing the model attends to.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        let system = match self.context {
            Some(context) if !context.trim().is_empty() => {
                ChatMessage::system(format!("{CONTEXT_HEADER}\n\n{context}"))
            }
            _ => ChatMessage::system(NO_CONTEXT_MARKER),
        };

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(system);
        for turn in self.history {
            messages.push(match turn.role {
                Role::User => ChatMessage::user(turn.content),
                Role::Assistant => ChatMessage::assistant(turn.content),
            });
        }
        messages.push(ChatMessage::user(self.question));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::MessageRole;

    #[test]
    fn context_first_question_last() {
        let prompt = ChatPrompt {
            context: Some("passage one\n\npassage two".into()),
            history: vec![
                ConversationTurn::user("earlier question"),
                ConversationTurn::assistant("earlier answer"),
            ],
            question: "current question".into(),
        };

        let messages = prompt.into_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.starts_with(CONTEXT_HEADER));
        assert!(messages[0].content.contains("passage one"));
        assert_eq!(messages[1].content, "earlier question");
        assert_eq!(messages[2].role, MessageRole::Assistant);
        assert_eq!(messages[3].role, MessageRole::User);
        assert_eq!(messages[3].content, "current question");
    }

    #[test]
    fn missing_context_uses_the_no_context_marker() {
        let prompt =
            ChatPrompt { context: None, history: vec![], question: "anything".into() };
        let messages = prompt.into_messages();
        assert_eq!(messages[0].content, NO_CONTEXT_MARKER);
    }

    #[test]
    fn blank_context_counts_as_missing() {
        let prompt =
            ChatPrompt { context: Some("   ".into()), history: vec![], question: "q".into() };
        assert_eq!(prompt.into_messages()[0].content, NO_CONTEXT_MARKER);
    }
}

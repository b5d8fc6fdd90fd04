//! Conversation transcript with turn-scoped commits.
//!
//! Messages only ever get appended. A turn appends through a [`Turn`]
//! handle; unless the handle is committed, dropping it truncates the
//! transcript back to where the turn started.

use tallybot_core::types::{Message, Role};

/// Ordered history of user, assistant and tool messages.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether `next` may follow the current last message.
    ///
    /// user → assistant; an assistant with tool calls → tool; tool → tool or
    /// assistant; an assistant without tool calls → user.
    pub fn accepts(&self, next: &Message) -> bool {
        let Some(prev) = self.messages.last() else {
            return next.role() == Role::User;
        };
        match (prev.role(), next.role()) {
            (Role::User, Role::Assistant) => true,
            (Role::Assistant, Role::Tool) => !prev.tool_calls().is_empty(),
            (Role::Assistant, Role::User) => prev.tool_calls().is_empty(),
            (Role::Tool, Role::Tool | Role::Assistant) => true,
            _ => false,
        }
    }

    pub(crate) fn begin_turn(&mut self) -> Turn<'_> {
        let start = self.messages.len();
        Turn {
            transcript: self,
            start,
            committed: false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Pending appends for one user message.
pub(crate) struct Turn<'a> {
    transcript: &'a mut Transcript,
    start: usize,
    committed: bool,
}

impl Turn<'_> {
    pub(crate) fn push(&mut self, message: Message) {
        debug_assert!(
            self.transcript.accepts(&message),
            "{} message cannot follow {:?}",
            message.role(),
            self.transcript.last().map(Message::role)
        );
        self.transcript.messages.push(message);
    }

    /// Everything in the transcript, including this turn's appends.
    pub(crate) fn messages(&self) -> &[Message] {
        &self.transcript.messages
    }

    /// Only the messages appended during this turn.
    pub(crate) fn appended(&self) -> &[Message] {
        &self.transcript.messages[self.start..]
    }

    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.transcript.messages.truncate(self.start);
        }
    }
}

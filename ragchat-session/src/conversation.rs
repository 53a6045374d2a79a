//! Bounded conversation history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use ragchat_model::{Message, Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SessionError};
use crate::template::PromptTemplate;

/// Number of stored turns kept by default (ten exchanges).
pub const DEFAULT_MAX_TURNS: usize = 20;

/// One stored message of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke: [`Role::User`] or [`Role::Assistant`].
    pub role: Role,
    /// The message text.
    pub content: String,
    /// Creation order, unique for the lifetime of the manager.
    pub sequence: u64,
    /// When the turn was appended.
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Convert into a model message with the same role and content.
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

/// Whether the history holds any turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    /// No turns recorded.
    Idle,
    /// At least one turn recorded.
    Active,
}

/// Ordered turn history with a fixed cap.
///
/// When an append pushes the history past the cap, turns are evicted from
/// the front two at a time so a question never outlives its answer.
#[derive(Debug, Clone)]
pub struct ConversationManager {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
    next_sequence: u64,
}

impl ConversationManager {
    /// Create an empty history holding at most `max_turns` turns.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCapacity`] if `max_turns < 2`.
    pub fn new(max_turns: usize) -> Result<Self> {
        if max_turns < 2 {
            return Err(SessionError::InvalidCapacity(max_turns));
        }
        Ok(Self { turns: VecDeque::with_capacity(max_turns + 1), max_turns, next_sequence: 0 })
    }

    /// The configured turn cap.
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Append a turn, evicting the oldest pairs if over the cap.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRole`] for [`Role::System`].
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Result<()> {
        if role == Role::System {
            return Err(SessionError::InvalidRole(role));
        }
        self.turns.push_back(ConversationTurn {
            role,
            content: content.into(),
            sequence: self.next_sequence,
            timestamp: Utc::now(),
        });
        self.next_sequence += 1;

        let mut evicted = 0;
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
            self.turns.pop_front();
            evicted += 2;
        }
        if evicted > 0 {
            debug!(evicted, retained = self.turns.len(), "evicted oldest turns");
        }
        Ok(())
    }

    /// The last `limit` turns, oldest first.
    pub fn recent_turns(&self, limit: usize) -> Vec<&ConversationTurn> {
        let skip = self.turns.len().saturating_sub(limit);
        self.turns.iter().skip(skip).collect()
    }

    /// All stored turns, oldest first.
    pub fn turns(&self) -> impl ExactSizeIterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// Number of stored turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns are stored.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// [`ConversationState::Active`] once any turn is stored.
    pub fn state(&self) -> ConversationState {
        if self.turns.is_empty() { ConversationState::Idle } else { ConversationState::Active }
    }

    /// Drop every turn and return to [`ConversationState::Idle`].
    pub fn clear(&mut self) {
        self.turns.clear();
        debug!("conversation cleared");
    }

    /// Fill `template` with the retrieved context and the question.
    pub fn build_prompt(&self, template: &PromptTemplate, context: &str, question: &str) -> String {
        template.render(context, question)
    }

    /// Assemble the request for the model: the filled system prompt, the
    /// last `history_limit` turns, then the question as a user message.
    pub fn build_messages(
        &self,
        template: &PromptTemplate,
        context: &str,
        question: &str,
        history_limit: usize,
    ) -> Vec<Message> {
        let history = self.recent_turns(history_limit);
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.build_prompt(template, context, question)));
        messages.extend(history.into_iter().map(ConversationTurn::to_message));
        messages.push(Message::user(question));
        messages
    }
}

impl Default for ConversationManager {
    fn default() -> Self {
        Self { turns: VecDeque::new(), max_turns: DEFAULT_MAX_TURNS, next_sequence: 0 }
    }
}

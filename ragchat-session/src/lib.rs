//! # ragchat-session
//!
//! Conversation state for ragchat: a bounded turn history and the prompt
//! assembly that turns retrieved context, recent turns and a new question
//! into the message list sent to a [`ChatModel`](ragchat_model::ChatModel).
//!
//! ```rust
//! use ragchat_model::Role;
//! use ragchat_session::{ConversationManager, PromptTemplate};
//!
//! let mut conversation = ConversationManager::new(20).unwrap();
//! conversation.append(Role::User, "What does Policy A do?").unwrap();
//! conversation.append(Role::Assistant, "It increases housing supply.").unwrap();
//!
//! let messages = conversation.build_messages(
//!     &PromptTemplate::default(),
//!     "[similarity: 0.91] Policy B lowers rates.",
//!     "And Policy B?",
//!     10,
//! );
//! assert_eq!(messages.len(), 4);
//! ```

mod conversation;
mod error;
mod template;

pub use conversation::{
    ConversationManager, ConversationState, ConversationTurn, DEFAULT_MAX_TURNS,
};
pub use error::{Result, SessionError};
pub use template::{
    CONTEXT_PLACEHOLDER, DEFAULT_SYSTEM_TEMPLATE, PromptTemplate, QUESTION_PLACEHOLDER,
};

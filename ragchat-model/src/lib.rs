//! # ragchat-model
//!
//! Chat model integrations for ragchat.
//!
//! ## Overview
//!
//! - [`ChatModel`] - the generation contract: messages in, one reply out
//! - [`MockLlm`] - scripted model for tests
//! - [`OpenAIChatModel`] - OpenAI and OpenAI-compatible chat completions
//!
//! ## Supported Models
//!
//! ### OpenAI
//! | Model | Description |
//! |-------|-------------|
//! | `gpt-4o` | Most capable model |
//! | `gpt-4o-mini` | Fast, cost-effective (default) |
//!
//! ## Features
//!
//! - `openai` (default) - [`openai::OpenAIChatModel`]

mod error;
pub mod mock;
mod model;
#[cfg(feature = "openai")]
pub mod openai;
mod types;

pub use error::{ModelError, Result};
pub use mock::MockLlm;
pub use model::ChatModel;
#[cfg(feature = "openai")]
pub use openai::{OpenAIChatModel, OpenAIConfig};
pub use types::{GenerationConfig, Message, Role};

//! OpenAI chat completions.
//!
//! This module is only available when the `openai` feature is enabled. Any
//! OpenAI-compatible endpoint (vLLM, Ollama, Azure proxies) works through
//! [`OpenAIConfig::with_base_url`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragchat_model::openai::{OpenAIChatModel, OpenAIConfig};
//!
//! let model = OpenAIChatModel::new(OpenAIConfig::from_env()?.with_model("gpt-4o"))?;
//! ```

mod client;
mod config;

pub use client::OpenAIChatModel;
pub use config::{DEFAULT_CHAT_MODEL, OPENAI_API_BASE, OpenAIConfig};

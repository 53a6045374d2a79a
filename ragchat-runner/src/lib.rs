//! # ragchat-runner
//!
//! Retrieval-augmented conversations over a ragchat collection.
//!
//! [`ChatRunner::converse`] searches the collection, fills the system prompt
//! with the relevant chunks, sends it with the recent history to a
//! [`ChatModel`](ragchat_model::ChatModel), and records the exchange. Every
//! call returns a [`ChatOutcome`], even when the model fails.
//!
//! Documents come in through [`DocumentSource`] implementations such as
//! [`FileSource`], optionally wrapped in a [`RetryingSource`].

mod config;
mod error;
mod ingest;
mod runner;
mod source;

pub use config::{ChatConfig, ChatConfigBuilder};
pub use error::{Result, RunnerError};
pub use ingest::ingest_from_source;
pub use runner::{
    ChatOutcome, ChatRunner, ChatRunnerBuilder, CollectionInfo, OutcomeStatus, SystemInfo,
    failure_notice,
};
pub use source::{DocumentSource, FileSource, RetryingSource};

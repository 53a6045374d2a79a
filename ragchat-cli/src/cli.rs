use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ask questions about your documents.
#[derive(Debug, Parser)]
#[command(name = "ragchat", version, about)]
pub struct Cli {
    /// Snapshot file holding the indexed collection
    #[arg(long, env = "RAGCHAT_STORE", default_value = "data/ragchat_store.json", global = true)]
    pub store: PathBuf,

    /// Collection name stored in the snapshot
    #[arg(long, default_value = "documents", global = true)]
    pub collection: String,

    /// Chat model identifier
    #[arg(long, env = "RAGCHAT_CHAT_MODEL", default_value = "gpt-4o-mini", global = true)]
    pub chat_model: String,

    /// Embedding model identifier
    #[arg(
        long,
        env = "RAGCHAT_EMBEDDING_MODEL",
        default_value = "text-embedding-3-small",
        global = true
    )]
    pub embedding_model: String,

    /// Embedding dimensions requested from the provider
    #[arg(long, global = true)]
    pub dimensions: Option<usize>,

    /// Number of chunks retrieved per question
    #[arg(long, default_value_t = 3, global = true)]
    pub top_k: usize,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chunk, embed and store text files
    Ingest {
        /// Text files to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Maximum chunk size in characters
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,

        /// Characters shared between consecutive chunks
        #[arg(long, default_value_t = 200)]
        chunk_overlap: usize,
    },
    /// Ask a single question
    Ask {
        question: String,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive conversation
    Chat,
    /// Run a fixed set of sample questions
    Demo,
    /// Show collection and model settings
    Info,
    /// Delete every stored chunk
    Reset,
}

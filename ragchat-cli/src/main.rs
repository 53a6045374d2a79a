//! ragchat - ask questions about your documents
//!
//! Usage:
//!   ragchat ingest <files...>    Chunk, embed and store text files
//!   ragchat ask "question"       Ask one question
//!   ragchat chat                 Interactive conversation
//!   ragchat demo                 Run sample questions
//!   ragchat info                 Show collection and model settings
//!   ragchat reset                Delete the stored collection

mod app;
mod cli;
mod commands;
mod repl;

use anyhow::Result;
use clap::Parser;
use ragchat_rag::RagConfig;
use ragchat_telemetry::{init_json_telemetry, init_stderr_telemetry};

use crate::cli::{Cli, Command};

const SERVICE_NAME: &str = "ragchat";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.json_logs {
        init_json_telemetry(SERVICE_NAME)?;
    } else {
        init_stderr_telemetry(SERVICE_NAME, "warn")?;
    }

    let mut rag_config = RagConfig::builder().top_k(cli.top_k);
    if let Command::Ingest { chunk_size, chunk_overlap, .. } = &cli.command {
        rag_config = rag_config.chunk_size(*chunk_size).chunk_overlap(*chunk_overlap);
    }
    let mut runner = app::build_runner(&cli, rag_config.build()?).await?;

    match cli.command {
        Command::Ingest { paths, .. } => commands::ingest(&runner, &paths).await,
        Command::Ask { question, json } => commands::ask(&mut runner, &question, json).await,
        Command::Chat => repl::run(&mut runner).await,
        Command::Demo => commands::demo(&mut runner).await,
        Command::Info => commands::info(&runner).await,
        Command::Reset => commands::reset(&runner).await,
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ragchat_model::{OpenAIChatModel, OpenAIConfig};
use ragchat_rag::{
    EmbeddingProvider, FileVectorIndex, OpenAIEmbeddingProvider, RagConfig, RagPipeline,
};
use ragchat_runner::{ChatConfig, ChatRunner};
use tracing::info;

use crate::cli::Cli;

/// Wire the OpenAI adapters and the file-backed index into a runner.
///
/// Fails before touching the store if `OPENAI_API_KEY` is missing.
pub async fn build_runner(cli: &Cli, rag_config: RagConfig) -> Result<ChatRunner> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; export it or add it to a .env file")?;

    let mut embedder =
        OpenAIEmbeddingProvider::new(api_key.clone())?.with_model(&cli.embedding_model);
    if let Some(dimensions) = cli.dimensions {
        embedder = embedder.with_dimensions(dimensions);
    }

    let index = FileVectorIndex::open(&cli.store, &cli.collection, embedder.dimensions())
        .await
        .with_context(|| format!("failed to open store {}", cli.store.display()))?;
    info!(store = %cli.store.display(), collection = %cli.collection, "opened store");

    let pipeline = RagPipeline::builder()
        .config(rag_config)
        .embedding_provider(Arc::new(embedder))
        .vector_index(Arc::new(index))
        .build()?;

    let model = OpenAIChatModel::new(OpenAIConfig::new(api_key, &cli.chat_model))?;
    let config = ChatConfig::builder().top_k(cli.top_k).build()?;

    Ok(ChatRunner::builder()
        .pipeline(Arc::new(pipeline))
        .model(Arc::new(model))
        .config(config)
        .build()?)
}

/// Document ids for `paths`, as the file source resolves them.
pub fn document_ids(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.to_string_lossy().into_owned()).collect()
}

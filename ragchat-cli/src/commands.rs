use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use ragchat_runner::{ChatOutcome, ChatRunner, FileSource, RetryingSource};

use crate::app::document_ids;

pub const DEMO_QUESTIONS: [&str; 4] = [
    "What are the main points of the policy?",
    "Have there been any recent policy changes?",
    "What are the goals of the policy?",
    "How does the policy affect ordinary citizens?",
];

pub async fn ingest(runner: &ChatRunner, paths: &[PathBuf]) -> Result<()> {
    let ids = document_ids(paths);
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    let source = RetryingSource::new(FileSource::new(""), 2, Duration::from_millis(200));

    let report = runner.ingest_from_source(&source, &ids).await;
    println!(
        "Ingested {} document(s), {} chunk(s); {} empty",
        report.documents_ingested, report.chunks_added, report.documents_empty
    );
    for failure in &report.failures {
        eprintln!("  failed: {} ({})", failure.document_id, failure.reason);
    }
    if !report.is_success() {
        bail!("{} document(s) could not be ingested", report.failures.len());
    }
    Ok(())
}

pub async fn ask(runner: &mut ChatRunner, question: &str, json: bool) -> Result<()> {
    warn_if_empty(runner).await?;
    let outcome = runner.converse(question).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

pub async fn demo(runner: &mut ChatRunner) -> Result<()> {
    warn_if_empty(runner).await?;
    for (i, question) in DEMO_QUESTIONS.iter().enumerate() {
        println!("\nQuestion {}: {question}", i + 1);
        println!("{}", "-".repeat(40));
        let outcome = runner.converse(question).await;
        print_outcome(&outcome);
    }
    Ok(())
}

pub async fn info(runner: &ChatRunner) -> Result<()> {
    let info = runner.system_info().await?;
    println!("Chat model:      {}", info.chat_model);
    println!("Max tokens:      {}", info.max_tokens);
    println!("Temperature:     {}", info.temperature);
    println!("History length:  {}", info.history_len);
    println!("Collection:      {}", info.collection.collection);
    println!("Chunks:          {}", info.collection.count);
    println!("Dimensions:      {}", info.collection.dimensions);
    println!("Embedding model: {}", info.collection.embedding_model);
    Ok(())
}

pub async fn reset(runner: &ChatRunner) -> Result<()> {
    let info = runner.collection_info().await?;
    runner.delete_collection().await?;
    println!("Deleted {} chunk(s) from '{}'", info.count, info.collection);
    Ok(())
}

async fn warn_if_empty(runner: &ChatRunner) -> Result<()> {
    if runner.collection_info().await?.count == 0 {
        eprintln!("The collection is empty. Run `ragchat ingest <files>` first.");
    }
    Ok(())
}

pub fn print_outcome(outcome: &ChatOutcome) {
    println!("\nAnswer: {}", outcome.answer);
    if !outcome.retrieval_results.is_empty() {
        println!("\nSources ({}):", outcome.retrieval_results.len());
        for result in &outcome.retrieval_results {
            let name = result.metadata.filename.as_deref().unwrap_or(&result.id);
            println!("  {}. {} (similarity: {:.2})", result.rank, name, result.similarity);
        }
    }
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ragdb_core::config::{Config, Settings};
use ragdb_core::data_processor::DataProcessor;
use ragdb_core::traits::Embedder;
use ragdb_core::types::SourceDocument;
use ragdb_embed::get_default_embedder;
use ragdb_hybrid::answer::NO_CONTEXT_MESSAGE;
use ragdb_hybrid::{AnswerContext, HybridEngine, SearchRequest, SearchResponse};
use ragdb_store::IndexStore;

mod args;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir, &cli.env).context("loading config")?;
    let settings = config.settings().context("invalid settings")?;
    let index_dir = cli.index_dir.clone().unwrap_or_else(|| settings.index_dir(&cli.config_dir));
    info!(env = config.env_name(), index = %index_dir.display(), "ragdb starting");

    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&settings.embedding)?);
    let engine = HybridEngine::open(IndexStore::new(&index_dir), embedder, &settings).await?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted; cancelling");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Command::Ingest(a) => {
            let text = std::fs::read_to_string(&a.file).with_context(|| format!("reading {}", a.file.display()))?;
            let id = a.id.unwrap_or_else(|| file_stem(&a.file));
            let filename = a.file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| id.clone());
            let chunks = engine.ingest(SourceDocument::new(id, filename, text), &cancel).await?;
            println!("{}", serde_json::json!({ "chunks_processed": chunks }));
        }
        Command::IngestDir(a) => {
            let dir = a.dir.unwrap_or_else(|| settings.raw_txt_dir(&cli.config_dir));
            let processor = a.limit.map(DataProcessor::with_limit).unwrap_or_default();
            let documents = processor.process_directory(&dir)?;
            let pb = ProgressBar::new(documents.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
                    .progress_chars("#>-"),
            );
            let mut total = 0;
            for document in documents {
                let name = document.filename.clone();
                pb.set_message(name.clone());
                let chunks = engine.ingest(document, &cancel).await.with_context(|| format!("ingesting {}", name))?;
                info!(file = %name, chunks, "ingested");
                total += chunks;
                pb.inc(1);
            }
            pb.finish_and_clear();
            println!("{}", serde_json::json!({ "chunks_processed": total }));
        }
        Command::Query(a) => {
            let request = query_request(&settings, &a.query, a.lexical_weight, a.semantic_weight, a.top_k);
            let response = engine.search(&request, &cancel).await?;
            if a.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_hits(&response);
            }
        }
        Command::Ask(a) => {
            let request = query_request(&settings, &a.question, None, None, a.top_k);
            let hits = engine.search(&request, &cancel).await?.into_hits();
            let context = AnswerContext::new(&a.question, &hits)?;
            if context.is_empty() {
                println!("{}", NO_CONTEXT_MESSAGE);
            } else {
                println!("{}", serde_json::json!({
                    "system": context.system_prompt(),
                    "user": context.prompt(),
                }));
            }
        }
        Command::Health(a) => {
            let report = engine.health();
            if a.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "chunks={} metadata={} vectors={} dim={} documents={} generation={} embedder={} consistent={}",
                    report.chunks,
                    report.metadata_records,
                    report.vectors,
                    report.dim.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                    report.documents,
                    report.generation,
                    report.embedder_id,
                    report.consistent
                );
                for issue in &report.issues {
                    println!("  issue: {}", issue);
                }
            }
        }
    }
    Ok(())
}

/// Caller-side defaults and weight normalization before the ranker sees them.
fn query_request(
    settings: &Settings,
    query: &str,
    lexical_weight: Option<f32>,
    semantic_weight: Option<f32>,
    top_k: Option<usize>,
) -> SearchRequest {
    let mut request = SearchRequest::from_settings(query, &settings.search);
    if lexical_weight.is_some() || semantic_weight.is_some() {
        let lexical = lexical_weight.unwrap_or(request.lexical_weight);
        let semantic = semantic_weight.unwrap_or(request.semantic_weight);
        request = request.with_weights(lexical, semantic);
    }
    if let Some(k) = top_k {
        request = request.with_top_k(k);
    }
    request.normalized()
}

fn print_hits(response: &SearchResponse) {
    match response {
        SearchResponse::NotIndexed => println!("{}", NO_CONTEXT_MESSAGE),
        SearchResponse::Ranked(hits) if hits.is_empty() => println!("no results"),
        SearchResponse::Ranked(hits) => {
            for (rank, hit) in hits.iter().enumerate() {
                let source = hit
                    .metadata
                    .as_ref()
                    .map(|m| format!("{}#{}", m.filename, m.chunk_index))
                    .unwrap_or_else(|| "?".to_string());
                let preview: String = hit.text.chars().take(160).collect();
                println!("{:>2}. [{:.4}] {} :: {}", rank + 1, hit.score, source, preview);
            }
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| path.to_string_lossy().to_string())
}

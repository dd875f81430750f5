//! services/client/src/bin/docsum.rs
//!
//! Headless driver for the document summarizer backend:
//!
//!   docsum list [page] [recent|oldest|name|size]
//!   docsum show <document-id>
//!   docsum summarize <document-id>
//!   docsum reprocess <document-id>
//!   docsum find <document-id> <text>
//!   docsum upload <file.pdf>...

use bytes::Bytes;
use client_lib::{
    adapters::HttpDocumentApi,
    config::Config,
    error::ClientError,
    upload::UploadPipeline,
    views::{DetailState, DocumentCard, DocumentDetailView, DocumentListView},
};
use std::path::Path;
use std::sync::Arc;
use summarizer_core::{DocumentApi, DocumentQuery, DocumentStatus, DocumentStore, SortOrder, UploadFile};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const USAGE: &str = "usage: docsum <list [page] [sort] | show <id> | summarize <id> | reprocess <id> | find <id> <text> | upload <file.pdf>...>";

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Wire the API client and the store ---
    let api: Arc<dyn DocumentApi> = Arc::new(HttpDocumentApi::from_config(&config)?);
    let store = DocumentStore::new();

    // --- 3. Dispatch ---
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("list") => {
            let mut list = DocumentListView::new(api, store, config.page_size);
            for arg in &args[1..] {
                if let Ok(page) = arg.parse::<u32>() {
                    list.set_page(page);
                } else if let Some(sort) = SortOrder::parse(arg) {
                    list.set_query(DocumentQuery::sorted_by(sort));
                } else {
                    return Err(ClientError::Internal(USAGE.to_string()));
                }
            }
            list.load().await?;
            for doc in list.visible() {
                let card = DocumentCard::from_document(&doc);
                println!(
                    "{}  {:<40} {:>10}  {:<10} {}",
                    card.id, card.title, card.size_label, card.status_label, card.uploaded_label
                );
            }
        }
        Some("show") => {
            let id = parse_id(args.get(1))?;
            let detail = DocumentDetailView::new(api, store.clone());
            match detail.open(id).await? {
                DetailState::NotFound => println!("Document {} not found", id),
                DetailState::Loaded {
                    document,
                    summary_error,
                } => {
                    let card = DocumentCard::from_document(&document);
                    println!("{} ({}, {})", card.title, card.size_label, card.status_label);
                    match (store.snapshot().current_summary, summary_error) {
                        (Some(summary), _) => print_summary(&summary.content, &summary.key_points),
                        (None, Some(e)) => eprintln!("Could not load the summary: {}", e),
                        (None, None) => println!("No summary generated yet."),
                    }
                }
            }
        }
        Some("summarize") => {
            let id = parse_id(args.get(1))?;
            let detail = DocumentDetailView::new(api, store);
            let summary = detail.generate_summary(id).await?;
            print_summary(&summary.content, &summary.key_points);
        }
        Some("reprocess") => {
            let id = parse_id(args.get(1))?;
            let detail = DocumentDetailView::new(api, store);
            detail.reprocess(id).await?;
            println!("Processing of {} restarted", id);
        }
        Some("find") if args.len() > 2 => {
            let id = parse_id(args.get(1))?;
            let detail = DocumentDetailView::new(api, store);
            let matches = detail.search_text(id, &args[2..].join(" ")).await?;
            if matches.is_empty() {
                println!("No matches.");
            }
            for m in matches {
                println!("{:>8}  ...{}...", m.position, m.context.replace('\n', " "));
            }
        }
        Some("upload") if args.len() > 1 => {
            upload(api, store, &config, &args[1..]).await?;
        }
        _ => {
            return Err(ClientError::Internal(USAGE.to_string()));
        }
    }

    Ok(())
}

fn parse_id(raw: Option<&String>) -> Result<Uuid, ClientError> {
    let raw = raw.ok_or_else(|| ClientError::Internal(USAGE.to_string()))?;
    Uuid::parse_str(raw).map_err(|e| ClientError::Internal(format!("Invalid document id '{}': {}", raw, e)))
}

fn print_summary(content: &str, key_points: &[String]) {
    println!("\n{}\n", content);
    for point in key_points {
        println!("  - {}", point);
    }
}

async fn upload(
    api: Arc<dyn DocumentApi>,
    store: DocumentStore,
    config: &Config,
    paths: &[String],
) -> Result<(), ClientError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path).await?;
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        files.push(UploadFile::new(name, None, Bytes::from(data)));
    }

    let pipeline = UploadPipeline::new(api, store, config.upload.clone());
    let outcome = pipeline.submit(files);
    for rejection in &outcome.rejected {
        eprintln!("Rejected {}", rejection);
    }

    // Wait until every accepted upload has either failed or left processing.
    let mut updates = pipeline.tracker().subscribe();
    let accepted = outcome.accepted.clone();
    updates
        .wait_for(|entries| {
            entries
                .iter()
                .filter(|e| accepted.contains(&e.id))
                .all(|e| e.status.is_terminal())
        })
        .await
        .map_err(|e| ClientError::Internal(e.to_string()))?;

    for entry in pipeline.tracker().snapshot() {
        match entry.status {
            DocumentStatus::Error => eprintln!(
                "Failed {}: {}",
                entry.file_name,
                entry.error.as_deref().unwrap_or("unknown error")
            ),
            _ => println!(
                "Uploaded {} as {}",
                entry.file_name,
                entry.document_id.map(|id| id.to_string()).unwrap_or_default()
            ),
        }
    }

    pipeline.shutdown().await;
    Ok(())
}

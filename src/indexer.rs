use std::path::PathBuf;
use std::sync::Arc;

use faber::application::CorpusIndexer;
use faber::infrastructure::{read_passages, AppConfig, QdrantVectorStore, TextEmbedding};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CORPUS_PATH: &str = "data/corpus.json";

/// Builds the corpus index from a JSON array of `{source, page, content}`
/// passages. Usage: `index [passages.json]` (or `CORPUS_PATH`).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "index=debug,faber=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config_dir = std::env::var("FABER_CONFIG_DIR").unwrap_or_else(|_| "config".into());
    let config = AppConfig::load(&config_dir)?.config;

    let path: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CORPUS_PATH").ok())
        .unwrap_or_else(|| DEFAULT_CORPUS_PATH.into())
        .into();

    let passages = read_passages(&path)?;
    info!(passages = passages.len(), path = %path.display(), "corpus loaded");

    let vector_store = QdrantVectorStore::new(
        &config.retrieval.qdrant_url,
        &config.retrieval.collection,
        config.embedding.dimension,
    )
    .await?;
    info!(collection = %config.retrieval.collection, "Qdrant connected");

    let indexer = CorpusIndexer::new(
        Arc::new(TextEmbedding::from_config(&config.embedding)),
        Arc::new(vector_store),
    );
    let written = indexer.index(&passages).await?;

    info!(written, skipped = passages.len() - written, "corpus indexed");
    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use faber::api::{create_router, AppState};
use faber::application::{
    ChatService, ConversationalSynthesizer, CorpusIndexer, DocumentRetriever, FeedbackService,
    ResolutionOrchestrator, SessionRegistry, SimilarityMatcher,
};
use faber::domain::ports::{FeedbackStore, TranscriptStore, VectorStore};
use faber::infrastructure::config::{EmbeddingConfig, RetrievalConfig};
use faber::infrastructure::storage::{create_pool, RedisPool};
use faber::infrastructure::{
    build_llm, load_reference_set, read_passages, AppConfig, InMemoryRecordStore,
    InMemoryVectorStore, QdrantVectorStore, RedisRecordStore, TextEmbedding, TrigramSimilarity,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,faber=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config_dir = std::env::var("FABER_CONFIG_DIR").unwrap_or_else(|_| "config".into());
    let app_config = AppConfig::load(&config_dir)?;
    let config = &app_config.config;

    let matcher = SimilarityMatcher::new(
        load_reference_set(&config.matcher.dataset_path),
        Arc::new(TrigramSimilarity::new()),
    );
    if matcher.is_empty() {
        warn!("no reference answers, every question will use retrieval");
    } else {
        info!(entries = matcher.len(), threshold = config.matcher.threshold, "matcher ready");
    }

    let embedding = Arc::new(TextEmbedding::from_config(&config.embedding));
    let vector_store = vector_store(&config.retrieval, &config.embedding, embedding.clone()).await?;
    let retriever = DocumentRetriever::new(embedding, vector_store)
        .with_top_k(config.retrieval.top_k)
        .with_relevance_floor(config.retrieval.relevance_floor);

    let llm = build_llm(&config.llm)?;
    info!(provider = llm.provider_name(), model = %config.llm.model, "language model configured");
    let synthesizer = ConversationalSynthesizer::new(llm, app_config.prompts.system.clone())
        .with_timeout(Duration::from_secs(config.llm.timeout_seconds));

    let orchestrator = ResolutionOrchestrator::new(
        Arc::new(matcher),
        Arc::new(retriever),
        Arc::new(synthesizer),
    )
    .with_threshold(config.matcher.threshold);

    let (transcripts, feedback_store, redis_pool) =
        record_stores(config.storage.redis_url.as_deref())?;

    let sessions = Arc::new(SessionRegistry::new(
        config.conversation.window,
        app_config.prompts.greeting.clone(),
    ));
    spawn_session_reaper(
        sessions.clone(),
        Duration::from_secs(config.conversation.session_idle_seconds),
    );
    let chat = ChatService::new(
        Arc::new(orchestrator),
        sessions,
        transcripts,
        app_config.prompts.replies(),
    );
    let feedback = FeedbackService::new(feedback_store);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let mut state = AppState::new(Arc::new(chat), Arc::new(feedback), app_config);
    if let Some(pool) = redis_pool {
        state = state.with_redis_pool(pool);
    }
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Qdrant, or an in-process index over `corpus_path` when one is configured.
async fn vector_store(
    retrieval: &RetrievalConfig,
    embedding_config: &EmbeddingConfig,
    embedding: Arc<TextEmbedding>,
) -> anyhow::Result<Arc<dyn VectorStore>> {
    match &retrieval.corpus_path {
        Some(path) => {
            let passages = read_passages(path)?;
            let store = Arc::new(InMemoryVectorStore::new());
            let written = CorpusIndexer::new(embedding, store.clone())
                .index(&passages)
                .await?;
            info!(written, path = %path, "corpus indexed in memory");
            let store: Arc<dyn VectorStore> = store;
            Ok(store)
        }
        None => {
            let store = QdrantVectorStore::connect(
                &retrieval.qdrant_url,
                &retrieval.collection,
                embedding_config.dimension,
            )?;
            Ok(Arc::new(store))
        }
    }
}

fn spawn_session_reaper(sessions: Arc<SessionRegistry>, max_idle: Duration) {
    if max_idle.is_zero() {
        info!("idle session eviction disabled");
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval((max_idle / 4).max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle(max_idle).await;
            if evicted > 0 {
                let live = sessions.len().await;
                info!(evicted, live, "idle sessions evicted");
            }
        }
    });
}

type RecordStores = (
    Arc<dyn TranscriptStore>,
    Arc<dyn FeedbackStore>,
    Option<RedisPool>,
);

fn record_stores(redis_url: Option<&str>) -> anyhow::Result<RecordStores> {
    match redis_url {
        Some(url) => {
            let pool = create_pool(url)?;
            info!("Redis pool initialized");
            let store = Arc::new(RedisRecordStore::new(pool.clone()));
            let transcripts: Arc<dyn TranscriptStore> = store.clone();
            let feedback: Arc<dyn FeedbackStore> = store;
            Ok((transcripts, feedback, Some(pool)))
        }
        None => {
            info!("no redis_url configured, keeping records in memory");
            let store = Arc::new(InMemoryRecordStore::new());
            let transcripts: Arc<dyn TranscriptStore> = store.clone();
            let feedback: Arc<dyn FeedbackStore> = store;
            Ok((transcripts, feedback, None))
        }
    }
}

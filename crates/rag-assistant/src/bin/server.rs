//! RAG assistant server binary
//!
//! Run with: cargo run -p rag-assistant --bin rag-assistant-server

use rag_assistant::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // GROQ_API_KEY and friends may live in .env
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_assistant=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                 Enterprise RAG Assistant                  ║
║            Chat with your internal documents              ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = RagConfig::load(None)?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {} ({} dims)", config.embeddings.model, config.embeddings.dimensions);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Chunk size: {} (overlap {})", config.chunking.chunk_size, config.chunking.chunk_overlap);
    tracing::info!("  - Index location: {}", config.storage.index_dir.display());

    if config.llm.api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; questions will fail until it is provided");
    }

    let server = RagServer::new(config.clone())?;

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.embeddings.base_url);
    match server.state().embedder().health_check().await {
        Ok(true) => tracing::info!("Ollama is running"),
        _ => {
            tracing::warn!("Ollama not available at {}", config.embeddings.base_url);
            tracing::warn!("Please start Ollama:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!("  2. Pull the embedding model: ollama pull {}", config.embeddings.model);
        }
    }

    println!("\nServer starting...");
    println!("  UI: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

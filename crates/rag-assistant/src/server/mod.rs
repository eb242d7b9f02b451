//! HTTP server for the RAG assistant

pub mod routes;
pub mod state;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
pub use state::AppState;

/// RAG HTTP Server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a server with the configured Ollama and Groq providers
    pub fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server around existing state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config().clone(),
            state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        tracing::info!("Starting RAG assistant on http://{}", addr);

        let sweeper = self.state.sessions().spawn_sweeper();
        tracing::info!(
            "Sessions expire after {}s idle",
            self.state.sessions().idle_timeout().as_secs()
        );

        let served = axum::serve(listener, build_router(self.state))
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)));
        sweeper.abort();
        served
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config().server.enable_cors;
    let max_upload_size = state.config().server.max_upload_size;

    let router = Router::new()
        .route("/", get(index_page))
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .nest("/api", routes::api_routes(max_upload_size))
        .with_state(state)
        // Applied bottom to top
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Single-page chat UI
async fn index_page() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

mod advisor;
mod config;
mod errors;
mod extract;
mod llm_client;
mod matching;
mod routes;
mod state;
mod tools;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::advisor::store::SessionStore;
use crate::advisor::AdvisorEngine;
use crate::config::Config;
use crate::llm_client::{LlmClient, ModelClient};
use crate::matching::{MatchScorer, TfCosineScorer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::tools::ResumeTools;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ICA API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the LLM client and verify the configured model answers,
    // falling back to the secondary identifier if it does not.
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.advisor_model.clone(),
        config.advisor_fallback_model.clone(),
    )
    .with_healthy_model()
    .await;
    info!("LLM client initialized (model: {})", llm.model());
    let model: Arc<dyn ModelClient> = Arc::new(llm);

    // Session store lives for the whole process and is injected into the
    // engine; sessions are in-memory only.
    let store = Arc::new(SessionStore::new(config.max_sessions));
    info!("Session store initialized (capacity: {})", config.max_sessions);

    // Engine construction is the single credential check point.
    let engine = AdvisorEngine::new(Arc::clone(&model), store)?;

    let tools = Arc::new(ResumeTools::new(Arc::clone(&model)));
    let scorer: Arc<dyn MatchScorer> = Arc::new(TfCosineScorer);

    // Build app state
    let state = AppState {
        engine,
        tools,
        scorer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! GenUI HTTP Server
//!
//! Axum host for the GenUI node registry: lists node descriptors, executes
//! nodes and serves saved previews.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genui_nodes::{NodeConfig, NodeContext, NodeRegistry};
use genui_runtime::HttpProviderFactory;

use crate::handlers::{execute_node, health_check, list_nodes, view_file};
use crate::state::AppState;

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/nodes", get(list_nodes))
        .route("/api/nodes/{name}", post(execute_node))
        .route("/view", get(view_file))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NodeConfig::from_env();
    for dir in [&config.input_dir, &config.output_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "Cannot create directory");
        }
    }
    match &config.reference_file {
        Some(path) => tracing::info!(path = %path.display(), "Agent reference file configured"),
        None => tracing::debug!("No agent reference file"),
    }

    let providers = Arc::new(HttpProviderFactory::from_env());
    tracing::info!(
        gemini = %providers.config().gemini_base_url,
        openai = %providers.config().openai_base_url,
        "Provider endpoints"
    );

    let ctx = NodeContext::new(config.clone(), providers);
    let registry = NodeRegistry::with_defaults(&ctx);
    for name in registry.names() {
        tracing::info!("  • {}", name);
    }

    let state = AppState {
        registry: Arc::new(registry),
        config: Arc::new(config),
    };
    let app = router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8188".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("GenUI server running on http://{}", addr);
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  GET  /api/nodes         - Node descriptors");
    tracing::info!("  POST /api/nodes/{{name}}  - Execute a node");
    tracing::info!("  GET  /view              - Saved previews");

    axum::serve(listener, app).await?;

    Ok(())
}

//! ViveFlow API server.
//!
//! REST endpoints for:
//! - Framework generation from a free-text idea
//! - Idea enhancement before generation
//! - Conversational assistance over a generated framework

use anyhow::Result;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod error;
mod handlers;
mod models;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("viveflow_api=info".parse()?)
                .add_directive("viveflow_llm=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = Config::from_env();
    let state = Arc::new(AppState::new(&config));

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/process-idea", post(handlers::process_idea))
        .route("/api/enhance-prompt", post(handlers::enhance_prompt))
        .route("/api/chat-response", post(handlers::chat_response))
        .route("/api/frameworks", get(handlers::list_frameworks))
        .route(
            "/api/frameworks/:id",
            delete(handlers::delete_framework).put(handlers::update_framework_meta),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting ViveFlow API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod auth;
mod config;
mod error;
mod models;
mod routes;
mod services;
mod store;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use routes::{create_router, AppState};
use services::assistant::{AiAssistant, GeminiAssistant};
use store::Store;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tiaoservice_server=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();
    let port = config.server_port;

    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; assistant calls will fail");
    }

    // Seed the in-memory marketplace state
    let store = Store::seeded().expect("Failed to seed application state");
    tracing::info!("Seeded in-memory marketplace state");

    let assistant: Arc<dyn AiAssistant> = Arc::new(GeminiAssistant::new(&config));

    let state = AppState {
        store,
        config: config.clone(),
        assistant,
    };

    // Build router with middleware
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = format!("0.0.0.0:{port}");
    tracing::info!("tiaoservice-server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}

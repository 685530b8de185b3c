mod admin;
mod assistant;
mod auth;
mod chats;
mod professionals;
mod profile;
mod requests;
mod wallet;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::auth::middleware::require_auth;
use crate::config::Config;
use crate::services::assistant::AiAssistant;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub assistant: Arc<dyn AiAssistant>,
}

async fn health() -> &'static str {
    "ok"
}

pub fn create_router(state: AppState) -> Router {
    // Rate limit: auth routes — 10 requests per 60 seconds per IP
    let auth_governor = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .finish()
        .unwrap();

    // Rate limit: public routes — 30 requests per 60 seconds per IP
    let public_governor = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(30)
        .finish()
        .unwrap();

    // Rate limit: protected API — 120 requests per 60 seconds per IP
    let api_governor = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(120)
        .finish()
        .unwrap();

    // Health checks — no rate limit
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health));

    // Auth routes — strict rate limit
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .layer(GovernorLayer::new(Arc::new(auth_governor)));

    // Browsing the marketplace needs no account — moderate rate limit
    let public_routes = Router::new()
        .route("/api/v1/categories", get(professionals::categories))
        .route("/api/v1/professionals", get(professionals::list))
        .layer(GovernorLayer::new(Arc::new(public_governor)));

    let protected = Router::new()
        // Auth
        .route("/api/v1/auth/me", get(auth::me))
        // Profile
        .route("/api/v1/profile", put(profile::update))
        .route(
            "/api/v1/profile/service-change",
            post(profile::request_service_change),
        )
        .route(
            "/api/v1/profile/profile-change",
            post(profile::request_profile_change),
        )
        // Wallet
        .route("/api/v1/wallet", get(wallet::get_wallet))
        .route("/api/v1/wallet/deposit", post(wallet::deposit))
        .route("/api/v1/wallet/withdraw", post(wallet::withdraw))
        .route("/api/v1/wallet/exchange", post(wallet::exchange))
        // Service requests
        .route(
            "/api/v1/requests",
            get(requests::list).post(requests::create),
        )
        .route("/api/v1/requests/{id}/accept", post(requests::accept))
        .route("/api/v1/requests/{id}/decline", post(requests::decline))
        .route("/api/v1/requests/{id}/complete", post(requests::complete))
        .route("/api/v1/requests/{id}/pay", post(requests::pay))
        // Chat with a professional (replies are AI-generated in persona)
        .route(
            "/api/v1/chats/{professional_id}/messages",
            get(chats::history).post(chats::send),
        )
        // Assistant
        .route("/api/v1/assistant/help", post(assistant::help))
        .route("/api/v1/assistant/emergency", post(assistant::emergency))
        // Admin
        .route("/api/v1/admin/users", get(admin::list_users))
        .route(
            "/api/v1/admin/users/{id}/status",
            put(admin::update_status),
        )
        .route("/api/v1/admin/users/{id}", delete(admin::delete_user))
        .route(
            "/api/v1/admin/users/{id}/approve-services",
            post(admin::approve_service_change),
        )
        .route(
            "/api/v1/admin/users/{id}/approve-profile",
            post(admin::approve_profile_change),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(GovernorLayer::new(Arc::new(api_governor)));

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(public_routes)
        .merge(protected)
        .with_state(state)
}

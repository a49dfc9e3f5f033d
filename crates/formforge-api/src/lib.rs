//! FormForge HTTP API
//!
//! Creator endpoints under `/api/forms` (caller identity from `X-User-Id`,
//! set by the fronting auth proxy) and anonymous respondent endpoints under
//! `/api/public/forms`.

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use formforge_core::Engine;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ApiConfig;
pub use models::*;

/// API state
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/forms", routes::forms::router())
        .nest("/forms/:form_id/fields", routes::fields::router())
        .nest("/forms/:form_id/responses", routes::responses::router())
        .nest("/public/forms", routes::public::router())
}

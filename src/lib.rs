pub mod config;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::{Config, ConfigError};

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::cafe::CafeHandlerState;
use services::CafeService;

/// Build the application router with all routes and middleware
pub fn create_app(cafe_service: Arc<CafeService>) -> Router {
    let state = CafeHandlerState { cafe_service };

    Router::new()
        .route("/", get(handlers::home))
        .route("/health/status", get(handlers::health_check))
        .route("/all", get(handlers::list_cafes))
        .route("/search", get(handlers::search_cafes))
        .route("/random", get(handlers::random_cafe))
        .route("/add", post(handlers::add_cafe))
        .route("/update-price/:cafe_id", patch(handlers::update_price))
        .route("/report-closed/:cafe_id", delete(handlers::report_closed))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

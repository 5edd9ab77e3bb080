use axum::Router;
use std::sync::Arc;

use anicodes_api::{config::Config, create_router, services::AppState};

/// Builds the full application router without touching the database.
///
/// The MongoDB client is lazy, so handlers that fail before their first
/// query (validation, malformed ids) can be exercised with no server
/// running. Tests that need live data belong in an environment with
/// MongoDB available.
pub async fn create_test_app() -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // Load test environment from .env.test when present
    dotenvy::from_filename(".env.test").ok();

    let config = Config::load().expect("Failed to load test configuration");

    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to create test MongoDB client");

    let app_state = Arc::new(AppState::new(config, mongo_client));

    create_router(app_state)
}

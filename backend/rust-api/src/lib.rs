#![allow(dead_code)]

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod authoring;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod progress;
pub mod quiz;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

/// CSP middleware adds Content-Security-Policy header to all responses
async fn csp_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: https:; \
             connect-src 'self'",
        ),
    );
    response
}

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // CORS configuration for the browser-facing API
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .nest("/api", api_routes().layer(cors))
        .with_state(app_state)
        .layer(middleware::from_fn(csp_middleware)) // Apply CSP to all responses
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        // Course catalog
        .route(
            "/courses",
            get(handlers::courses::list_courses).post(handlers::courses::create_course),
        )
        .route("/courses/{id}", get(handlers::courses::get_course))
        // Problem bank
        .route(
            "/problems",
            get(handlers::problems::list_problems).post(handlers::problems::create_problem),
        )
        // Gemini relay
        .route("/gemini-chat", post(handlers::chat::gemini_chat))
        // Users and progress
        .route("/users", post(handlers::users::create_user))
        .route("/users/{id}/progress", get(handlers::users::get_progress))
        .route("/users/{id}/enrollments", post(handlers::users::enroll))
        .route(
            "/users/{id}/progress/lessons",
            post(handlers::users::record_lesson_completion),
        )
        .route(
            "/users/{id}/progress/final-quiz",
            post(handlers::users::record_final_quiz),
        )
        .route(
            "/users/{id}/solved",
            post(handlers::users::record_submission),
        )
}

use crate::handlers;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(cors_origin)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ]);

    Ok(Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/quiz", get(handlers::get_quiz))
        .route("/api/v1/quiz/load", post(handlers::load_quiz))
        .route("/api/v1/quiz/answer", post(handlers::submit_answer))
        .route("/api/v1/quiz/drag", post(handlers::place_word))
        .route("/api/v1/quiz/advance", post(handlers::advance))
        .route("/api/v1/quiz/retreat", post(handlers::retreat))
        .route("/api/v1/quiz/restart", post(handlers::restart))
        .route("/api/v1/quiz/score", get(handlers::score))
        .route("/api/v1/quiz/result", get(handlers::result))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

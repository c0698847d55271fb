//! HTTP surface for the web UI and the browser extension.

pub mod extract;
pub mod handlers;
pub mod rate_limit;
pub mod response;

pub use rate_limit::RateLimiter;
pub use response::ApiError;

use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::pipelines::Analyzer;

/// Shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub limiter: Arc<RateLimiter>,
    pub openai_available: bool,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, config: &AppConfig) -> Self {
        Self {
            analyzer,
            limiter: Arc::new(RateLimiter::from_config(&config.rate_limit)),
            openai_available: config.openai_available(),
        }
    }
}

/// All routes; only the ones that run the pipeline are rate limited
pub fn create_router(state: AppState) -> Router {
    let pipeline = Router::new()
        .route("/analyse", get(handlers::analyse))
        .route("/analyse-text", post(handlers::analyse_text))
        .route("/chrome/analyze", get(handlers::chrome_analyze))
        .route("/extension/analyze", get(handlers::extension_analyze))
        .route("/extension/quick-check", get(handlers::quick_check))
        .route("/extension/suggestions", get(handlers::suggestions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ));

    let info = Router::new()
        .route("/health", get(handlers::health))
        .route("/chrome/health-check", get(handlers::chrome_health_check))
        .route("/supported-sites", get(handlers::supported_sites))
        .route("/learned-patterns", get(handlers::learned_patterns))
        .route(
            "/ingredient-description",
            get(handlers::ingredient_description),
        )
        .route(
            "/ingredient-substitutions",
            get(handlers::ingredient_substitutions),
        );

    pipeline
        .merge(info)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! mgc-analyzer library interface
//!
//! Exposes the router and analysis pipeline for integration testing.

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod services;
pub mod utils;

pub use crate::config::AnalyzerConfig;
pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::GenreAnalyzer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved settings, fixed at startup
    pub config: Arc<AnalyzerConfig>,
    /// Decode + extract + classify pipeline
    pub analyzer: GenreAnalyzer,
}

impl AppState {
    pub fn new(config: AnalyzerConfig) -> Self {
        let analyzer = GenreAnalyzer::from_config(&config);
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(api::analyze_routes())
        .merge(api::debug_routes())
        .merge(api::health_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

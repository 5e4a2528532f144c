//! HTTP boundary: router wiring, shared state, and the serve loop.
//!
//! The server is a thin shell over [`crate::pipeline`] and
//! [`crate::analysis`]; endpoints map one-to-one onto library operations and
//! every response uses the [`response::ApiResponse`] envelope.

pub mod handlers;
pub mod response;

use crate::analysis::AnalysisGateway;
use crate::error::ScanError;
use crate::pipeline::document::DocumentPipeline;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared per-process state: one pipeline, one gateway.
pub struct AppState {
    pub pipeline: DocumentPipeline,
    pub gateway: AnalysisGateway,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    // Body limit sits above the per-file maximum so the size policy in the
    // pipeline produces the envelope error; only grossly oversized requests
    // hit axum's own 413.
    let body_limit = (state.pipeline.config().max_file_size as usize).saturating_mul(2);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/upload", post(handlers::upload))
        .route("/api/batch-upload", post(handlers::batch_upload))
        .route("/api/analysis-types", get(handlers::analysis_types))
        .route("/api/ai-analysis", post(handlers::ai_analysis))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(addr: SocketAddr, state: Arc<AppState>) -> Result<(), ScanError> {
    let app = router(state);
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ScanError::Internal(format!("failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ScanError::Internal(format!("server error: {}", e)))
}

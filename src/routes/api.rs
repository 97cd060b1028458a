use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{latest, speak};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tts", post(speak::tts_handler))
        .route("/latest", get(latest::latest_handler))
        .layer(TraceLayer::new_for_http())
}

pub mod content;
pub mod session;

use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "folio-publisher" }))
        .route(
            "/api/session",
            get(session::session_status).delete(session::logout),
        )
        .route("/api/session/key", post(session::import_key))
        .route("/api/content/about", put(content::put_about))
        .route("/api/content/schedule", put(content::put_schedule))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use crate::app_state::AppState;
use crate::content::{AboutPage, ContentDocument, Schedule};
use crate::error::PublishError;
use crate::publisher::PublishReceipt;

pub async fn put_about(
    State(state): State<Arc<AppState>>,
    Json(page): Json<AboutPage>,
) -> Result<Json<PublishReceipt>, PublishError> {
    publish(&state, ContentDocument::About(page)).await
}

pub async fn put_schedule(
    State(state): State<Arc<AppState>>,
    Json(schedule): Json<Schedule>,
) -> Result<Json<PublishReceipt>, PublishError> {
    publish(&state, ContentDocument::Schedule(schedule)).await
}

async fn publish(
    state: &AppState,
    document: ContentDocument,
) -> Result<Json<PublishReceipt>, PublishError> {
    let _saving = state.saving.begin(document.kind())?;

    match state.publisher.publish(&state.session, &document).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(PublishError::MissingCredential) => {
            info!(kind = %document.kind(), "No key loaded, holding save until one is imported");
            state.session.stash_pending(document).await;
            Err(PublishError::MissingCredential)
        }
        Err(e) => Err(e),
    }
}

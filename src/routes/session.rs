use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::PublishError;
use crate::publisher::PublishReceipt;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    is_auth: bool,
    has_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<PublishReceipt>,
}

pub async fn session_status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(SessionStatus {
        is_auth: state.session.is_auth().await,
        has_pending: state.session.has_pending().await,
        published: None,
    })
}

// A save that was waiting on a key is published once; on failure it stays pending.
pub async fn import_key(
    State(state): State<Arc<AppState>>,
    pem: String,
) -> Result<Json<SessionStatus>, PublishError> {
    if !state.session.set_private_key(&pem).await {
        return Err(PublishError::InvalidKeyFormat("the .pem file is empty".into()));
    }

    let Some(document) = state.session.take_pending().await else {
        return Ok(Json(SessionStatus {
            is_auth: true,
            has_pending: false,
            published: None,
        }));
    };

    let _saving = match state.saving.begin(document.kind()) {
        Ok(guard) => guard,
        Err(e) => {
            state.session.stash_pending(document).await;
            return Err(e);
        }
    };

    info!(kind = %document.kind(), "Publishing save that was waiting on a key");
    match state.publisher.publish(&state.session, &document).await {
        Ok(receipt) => Ok(Json(SessionStatus {
            is_auth: state.session.is_auth().await,
            has_pending: false,
            published: Some(receipt),
        })),
        Err(e) => {
            warn!(%e, "Pending publish failed, keeping it for the next attempt");
            state.session.stash_pending(document).await;
            Err(e)
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.logout().await;
    StatusCode::NO_CONTENT
}

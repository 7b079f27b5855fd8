use anyhow::{Context, Result};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::config::Config;
use crate::content::ContentKind;
use crate::error::PublishError;
use crate::github::GitHubClient;
use crate::publisher::Publisher;
use crate::session::Session;

pub struct AppState {
    pub publisher: Publisher,
    pub session: Session,
    pub saving: SaveGuards,
}

/// One save at a time per content kind, like the editor pages' save button.
/// Saves of different kinds run side by side.
#[derive(Default)]
pub struct SaveGuards {
    about: Mutex<()>,
    schedule: Mutex<()>,
}

impl SaveGuards {
    pub fn begin(&self, kind: ContentKind) -> Result<MutexGuard<'_, ()>, PublishError> {
        let lock = match kind {
            ContentKind::About => &self.about,
            ContentKind::Schedule => &self.schedule,
        };
        lock.try_lock().map_err(|_| PublishError::PublishInProgress)
    }
}

pub async fn build_app_state(config: &Config) -> Result<AppState> {
    let github = GitHubClient::new(&config.api_url, config.max_retries);
    let session = Session::new(config.session_ttl);

    if let Some(path) = &config.private_key_path {
        let private_key = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read private key from {}", path.display()))?;
        session.set_private_key(&private_key).await;
        info!(path = %path.display(), "Preloaded private key");
    }

    Ok(AppState {
        publisher: Publisher::new(config, github),
        session,
        saving: SaveGuards::default(),
    })
}

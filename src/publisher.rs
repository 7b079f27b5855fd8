use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::content::{ContentDocument, ContentKind};
use crate::error::PublishError;
use crate::github::{sign_app_jwt, GitHubClient, InstallationCache};
use crate::session::Session;
use crate::utils::to_base64_utf8;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub path: String,
    pub created: bool,
    /// The committed JSON matches what the remote already held.
    pub unchanged: bool,
    pub commit_sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_sha: Option<String>,
}

/// Every publish signs a new JWT, mints a new installation token and re-reads
/// the target file's sha right before writing. A sha mismatch comes back as
/// [`PublishError::Conflict`] and is never retried here.
pub struct Publisher {
    github: GitHubClient,
    installations: InstallationCache,
    app_id: String,
    owner: String,
    repo: String,
    branch: String,
    about_path: String,
    schedule_path: String,
}

impl Publisher {
    pub fn new(config: &Config, github: GitHubClient) -> Self {
        Self {
            github,
            installations: InstallationCache::new(config.installation_cache_ttl),
            app_id: config.app_id.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            about_path: config.about_path.clone(),
            schedule_path: config.schedule_path.clone(),
        }
    }

    pub fn path_for(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::About => &self.about_path,
            ContentKind::Schedule => &self.schedule_path,
        }
    }

    pub async fn publish(
        &self,
        session: &Session,
        document: &ContentDocument,
    ) -> Result<PublishReceipt, PublishError> {
        let kind = document.kind();
        let prepared = document.prepare()?;
        let key = session.private_key().await?;

        let jwt = sign_app_jwt(&self.app_id, key.expose_secret())?;
        let installation_id = self.resolve_installation(&jwt).await?;

        let token = match self
            .github
            .create_installation_token(&jwt, installation_id)
            .await
        {
            Ok(token) => token,
            Err(e) => {
                if matches!(e, PublishError::NotFound(_)) {
                    self.installations
                        .invalidate(&self.app_id, &self.owner, &self.repo)
                        .await;
                }
                return Err(e);
            }
        };
        debug!(installation_id, expires_at = %token.expires_at, "Minted installation token");

        let json = prepared.to_canonical_json()?;
        let encoded = to_base64_utf8(&json);
        let path = self.path_for(kind);

        let existing = self
            .github
            .get_file(&token.token, &self.owner, &self.repo, path, &self.branch)
            .await?;
        let unchanged =
            existing.as_ref().and_then(|f| f.decoded_content()).as_deref() == Some(json.as_str());
        let sha = existing.map(|f| f.sha);

        let response = self
            .github
            .put_file(
                &token.token,
                &self.owner,
                &self.repo,
                path,
                &encoded,
                kind.commit_message(),
                &self.branch,
                sha.as_deref(),
            )
            .await
            .inspect_err(|e| warn!(%e, %kind, path, "Publish failed"))?;

        let created = sha.is_none();
        info!(
            %kind,
            path,
            created,
            unchanged,
            commit = %response.commit.sha,
            "Published content"
        );

        Ok(PublishReceipt {
            path: path.to_string(),
            created,
            unchanged,
            commit_sha: response.commit.sha,
            commit_url: response.commit.html_url,
            content_sha: response.content.map(|c| c.sha),
        })
    }

    async fn resolve_installation(&self, jwt: &str) -> Result<u64, PublishError> {
        if let Some(id) = self
            .installations
            .get(&self.app_id, &self.owner, &self.repo)
            .await
        {
            debug!(installation_id = id, "Using cached installation");
            return Ok(id);
        }

        match self
            .github
            .get_installation_id(jwt, &self.owner, &self.repo)
            .await
        {
            Ok(id) => {
                info!(installation_id = id, owner = %self.owner, repo = %self.repo, "Resolved installation");
                self.installations
                    .insert(&self.app_id, &self.owner, &self.repo, id)
                    .await;
                Ok(id)
            }
            Err(e) => {
                if matches!(e, PublishError::NotFound(_)) {
                    warn!(owner = %self.owner, repo = %self.repo, "GitHub App is not installed on the repository");
                }
                Err(e)
            }
        }
    }
}

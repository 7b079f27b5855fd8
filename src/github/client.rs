use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::PublishError;
use crate::github::models::{
    ContentsResponse, FileEntry, Installation, InstallationToken, PutFileRequest,
    PutFileResponse,
};

const USER_AGENT: &str = "folio-publisher";
const API_VERSION: &str = "2022-11-28";
const BASE_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    max_retries: u32,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, max_retries: u32) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            max_retries,
        }
    }

    fn request(&self, builder: RequestBuilder, bearer: &str) -> RequestBuilder {
        builder
            .bearer_auth(bearer)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    pub async fn get_installation_id(
        &self,
        jwt: &str,
        owner: &str,
        repo: &str,
    ) -> Result<u64, PublishError> {
        let url = format!("{}/repos/{}/{}/installation", self.api_url, owner, repo);
        let url = url.as_str();

        let installation: Installation = self
            .with_retry("get_installation", PublishError::is_retryable, || async move {
                let res = self.request(self.client.get(url), jwt).send().await?;
                parse_json(res).await
            })
            .await?;

        Ok(installation.id)
    }

    pub async fn create_installation_token(
        &self,
        jwt: &str,
        installation_id: u64,
    ) -> Result<InstallationToken, PublishError> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_url, installation_id
        );
        let url = url.as_str();

        self.with_retry("create_installation_token", PublishError::is_retryable, || async move {
            let res = self.request(self.client.post(url), jwt).send().await?;
            parse_json(res).await
        })
        .await
    }

    // A directory at `path` yields `None` too.
    pub async fn get_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<FileEntry>, PublishError> {
        let url = self.contents_url(owner, repo, path)?;
        let url = &url;

        let contents: Option<ContentsResponse> = self
            .with_retry("get_file", PublishError::is_retryable, || async move {
                let res = self
                    .request(self.client.get(url.clone()), token)
                    .query(&[("ref", branch)])
                    .send()
                    .await?;

                if res.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                parse_json(res).await.map(Some)
            })
            .await?;

        match contents {
            Some(ContentsResponse::File(file)) => {
                debug!(path = %file.path, sha = %file.sha, kind = %file.kind, "Found existing file");
                Ok(Some(file))
            }
            Some(ContentsResponse::Directory(entries)) => {
                warn!(path, entries = entries.len(), "Target path is a directory, writing without a sha");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Supplying `sha` makes this an update guarded by that sha; omitting it
    /// makes it a create.
    #[allow(clippy::too_many_arguments)]
    pub async fn put_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        base64_content: &str,
        message: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> Result<PutFileResponse, PublishError> {
        let url = self.contents_url(owner, repo, path)?;
        let body = PutFileRequest {
            message,
            content: base64_content,
            branch,
            sha,
        };
        let (url, body) = (&url, &body);

        self.with_retry("put_file", PublishError::is_connect_failure, || async move {
            let res = self
                .request(self.client.put(url.clone()), token)
                .json(body)
                .send()
                .await?;
            parse_json(res).await
        })
        .await
        .map_err(|e| match e {
            // Someone created the file after our read came back empty.
            PublishError::Validation(body) if sha.is_none() && body.contains("sha") => {
                PublishError::Conflict(body)
            }
            e => e,
        })
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Result<Url, PublishError> {
        let invalid =
            || PublishError::Validation(format!("invalid GitHub API URL: {}", self.api_url));

        let mut url = Url::parse(&self.api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    async fn with_retry<T, F, Fut>(
        &self,
        operation: &str,
        should_retry: fn(&PublishError) -> bool,
        mut attempt: F,
    ) -> Result<T, PublishError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PublishError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(e) if retries < self.max_retries && should_retry(&e) => {
                    let delay = BASE_BACKOFF * 2u32.pow(retries);
                    retries += 1;
                    warn!(%e, operation, retries, ?delay, "Transient GitHub failure, retrying");
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

async fn parse_json<T: DeserializeOwned>(res: Response) -> Result<T, PublishError> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        return Err(PublishError::from_status(status, text));
    }

    serde_json::from_str(&text).map_err(|e| PublishError::Decode(e.to_string()))
}

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::{Config, DEFAULT_ABOUT_PATH, DEFAULT_SCHEDULE_PATH};
use crate::utils::{from_base64_utf8, to_base64_utf8};

pub const TEST_PRIVATE_KEY: &str = include_str!("../../fixtures/test_app_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../../fixtures/test_app_key.pub.pem");

const INSTALLATION_ID: u64 = 4242;
const INSTALLATION_TOKEN: &str = "ghs_fake_installation_token";

pub fn test_config(api_url: String) -> Config {
    Config {
        app_id: "123456".into(),
        owner: "someone".into(),
        repo: "blog".into(),
        branch: "main".into(),
        api_url,
        bind_addr: "127.0.0.1:0".into(),
        private_key_path: None,
        max_retries: 0,
        installation_cache_ttl: Duration::ZERO,
        session_ttl: Duration::ZERO,
        about_path: DEFAULT_ABOUT_PATH.into(),
        schedule_path: DEFAULT_SCHEDULE_PATH.into(),
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct StoredFile {
    content: String,
    sha: String,
}

#[derive(Default)]
struct FakeState {
    requests: Vec<RecordedRequest>,
    not_installed: bool,
    files: HashMap<String, StoredFile>,
    failures: HashMap<(Method, String), (StatusCode, usize)>,
    write_delay: Option<Duration>,
    commits: u64,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeGitHub {
    addr: SocketAddr,
    state: Shared,
}

impl FakeGitHub {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn installation_id(&self) -> u64 {
        INSTALLATION_ID
    }

    pub fn installation_token(&self) -> &'static str {
        INSTALLATION_TOKEN
    }

    pub fn set_installed(&self, installed: bool) {
        self.state.lock().unwrap().not_installed = !installed;
    }

    /// Answers the next `times` requests matching `method` and `path` with
    /// `status` instead of serving them.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method, path.to_string()), (status, times));
    }

    pub fn delay_writes(&self, delay: Duration) {
        self.state.lock().unwrap().write_delay = Some(delay);
    }

    // As if someone else had committed it.
    pub fn seed_file(&self, path: &str, content: &str) {
        let mut state = self.state.lock().unwrap();
        store(&mut state, path, to_base64_utf8(content));
    }

    pub fn file_sha(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(path).map(|f| f.sha.clone())
    }

    pub fn file_content(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(path)
            .map(|f| from_base64_utf8(&f.content).unwrap())
    }

    pub fn commits(&self) -> u64 {
        self.state.lock().unwrap().commits
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn blob_sha(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:040x}", hasher.finish())
}

fn store(state: &mut FakeState, path: &str, content: String) -> String {
    let sha = blob_sha(&content);
    state.files.insert(
        path.to_string(),
        StoredFile {
            content,
            sha: sha.clone(),
        },
    );
    state.commits += 1;
    sha
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let write_delay = {
        let mut state = state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_string),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_slice(&body).ok(),
        });

        if let Some((status, remaining)) = state.failures.get_mut(&(method.clone(), path.clone())) {
            if *remaining > 0 {
                *remaining -= 1;
                let status = *status;
                return message(status, "injected failure");
            }
        }
        state.write_delay
    };

    if method == Method::PUT {
        if let Some(delay) = write_delay {
            tokio::time::sleep(delay).await;
        }
    }

    let mut state = state.lock().unwrap();

    if path.starts_with("/app/installations/") && path.ends_with("/access_tokens") {
        return Json(json!({
            "token": INSTALLATION_TOKEN,
            "expires_at": "2099-01-01T00:00:00Z",
        }))
        .into_response();
    }

    let Some(rest) = path.strip_prefix("/repos/") else {
        return message(StatusCode::NOT_FOUND, "Not Found");
    };
    let mut parts = rest.splitn(3, '/');
    let (_owner, _repo, tail) = (parts.next(), parts.next(), parts.next().unwrap_or(""));

    if tail == "installation" {
        if state.not_installed {
            return message(StatusCode::NOT_FOUND, "Not Found");
        }
        return Json(json!({ "id": INSTALLATION_ID })).into_response();
    }

    let Some(file_path) = tail.strip_prefix("contents/") else {
        return message(StatusCode::NOT_FOUND, "Not Found");
    };

    match method {
        Method::GET => {
            if let Some(file) = state.files.get(file_path) {
                return Json(json!({
                    "type": "file",
                    "path": file_path,
                    "sha": file.sha,
                    "content": file.content,
                }))
                .into_response();
            }
            let prefix = format!("{}/", file_path);
            let listing: Vec<Value> = state
                .files
                .iter()
                .filter(|(p, _)| p.starts_with(&prefix))
                .map(|(p, f)| json!({ "type": "file", "path": p, "sha": f.sha }))
                .collect();
            if listing.is_empty() {
                message(StatusCode::NOT_FOUND, "Not Found")
            } else {
                Json(Value::Array(listing)).into_response()
            }
        }
        Method::PUT => {
            let Ok(request) = serde_json::from_slice::<Value>(&body) else {
                return message(StatusCode::BAD_REQUEST, "Problems parsing JSON");
            };
            let Some(content) = request["content"].as_str().map(str::to_string) else {
                return message(StatusCode::UNPROCESSABLE_ENTITY, "content is missing");
            };
            let supplied = request["sha"].as_str();

            let existing = state.files.get(file_path).map(|f| f.sha.clone());
            match (existing.as_deref(), supplied) {
                (Some(_), None) => {
                    return message(StatusCode::UNPROCESSABLE_ENTITY, "\"sha\" wasn't supplied.")
                }
                (Some(current), Some(given)) if current != given => {
                    return message(
                        StatusCode::CONFLICT,
                        &format!("{} does not match {}", file_path, given),
                    )
                }
                (None, Some(given)) => {
                    return message(
                        StatusCode::CONFLICT,
                        &format!("{} does not match {}", file_path, given),
                    )
                }
                _ => {}
            }

            let created = existing.is_none();
            let sha = store(&mut state, file_path, content);
            let commit_sha = format!("{:040x}", state.commits);
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };

            (
                status,
                Json(json!({
                    "content": { "type": "file", "path": file_path, "sha": sha },
                    "commit": {
                        "sha": commit_sha,
                        "html_url": format!("https://github.com/commit/{}", commit_sha),
                    },
                })),
            )
                .into_response()
        }
        _ => message(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
    }
}

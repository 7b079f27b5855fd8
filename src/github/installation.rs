use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

type Key = (String, String, String);

/// Installation ids keyed by `(app_id, owner, repo)`. A zero TTL turns the
/// cache off, so every publish resolves the installation afresh.
pub struct InstallationCache {
    ttl: Duration,
    entries: Mutex<HashMap<Key, (u64, Instant)>>,
}

impl InstallationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, app_id: &str, owner: &str, repo: &str) -> Option<u64> {
        if !self.enabled() {
            return None;
        }
        let mut entries = self.entries.lock().await;
        let key = key(app_id, owner, repo);
        match entries.get(&key).copied() {
            Some((id, stored)) if stored.elapsed() < self.ttl => Some(id),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, app_id: &str, owner: &str, repo: &str, id: u64) {
        if self.enabled() {
            self.entries
                .lock()
                .await
                .insert(key(app_id, owner, repo), (id, Instant::now()));
        }
    }

    pub async fn invalidate(&self, app_id: &str, owner: &str, repo: &str) {
        self.entries.lock().await.remove(&key(app_id, owner, repo));
    }
}

fn key(app_id: &str, owner: &str, repo: &str) -> Key {
    (app_id.to_string(), owner.to_string(), repo.to_string())
}

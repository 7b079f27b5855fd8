use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

use crate::content::ContentDocument;
use crate::error::PublishError;

#[derive(Default)]
struct Inner {
    key: Option<SecretString>,
    imported_at: Option<Instant>,
    pending: Option<ContentDocument>,
}

/// Holds the imported PEM in memory only. A bad key surfaces the first time
/// it is used to sign.
pub struct Session {
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl Session {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Inner::default()),
        }
    }

    // An empty `pem` clears the held key.
    pub async fn set_private_key(&self, pem: &str) -> bool {
        let mut inner = self.inner.lock().await;
        if pem.trim().is_empty() {
            inner.key = None;
            inner.imported_at = None;
            info!("Empty private key supplied, credential cleared");
            return false;
        }
        inner.key = Some(SecretString::from(pem.to_string()));
        inner.imported_at = Some(Instant::now());
        info!("Private key imported");
        true
    }

    pub async fn is_auth(&self) -> bool {
        let mut inner = self.inner.lock().await;
        self.expire_if_stale(&mut inner);
        inner.key.is_some()
    }

    pub async fn private_key(&self) -> Result<SecretString, PublishError> {
        let mut inner = self.inner.lock().await;
        self.expire_if_stale(&mut inner);
        inner
            .key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_string()))
            .ok_or(PublishError::MissingCredential)
    }

    pub async fn logout(&self) {
        let mut inner = self.inner.lock().await;
        *inner = Inner::default();
        info!("Session cleared");
    }

    pub async fn stash_pending(&self, document: ContentDocument) {
        self.inner.lock().await.pending = Some(document);
    }

    pub async fn take_pending(&self) -> Option<ContentDocument> {
        self.inner.lock().await.pending.take()
    }

    pub async fn has_pending(&self) -> bool {
        self.inner.lock().await.pending.is_some()
    }

    fn expire_if_stale(&self, inner: &mut Inner) {
        if self.ttl.is_zero() {
            return;
        }
        if let Some(imported_at) = inner.imported_at {
            if imported_at.elapsed() >= self.ttl {
                inner.key = None;
                inner.imported_at = None;
                info!(ttl = ?self.ttl, "Private key expired, credential cleared");
            }
        }
    }
}

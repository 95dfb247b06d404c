use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::console_service::OrderConsole;

#[derive(Clone)]
struct Entry {
    console: OrderConsole,
    // unix seconds, copied from the session token's `exp`
    expires_at: i64,
}

impl Entry {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Console state per admin session, keyed by the session id carried in the
/// session token. Locks are only held for local edits, never across a store
/// call.
///
/// An entry lives no longer than its token: expired entries read as absent
/// and are dropped on the next `open` or `sweep_expired`.
#[derive(Clone, Default)]
pub struct ConsoleSessions {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl ConsoleSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a freshly mounted console, replacing any previous one for the
    /// same session, and evicts every expired entry.
    pub async fn open(&self, session_id: &str, expires_at: i64, console: OrderConsole) {
        let now = now();
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.is_live(now));
        let evicted = before - guard.len();
        if evicted > 0 {
            tracing::debug!(evicted, "expired consoles dropped");
        }
        guard.insert(session_id.to_string(), Entry { console, expires_at });
    }

    pub async fn close(&self, session_id: &str) -> bool {
        self.inner.write().await.remove(session_id).is_some()
    }

    /// Drops every expired entry. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = now();
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.is_live(now));
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn snapshot(&self, session_id: &str) -> Option<OrderConsole> {
        let now = now();
        self.inner
            .read()
            .await
            .get(session_id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.console.clone())
    }

    /// Runs `f` against the session's console. Returns `None` when the session
    /// has no live console.
    pub async fn update<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut OrderConsole) -> R,
    ) -> Option<R> {
        let now = now();
        let mut guard = self.inner.write().await;
        guard
            .get_mut(session_id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| f(&mut entry.console))
    }
}

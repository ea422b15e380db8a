use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

/// Session persistence keyed by an opaque token. Injected into the HTTP layer
/// so deployments can swap the in-memory store for a shared one.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a session and return its token.
    async fn open(&self, user_id: Uuid) -> String;
    /// Look up the user behind a token.
    async fn resolve(&self, token: &str) -> Option<Uuid>;
    /// Drop a session; unknown tokens are a no-op.
    async fn close(&self, token: &str);
}

/// Process-wide store for single-instance deployments.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Uuid>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn open(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.lock().unwrap().insert(token.clone(), user_id);
        token
    }

    async fn resolve(&self, token: &str) -> Option<Uuid> {
        self.sessions.lock().unwrap().get(token).copied()
    }

    async fn close(&self, token: &str) {
        self.sessions.lock().unwrap().remove(token);
    }
}

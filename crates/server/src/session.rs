//! In-memory login sessions.
//!
//! Tokens are opaque UUIDs handed out by `POST /login` and presented back in
//! the `user_token` header. Nothing is persisted: a restart logs everybody
//! out.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Session {
    user_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Opens a session for `user_id`, returning its token and expiry.
    pub async fn open(&self, user_id: &str) -> (Uuid, DateTime<Utc>) {
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + self.ttl;
        self.sessions.write().await.insert(
            token,
            Session {
                user_id: user_id.to_string(),
                expires_at,
            },
        );
        tracing::debug!("session opened for {user_id}");
        (token, expires_at)
    }

    /// The user owning `token`, if the session is still alive.
    ///
    /// An expired session is dropped on the way.
    pub async fn resolve(&self, token: Uuid) -> Option<String> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&token) {
                None => return None,
                Some(session) if session.expires_at > Utc::now() => {
                    return Some(session.user_id.clone());
                }
                Some(_) => {}
            }
        }
        self.sessions.write().await.remove(&token);
        None
    }

    /// Returns whether the token was known.
    pub async fn revoke(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    /// Drops every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }
}

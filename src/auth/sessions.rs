use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix on every issued token, so a leaked value is recognizable in logs
/// and scanners.
pub const TOKEN_PREFIX: &str = "sp_";

const TOKEN_RANDOM_LEN: usize = 32;

/// A server-side login session. The token itself is never stored; only its
/// SHA-256 hash is.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Generate a fresh opaque token and the session record that tracks it.
/// The token goes to the client; the session (with the hash) goes to the store.
pub fn issue_session(user_id: Uuid, ttl: std::time::Duration) -> (String, Session) {
    let random: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(char::from)
        .collect();
    let token = format!("{}{}", TOKEN_PREFIX, random);

    let now = Utc::now();
    let ttl = ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(7));
    let session = Session {
        id: Uuid::new_v4(),
        user_id,
        token_hash: hash_token(&token),
        created_at: now,
        expires_at: now + ttl,
    };

    (token, session)
}

/// SHA-256 hex digest of a token, the at-rest representation.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Storage boundary for sessions, swappable so the backing store can change
/// without touching the auth flow.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, session: Session);

    /// Live session for this token hash. Expired sessions are treated as
    /// absent and dropped.
    async fn get(&self, token_hash: &str) -> Option<Session>;

    /// Remove a session, reporting whether it existed.
    async fn revoke(&self, token_hash: &str) -> bool;
}

/// Default in-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, session: Session) {
        self.sessions.insert(session.token_hash.clone(), session);
    }

    async fn get(&self, token_hash: &str) -> Option<Session> {
        let session = self.sessions.get(token_hash)?.clone();
        if session.is_expired() {
            drop(self.sessions.remove(token_hash));
            return None;
        }
        Some(session)
    }

    async fn revoke(&self, token_hash: &str) -> bool {
        self.sessions.remove(token_hash).is_some()
    }
}

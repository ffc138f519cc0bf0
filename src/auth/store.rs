//! In-memory token store
//!
//! Two maps keyed by session ID: refresh tokens, which live for the whole process,
//! and access tokens, which carry a time-to-live and are evicted once it elapses.
//! Uses DashMap for concurrent access from request handlers.
//!
//! Nothing here is persisted; a restart forgets every installation.

use crate::constants::MAX_ACCESS_TOKEN_TTL_SECS;
use dashmap::DashMap;
use oauth2::{AccessToken, RefreshToken};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedAccessToken {
    token: AccessToken,
    ttl: Duration,
    expires_at: Instant,
}

impl CachedAccessToken {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Token store shared by every request handler
///
/// Cloning is cheap and yields a handle to the same maps.
#[derive(Clone, Default)]
pub struct TokenStore {
    refresh_tokens: Arc<DashMap<String, RefreshToken>>,
    access_tokens: Arc<DashMap<String, CachedAccessToken>>,
}

impl TokenStore {
    /// Create an empty token store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the refresh token for a session, replacing any previous one
    pub fn set_refresh_token(&self, session_id: &str, token: RefreshToken) {
        self.refresh_tokens.insert(session_id.to_string(), token);
    }

    /// Refresh token for a session, if the session ever completed an exchange
    pub fn refresh_token(&self, session_id: &str) -> Option<RefreshToken> {
        self.refresh_tokens.get(session_id).map(|t| t.clone())
    }

    pub fn has_refresh_token(&self, session_id: &str) -> bool {
        self.refresh_tokens.contains_key(session_id)
    }

    /// Cache an access token for `ttl`, replacing any previous one
    ///
    /// A zero TTL stores an entry that is already stale. TTLs above
    /// [`MAX_ACCESS_TOKEN_TTL_SECS`] are clamped so the expiry instant cannot overflow.
    pub fn set_access_token(&self, session_id: &str, token: AccessToken, ttl: Duration) {
        let ttl = ttl.min(Duration::from_secs(MAX_ACCESS_TOKEN_TTL_SECS));
        let entry = CachedAccessToken {
            token,
            ttl,
            expires_at: Instant::now() + ttl,
        };
        self.access_tokens.insert(session_id.to_string(), entry);
    }

    /// Live access token for a session
    ///
    /// An expired entry is removed on the way out.
    pub fn access_token(&self, session_id: &str) -> Option<AccessToken> {
        let now = Instant::now();
        let expired = match self.access_tokens.get(session_id) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.token.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.access_tokens
                .remove_if(session_id, |_, entry| entry.is_expired(now));
        }
        None
    }

    /// TTL the current access token entry was cached with, live or not
    pub fn access_token_ttl(&self, session_id: &str) -> Option<Duration> {
        self.access_tokens.get(session_id).map(|e| e.ttl)
    }

    /// Drop every expired access token, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.access_tokens.len();
        self.access_tokens.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.access_tokens.len())
    }

    /// Forget both tokens of a session
    pub fn remove_session(&self, session_id: &str) {
        self.refresh_tokens.remove(session_id);
        self.access_tokens.remove(session_id);
    }

    /// Number of sessions holding a refresh token
    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.len()
    }

    /// Number of cached access token entries, including stale ones not yet evicted
    pub fn access_token_count(&self) -> usize {
        self.access_tokens.len()
    }

    /// Start the periodic sweep of expired access tokens
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = store.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, "Evicted expired access tokens");
                }
            }
        })
    }
}

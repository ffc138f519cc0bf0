//! Browser sessions
//!
//! Every visitor gets an opaque session ID cookie on first contact. The ID is the
//! only key the token store knows, so it stands in for user identity.
//!
//! Sessions expire after [`SESSION_TTL_SECS`] without a request. A periodic sweep
//! drops them together with their tokens.

use crate::auth::TokenStore;
use crate::constants::{SESSION_COOKIE_NAME, SESSION_TTL_SECS};
use axum::http::request::Parts;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Session issued to a browser
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID
    pub id: String,
    /// When the session lapses unless another request extends it
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Registry of the session IDs this process has issued
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::seconds(SESSION_TTL_SECS))
    }
}

impl SessionStore {
    /// Create a new session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose sessions lapse after `ttl` of inactivity
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a new session
    pub fn create_session(&self) -> Session {
        let session = Session {
            id: generate_session_id(),
            expires_at: Utc::now() + self.ttl,
        };

        self.sessions
            .write()
            .insert(session.id.clone(), session.clone());
        session
    }

    /// Get a live session by ID, extending its lifetime
    pub fn get_session(&self, session_id: &str) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(session_id)?;
        if session.is_expired(now) {
            return None;
        }
        session.expires_at = now + self.ttl;
        Some(session.clone())
    }

    /// Drop every expired session, returning the removed IDs
    pub fn purge_expired(&self) -> Vec<String> {
        let now = Utc::now();
        let mut removed = Vec::new();
        self.sessions.write().retain(|id, session| {
            let expired = session.is_expired(now);
            if expired {
                removed.push(id.clone());
            }
            !expired
        });
        removed
    }

    /// Start the periodic sweep of expired sessions and their tokens
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_sweeper(&self, period: std::time::Duration, tokens: TokenStore) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = store.purge_expired();
                for session_id in &removed {
                    tokens.remove_session(session_id);
                }
                if !removed.is_empty() {
                    tracing::debug!(removed = removed.len(), "Evicted expired sessions");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// Session ID attached to the request by [`session_middleware`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolve the session for every request
///
/// A missing cookie, or one carrying an ID that is unknown or expired, gets a fresh
/// session and a `Set-Cookie` on the response.
pub async fn session_middleware(
    State(store): State<Arc<SessionStore>>,
    mut req: Request,
    next: Next,
) -> Response {
    let known = session_id_from_cookie(req.headers().get(header::COOKIE))
        .and_then(|id| store.get_session(&id));

    let (session_id, issued) = match known {
        Some(session) => (session.id, false),
        None => {
            let session = store.create_session();
            tracing::debug!("Issued new session");
            (session.id, true)
        }
    };

    req.extensions_mut().insert(SessionId(session_id.clone()));
    let mut response = next.run(req).await;

    if issued {
        match HeaderValue::from_str(&set_session_cookie(&session_id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }

    response
}

/// Extract the session ID from a `Cookie` header
pub fn session_id_from_cookie(cookie_header: Option<&HeaderValue>) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    cookie_header?
        .to_str()
        .ok()?
        .split(';')
        .map(|c| c.trim())
        .find_map(|c| c.strip_prefix(prefix.as_str()))
        .filter(|id| !id.is_empty())
        .map(|s| s.to_string())
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<SessionId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session not available in request extensions",
        ))
    }
}

/// Session cookie value; no `Expires`, so it lasts for the browser session
pub fn set_session_cookie(session_id: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE_NAME, session_id
    )
}

/// Generate a secure random session ID (using cryptographically secure RNG)
fn generate_session_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

//! OAuth 2.0 client for HubSpot
//!
//! Drives the token lifecycle for each browser session: trading the authorization
//! code, caching the access token, and refreshing it once the cache entry expires.

use crate::auth::exchange::{ExchangeProof, HttpTokenExchanger, TokenExchanger};
use crate::auth::store::TokenStore;
use crate::config::Config;
use crate::error::ExchangeError;
use crate::Result;
use oauth2::{AccessToken, AuthorizationCode};
use std::sync::Arc;
use url::Url;

/// OAuth client manager for the HubSpot app
///
/// The only writer of the [`TokenStore`]. Cloning yields a handle to the same store.
#[derive(Clone)]
pub struct OAuthClientManager {
    config: Arc<Config>,
    store: TokenStore,
    exchanger: Arc<dyn TokenExchanger>,
}

impl OAuthClientManager {
    /// Create a client manager with a custom exchanger
    pub fn new(config: Arc<Config>, store: TokenStore, exchanger: Arc<dyn TokenExchanger>) -> Self {
        Self {
            config,
            store,
            exchanger,
        }
    }

    /// Create a client manager that talks to the configured token endpoint over HTTP
    pub fn from_config(config: Arc<Config>, store: TokenStore) -> Result<Self> {
        let exchanger = HttpTokenExchanger::new(config.token_url.clone())?;
        Ok(Self::new(config, store, Arc::new(exchanger)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// URL of the HubSpot consent screen for this app
    pub fn authorization_url(&self) -> Url {
        let mut url = self.config.auth_url.url().clone();
        let query = format!(
            "client_id={}&scope={}&redirect_uri={}",
            urlencoding::encode(self.config.client_id.as_str()),
            urlencoding::encode(&self.config.scope_string()),
            urlencoding::encode(self.config.redirect_url.as_str()),
        );
        url.set_query(Some(&query));
        url
    }

    /// Run one exchange and record its tokens for the session
    ///
    /// On success the refresh token (when the provider sends one) replaces the stored
    /// one and the access token is cached for 75% of its declared lifetime. On failure
    /// the store is left untouched.
    pub async fn exchange_for_tokens(
        &self,
        session_id: &str,
        proof: ExchangeProof,
    ) -> std::result::Result<AccessToken, ExchangeError> {
        let grant_type = proof.grant_type;
        let tokens = match self.exchanger.exchange(&proof).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!(
                    grant_type = %grant_type,
                    status = ?e.status,
                    "Error exchanging {} for access token: {}",
                    grant_type,
                    e
                );
                return Err(e);
            }
        };

        let ttl = tokens.cache_ttl();
        match tokens.refresh_token {
            Some(refresh_token) => self.store.set_refresh_token(session_id, refresh_token),
            None => tracing::warn!(
                grant_type = %grant_type,
                "Token response carried no refresh token; keeping the stored one"
            ),
        }
        self.store
            .set_access_token(session_id, tokens.access_token.clone(), ttl);

        tracing::info!(
            grant_type = %grant_type,
            cache_ttl_secs = ttl.as_secs(),
            "Token exchange succeeded"
        );

        Ok(tokens.access_token)
    }

    /// Trade an authorization code from the callback for tokens
    pub async fn exchange_code(
        &self,
        session_id: &str,
        code: &str,
    ) -> std::result::Result<AccessToken, ExchangeError> {
        let proof =
            ExchangeProof::authorization_code(&self.config, AuthorizationCode::new(code.to_string()));
        self.exchange_for_tokens(session_id, proof).await
    }

    /// Trade the stored refresh token for a new access token
    ///
    /// Without a stored refresh token the request still goes out and the provider's
    /// rejection is returned.
    pub async fn refresh_access_token(
        &self,
        session_id: &str,
    ) -> std::result::Result<AccessToken, ExchangeError> {
        let proof = ExchangeProof::refresh_token(&self.config, self.store.refresh_token(session_id));
        self.exchange_for_tokens(session_id, proof).await
    }

    /// Get a live access token for the session, refreshing it if the cache is empty
    ///
    /// Returns `None` if the refresh failed; the failure is only logged.
    pub async fn get_access_token(&self, session_id: &str) -> Option<AccessToken> {
        if self.store.access_token(session_id).is_none() {
            tracing::info!("Refreshing expired access token");
            if let Err(e) = self.refresh_access_token(session_id).await {
                tracing::warn!("Failed to refresh access token: {}", e);
            }
        }
        self.store.access_token(session_id)
    }

    /// Whether the session has completed installation (holds a refresh token)
    pub fn is_authorized(&self, session_id: &str) -> bool {
        self.store.has_refresh_token(session_id)
    }
}

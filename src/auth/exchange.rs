//! Token endpoint exchanges
//!
//! Both OAuth 2.0 grants this app uses (`authorization_code` and `refresh_token`)
//! are a single form-encoded POST to the HubSpot token endpoint. The transport sits
//! behind [`TokenExchanger`] so the token lifecycle can run against a fake.

use crate::config::Config;
use crate::constants::ACCESS_TOKEN_TTL_FRACTION;
use crate::error::ExchangeError;
use crate::Result;
use async_trait::async_trait;
use oauth2::{
    AccessToken, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, RefreshToken, TokenUrl,
};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// OAuth 2.0 grant submitted to the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload for one token exchange
///
/// Built fresh for every exchange and never stored.
#[derive(Debug, Clone)]
pub struct ExchangeProof {
    pub grant_type: GrantType,
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub redirect_uri: RedirectUrl,
    pub code: Option<AuthorizationCode>,
    pub refresh_token: Option<RefreshToken>,
}

impl ExchangeProof {
    /// Proof for trading an authorization code
    pub fn authorization_code(config: &Config, code: AuthorizationCode) -> Self {
        Self {
            grant_type: GrantType::AuthorizationCode,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_url.clone(),
            code: Some(code),
            refresh_token: None,
        }
    }

    /// Proof for trading a refresh token
    ///
    /// `None` is allowed: the field is then left out of the form and the provider
    /// rejects the request.
    pub fn refresh_token(config: &Config, refresh_token: Option<RefreshToken>) -> Self {
        Self {
            grant_type: GrantType::RefreshToken,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_url.clone(),
            code: None,
            refresh_token,
        }
    }

    /// Form fields, secrets included. Never log the result.
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![
            ("grant_type", self.grant_type.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.secret().as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        if let Some(code) = &self.code {
            params.push(("code", code.secret().as_str()));
        }
        if let Some(refresh_token) = &self.refresh_token {
            params.push(("refresh_token", refresh_token.secret().as_str()));
        }
        params
    }
}

/// Successful token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: AccessToken,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    /// Provider-declared access token lifetime, in seconds
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenSet {
    /// How long the access token stays cached: 75% of the declared lifetime,
    /// rounded to the nearest second
    pub fn cache_ttl(&self) -> Duration {
        access_token_cache_ttl(self.expires_in)
    }
}

/// Cache TTL for a provider-declared lifetime of `expires_in` seconds
pub fn access_token_cache_ttl(expires_in: u64) -> Duration {
    Duration::from_secs((expires_in as f64 * ACCESS_TOKEN_TTL_FRACTION).round() as u64)
}

/// Transport for token endpoint exchanges
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Submit one proof to the token endpoint
    async fn exchange(&self, proof: &ExchangeProof) -> std::result::Result<TokenSet, ExchangeError>;
}

/// Token exchanger that posts to the HubSpot token endpoint over HTTP
#[derive(Clone)]
pub struct HttpTokenExchanger {
    token_url: TokenUrl,
    http_client: reqwest::Client,
}

impl HttpTokenExchanger {
    pub fn new(token_url: TokenUrl) -> Result<Self> {
        // Redirects are never followed on the token endpoint
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            token_url,
            http_client,
        })
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(&self, proof: &ExchangeProof) -> std::result::Result<TokenSet, ExchangeError> {
        let response = self
            .http_client
            .post(self.token_url.url().clone())
            .form(&proof.form_params())
            .send()
            .await
            .map_err(ExchangeError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ExchangeError::transport)?;

        if !status.is_success() {
            return Err(ExchangeError::rejected(status.as_u16(), &body));
        }

        serde_json::from_str::<TokenSet>(&body).map_err(ExchangeError::invalid_response)
    }
}

//! Configuration management for the quickstart
//!
//! Everything comes from the environment (a `.env` file is loaded by `main` first).
//! `CLIENT_ID` and `CLIENT_SECRET` are required; the process refuses to start without them.

use crate::constants::*;
use crate::{QuickstartError, Result};
use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, Scope, TokenUrl};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Separators accepted in the `SCOPE` variable: space, comma (optionally followed by a
/// space), or a literal `%20`
static SCOPE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r" |, ?|%20").unwrap());

/// Complete quickstart configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HubSpot app client ID
    pub client_id: ClientId,

    /// HubSpot app client secret (redacted in `Debug`)
    pub client_secret: ClientSecret,

    /// Scopes requested on the consent screen
    pub scopes: Vec<Scope>,

    /// Local listening port
    pub port: u16,

    /// Where HubSpot sends the user back to; must match the app settings
    pub redirect_url: RedirectUrl,

    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub api_base_url: Url,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env(port: u16) -> Result<Self> {
        Self::from_lookup(port, |key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(port: u16, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (Some(client_id), Some(client_secret)) = (get(ENV_CLIENT_ID), get(ENV_CLIENT_SECRET))
        else {
            return Err(QuickstartError::config(format!(
                "Missing {} or {} environment variable",
                ENV_CLIENT_ID, ENV_CLIENT_SECRET
            )));
        };

        let scopes = match get(ENV_SCOPE) {
            Some(raw) => parse_scopes(&raw),
            None => vec![Scope::new(DEFAULT_SCOPE.to_string())],
        };
        if scopes.is_empty() {
            return Err(QuickstartError::config(format!(
                "{} does not contain any scope",
                ENV_SCOPE
            )));
        }

        let auth_url = get(ENV_AUTH_URL).unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let token_url = get(ENV_TOKEN_URL).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());
        let api_base_url =
            get(ENV_API_BASE_URL).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            scopes,
            port,
            redirect_url: RedirectUrl::new(redirect_uri_for_port(port)).map_err(|e| {
                QuickstartError::config(format!("Invalid redirect URI: {}", e))
            })?,
            auth_url: AuthUrl::new(auth_url)
                .map_err(|e| QuickstartError::config(format!("Invalid auth URL: {}", e)))?,
            token_url: TokenUrl::new(token_url)
                .map_err(|e| QuickstartError::config(format!("Invalid token URL: {}", e)))?,
            api_base_url: Url::parse(&api_base_url)
                .map_err(|e| QuickstartError::config(format!("Invalid API base URL: {}", e)))?,
        })
    }

    /// Scopes as the single space-delimited string HubSpot expects
    pub fn scope_string(&self) -> String {
        self.scopes
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Local URL of the home page
    pub fn app_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Split a `SCOPE` value into individual scopes, dropping empty items
pub fn parse_scopes(raw: &str) -> Vec<Scope> {
    SCOPE_SEPARATOR
        .split(raw.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Scope::new(s.to_string()))
        .collect()
}

/// Redirect URI for a local listening port
pub fn redirect_uri_for_port(port: u16) -> String {
    format!("http://localhost:{}{}", port, CALLBACK_PATH)
}

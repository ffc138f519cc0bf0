//! Test doubles for the token lifecycle

use crate::auth::exchange::{ExchangeProof, GrantType, TokenExchanger, TokenSet};
use crate::config::Config;
use crate::error::ExchangeError;
use async_trait::async_trait;
use oauth2::{AccessToken, RefreshToken};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Exchanger that replays scripted responses and records every proof it receives
///
/// Once the script runs out, every further exchange fails with "no scripted response".
#[derive(Default)]
pub struct ScriptedExchanger {
    responses: Mutex<VecDeque<Result<TokenSet, ExchangeError>>>,
    calls: AtomicUsize,
    grants: Mutex<Vec<GrantType>>,
    refresh_tokens_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedExchanger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_tokens(&self, access: &str, refresh: Option<&str>, expires_in: u64) {
        self.responses.lock().push_back(Ok(token_set(access, refresh, expires_in)));
    }

    pub fn push_error(&self, status: u16, message: &str) {
        self.responses.lock().push_back(Err(ExchangeError {
            status: Some(status),
            message: message.to_string(),
        }));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn grants(&self) -> Vec<GrantType> {
        self.grants.lock().clone()
    }

    pub fn refresh_tokens_seen(&self) -> Vec<Option<String>> {
        self.refresh_tokens_seen.lock().clone()
    }
}

#[async_trait]
impl TokenExchanger for ScriptedExchanger {
    async fn exchange(&self, proof: &ExchangeProof) -> Result<TokenSet, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.grants.lock().push(proof.grant_type);
        self.refresh_tokens_seen
            .lock()
            .push(proof.refresh_token.as_ref().map(|t| t.secret().clone()));

        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(ExchangeError {
                status: None,
                message: "no scripted response".to_string(),
            })
        })
    }
}

pub fn token_set(access: &str, refresh: Option<&str>, expires_in: u64) -> TokenSet {
    TokenSet {
        access_token: AccessToken::new(access.to_string()),
        refresh_token: refresh.map(|r| RefreshToken::new(r.to_string())),
        expires_in,
        token_type: Some("bearer".to_string()),
    }
}

/// Config pointing every endpoint at `base_url`
pub fn test_config(base_url: &str) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("CLIENT_ID", "test-client".to_string()),
        ("CLIENT_SECRET", "test-secret".to_string()),
        ("HUBSPOT_AUTH_URL", format!("{}/oauth/authorize", base_url)),
        ("HUBSPOT_TOKEN_URL", format!("{}/oauth/v1/token", base_url)),
        ("HUBSPOT_API_BASE", base_url.to_string()),
    ]);
    Config::from_lookup(3000, |key| vars.get(key).cloned()).unwrap()
}

//! OAuth 2.0 authorization-code flow against HubSpot
//!
//! - **Store**: per-session refresh tokens and TTL-bound access tokens
//! - **Exchange**: the form-encoded token endpoint calls for both grant types
//! - **Client**: the token lifecycle built on the two (exchange, cache, refresh)

pub mod client;
pub mod exchange;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use client::OAuthClientManager;
pub use exchange::{
    ExchangeProof, GrantType, HttpTokenExchanger, TokenExchanger, TokenSet,
    access_token_cache_ttl,
};
pub use store::TokenStore;

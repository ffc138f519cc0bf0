
use super::*;
use std::collections::HashMap;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(token_url: &str) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("CLIENT_ID", "test-client".to_string()),
        ("CLIENT_SECRET", "test-secret".to_string()),
        ("HUBSPOT_TOKEN_URL", token_url.to_string()),
    ]);
    Config::from_lookup(3000, |key| vars.get(key).cloned()).unwrap()
}

fn code_proof(config: &Config) -> ExchangeProof {
    ExchangeProof::authorization_code(config, AuthorizationCode::new("auth-code-1".to_string()))
}

#[test]
fn test_cache_ttl_is_three_quarters_of_lifetime() {
    assert_eq!(access_token_cache_ttl(3600), Duration::from_secs(2700));
    assert_eq!(access_token_cache_ttl(1800), Duration::from_secs(1350));
}

#[test]
fn test_cache_ttl_rounds_to_nearest_second() {
    // 0.75 -> 1, 1.5 -> 2, 2.25 -> 2
    assert_eq!(access_token_cache_ttl(1), Duration::from_secs(1));
    assert_eq!(access_token_cache_ttl(2), Duration::from_secs(2));
    assert_eq!(access_token_cache_ttl(3), Duration::from_secs(2));
    assert_eq!(access_token_cache_ttl(0), Duration::ZERO);
}

#[test]
fn test_authorization_code_form_params() {
    let config = test_config("http://127.0.0.1:1/token");
    let proof = code_proof(&config);
    let params: HashMap<_, _> = proof.form_params().into_iter().collect();

    assert_eq!(params["grant_type"], "authorization_code");
    assert_eq!(params["client_id"], "test-client");
    assert_eq!(params["client_secret"], "test-secret");
    assert_eq!(params["redirect_uri"], "http://localhost:3000/oauth-callback");
    assert_eq!(params["code"], "auth-code-1");
    assert!(!params.contains_key("refresh_token"));
}

#[test]
fn test_refresh_token_form_params() {
    let config = test_config("http://127.0.0.1:1/token");
    let proof = ExchangeProof::refresh_token(
        &config,
        Some(RefreshToken::new("refresh-1".to_string())),
    );
    let params: HashMap<_, _> = proof.form_params().into_iter().collect();

    assert_eq!(params["grant_type"], "refresh_token");
    assert_eq!(params["refresh_token"], "refresh-1");
    assert!(!params.contains_key("code"));
}

#[test]
fn test_refresh_without_stored_token_omits_field() {
    let config = test_config("http://127.0.0.1:1/token");
    let proof = ExchangeProof::refresh_token(&config, None);
    let params: HashMap<_, _> = proof.form_params().into_iter().collect();

    assert_eq!(params["grant_type"], "refresh_token");
    assert!(!params.contains_key("refresh_token"));
}

#[test]
fn test_proof_debug_redacts_secrets() {
    let config = test_config("http://127.0.0.1:1/token");
    let rendered = format!("{:?}", code_proof(&config));
    assert!(!rendered.contains("test-secret"));
    assert!(!rendered.contains("auth-code-1"));
}

#[tokio::test]
async fn test_http_exchange_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .and(body_string_contains("client_secret=test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "bearer",
            "refresh_token": "refresh-1",
            "access_token": "access-1",
            "expires_in": 1800
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/oauth/v1/token", server.uri()));
    let exchanger = HttpTokenExchanger::new(config.token_url.clone()).unwrap();

    let tokens = exchanger.exchange(&code_proof(&config)).await.unwrap();
    assert_eq!(tokens.access_token.secret(), "access-1");
    assert_eq!(tokens.refresh_token.unwrap().secret(), "refresh-1");
    assert_eq!(tokens.expires_in, 1800);
    assert_eq!(tokens.token_type.as_deref(), Some("bearer"));
}

#[tokio::test]
async fn test_http_exchange_provider_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": "BAD_AUTH_CODE",
            "message": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/oauth/v1/token", server.uri()));
    let exchanger = HttpTokenExchanger::new(config.token_url.clone()).unwrap();

    let err = exchanger.exchange(&code_proof(&config)).await.unwrap_err();
    assert_eq!(err.status, Some(400));
    assert_eq!(err.message(), "invalid_grant");
}

#[tokio::test]
async fn test_http_exchange_plain_text_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/oauth/v1/token", server.uri()));
    let exchanger = HttpTokenExchanger::new(config.token_url.clone()).unwrap();

    let err = exchanger.exchange(&code_proof(&config)).await.unwrap_err();
    assert_eq!(err.status, Some(503));
    assert_eq!(err.message(), "upstream unavailable");
}

#[tokio::test]
async fn test_http_exchange_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "refresh_token": "refresh-1"
        })))
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/oauth/v1/token", server.uri()));
    let exchanger = HttpTokenExchanger::new(config.token_url.clone()).unwrap();

    let err = exchanger.exchange(&code_proof(&config)).await.unwrap_err();
    assert!(err.message().starts_with("invalid token response"));
}

#[tokio::test]
async fn test_http_exchange_network_failure() {
    // Nothing listens on port 1
    let config = test_config("http://127.0.0.1:1/oauth/v1/token");
    let exchanger = HttpTokenExchanger::new(config.token_url.clone()).unwrap();

    let err = exchanger.exchange(&code_proof(&config)).await.unwrap_err();
    assert_eq!(err.status, None);
    assert!(!err.message().is_empty());
}

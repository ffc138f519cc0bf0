//! HTTP server for the quickstart
//!
//! Four routes drive the OAuth flow: `/install` sends the browser to HubSpot,
//! `/oauth-callback` trades the returned code, `/` shows the result and `/error`
//! shows what went wrong.

pub mod session;
pub mod template;

use crate::auth::{OAuthClientManager, TokenStore};
use crate::config::Config;
use crate::constants::{CALLBACK_PATH, SESSION_SWEEP_INTERVAL_SECS, TOKEN_SWEEP_INTERVAL_SECS};
use crate::crm::ContactsClient;
use crate::{QuickstartError, Result};
use axum::{
    Router,
    extract::{Json, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use session::{SessionId, SessionStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use template::{ERROR_TEMPLATE, HOME_TEMPLATE, TemplateRenderer};
use tower::ServiceBuilder;
use tower_http::{
    LatencyUnit,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub oauth_client: OAuthClientManager,
    pub contacts: Arc<ContactsClient>,
    pub session_store: Arc<SessionStore>,
    pub template_renderer: Arc<TemplateRenderer>,
}

impl AppState {
    /// Wire up the state for a config, talking to HubSpot over HTTP
    pub fn from_config(config: Config, store: TokenStore) -> Result<Self> {
        let contacts = ContactsClient::new(&config.api_base_url)?;
        let oauth_client = OAuthClientManager::from_config(Arc::new(config), store)?;
        Self::new(oauth_client, contacts)
    }

    pub fn new(oauth_client: OAuthClientManager, contacts: ContactsClient) -> Result<Self> {
        Ok(Self {
            oauth_client,
            contacts: Arc::new(contacts),
            session_store: Arc::new(SessionStore::new()),
            template_renderer: Arc::new(TemplateRenderer::new()?),
        })
    }
}

/// Error type for HTTP handlers
#[derive(Debug)]
pub struct AppError(QuickstartError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Handlers only fail on page rendering; provider failures are shown to the user
        // through the error page or inline instead.
        let error_type = match &self.0 {
            QuickstartError::Template(_) => "template_error",
            _ => "internal_error",
        };
        tracing::error!(error_type, "Request failed: {:?}", self.0);

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = json!({
            "error": {
                "type": error_type,
                "message": "An internal error occurred",
                "status": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<QuickstartError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Start the HTTP server and block until it exits
pub async fn start_server(config: Config, open_browser: bool) -> Result<()> {
    let socket_addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let app_url = config.app_url();

    let store = TokenStore::new();
    let _sweeper = store.spawn_sweeper(Duration::from_secs(TOKEN_SWEEP_INTERVAL_SECS));
    let state = AppState::from_config(config, store.clone())?;
    let _session_sweeper = state
        .session_store
        .spawn_sweeper(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS), store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(socket_addr).await?;
    tracing::info!("=== Starting your app on {} ===", app_url);

    if open_browser {
        let url = app_url.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser at {}: {}", url, e);
            }
        });
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| QuickstartError::config(format!("Server error: {}", e)))?;

    Ok(())
}

/// Build the router with all endpoints
pub fn build_router(state: AppState) -> Router {
    let session_store = state.session_store.clone();

    Router::new()
        .route("/", get(home_handler))
        .route("/install", get(install_handler))
        .route(CALLBACK_PATH, get(oauth_callback_handler))
        .route("/error", get(error_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Request/response logging
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new())
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Micros),
                        ),
                )
                // Every route runs with a session
                .layer(axum::middleware::from_fn_with_state(
                    session_store,
                    session::session_middleware,
                )),
        )
}

/// Target of the redirect to the error page, message percent-encoded
pub fn error_redirect_target(message: &str) -> String {
    format!("/error?msg={}", urlencoding::encode(message))
}

// ============================================================================
// OAUTH FLOW HANDLERS
// ============================================================================

/// Step 1: send the user to the app's HubSpot consent screen
async fn install_handler(State(state): State<AppState>) -> Redirect {
    tracing::info!("=== Initiating OAuth 2.0 flow with HubSpot ===");
    tracing::info!("===> Step 1: Redirecting user to your app's OAuth URL");
    let auth_url = state.oauth_client.authorization_url();
    tracing::info!("===> Step 2: User is being prompted for consent by HubSpot");
    Redirect::to(auth_url.as_str())
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Step 3: HubSpot sends the user back with an authorization code
async fn oauth_callback_handler(
    State(state): State<AppState>,
    session_id: SessionId,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    tracing::info!("===> Step 3: Handling the request sent by the server");

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        let message = params
            .error_description
            .or(params.error)
            .unwrap_or_else(|| "missing authorization code".to_string());
        tracing::warn!("OAuth callback without an authorization code: {}", message);
        return Redirect::to(&error_redirect_target(&message));
    };

    tracing::info!("       > Received an authorization code");
    tracing::info!("===> Step 4: Exchanging authorization code for an access token and refresh token");

    match state
        .oauth_client
        .exchange_code(session_id.as_str(), &code)
        .await
    {
        Ok(_) => Redirect::to("/"),
        Err(e) => Redirect::to(&error_redirect_target(e.message())),
    }
}

// ============================================================================
// PAGES
// ============================================================================

/// Home page: installation link, or the access token and a contact once installed
async fn home_handler(
    State(state): State<AppState>,
    session_id: SessionId,
) -> std::result::Result<Html<String>, AppError> {
    let session_id = session_id.as_str();

    if !state.oauth_client.is_authorized(session_id) {
        let html = state
            .template_renderer
            .render(HOME_TEMPLATE, json!({ "authorized": false }))?;
        return Ok(Html(html));
    }

    let access_token = state.oauth_client.get_access_token(session_id).await;
    let contact = state.contacts.first_contact(access_token.as_ref()).await;

    let ctx = match contact {
        Ok(contact) => json!({
            "authorized": true,
            "access_token": access_token.as_ref().map(|t| t.secret()),
            "contact_name": contact.as_ref().map(|c| c.display_name()),
            "contact": contact,
        }),
        Err(e) => json!({
            "authorized": true,
            "access_token": access_token.as_ref().map(|t| t.secret()),
            "contact_error": e.message(),
        }),
    };

    let html = state.template_renderer.render(HOME_TEMPLATE, ctx)?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
struct ErrorParams {
    #[serde(default)]
    msg: String,
}

async fn error_handler(
    State(state): State<AppState>,
    Query(params): Query<ErrorParams>,
) -> std::result::Result<Html<String>, AppError> {
    let html = state
        .template_renderer
        .render(ERROR_TEMPLATE, json!({ "msg": params.msg }))?;
    Ok(Html(html))
}

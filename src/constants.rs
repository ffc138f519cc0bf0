//! Constants used throughout the quickstart
//!
//! Endpoint defaults, environment variable names, and the fixed values of the
//! OAuth flow (port, callback path, cache timings).

// ============================================================================
// SERVER
// ============================================================================

/// Default listening port; the redirect URI registered with HubSpot uses it
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Path HubSpot redirects back to after the consent screen
pub const CALLBACK_PATH: &str = "/oauth-callback";

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "hubspot_quickstart_session";

// ============================================================================
// HUBSPOT ENDPOINTS
// ============================================================================

/// Authorization (consent) page
pub const DEFAULT_AUTH_URL: &str = "https://app.hubspot.com/oauth/authorize";

/// Token endpoint for both grant types
pub const DEFAULT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";

/// Base URL for CRM API calls
pub const DEFAULT_API_BASE_URL: &str = "https://api.hubapi.com";

/// Contacts listing, relative to the API base
pub const CONTACTS_PATH: &str = "contacts/v1/lists/all/contacts/all";

/// Scope requested when `SCOPE` is not set
pub const DEFAULT_SCOPE: &str = "crm.objects.contacts.read";

// ============================================================================
// ENVIRONMENT VARIABLES
// ============================================================================

pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const ENV_SCOPE: &str = "SCOPE";
pub const ENV_AUTH_URL: &str = "HUBSPOT_AUTH_URL";
pub const ENV_TOKEN_URL: &str = "HUBSPOT_TOKEN_URL";
pub const ENV_API_BASE_URL: &str = "HUBSPOT_API_BASE";

// ============================================================================
// TOKEN CACHE
// ============================================================================

/// Fraction of the provider-declared lifetime an access token stays cached
pub const ACCESS_TOKEN_TTL_FRACTION: f64 = 0.75;

/// Upper bound on how long an access token stays cached, whatever the provider declares
pub const MAX_ACCESS_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Interval of the background sweep that drops expired access tokens
pub const TOKEN_SWEEP_INTERVAL_SECS: u64 = 600;

// ============================================================================
// SESSIONS
// ============================================================================

/// Idle lifetime of a session; each request that presents the cookie extends it
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Interval of the background sweep that drops expired sessions
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 300;

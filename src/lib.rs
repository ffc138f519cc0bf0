//! HubSpot OAuth quickstart
//!
//! A small web app that walks a browser through HubSpot's OAuth 2.0
//! authorization-code flow, keeps the resulting tokens in memory per session and
//! uses them to read one contact from the CRM.
//!
//! # Example
//!
//! ```rust,no_run
//! use hubspot_quickstart::config::Config;
//! use hubspot_quickstart::constants::DEFAULT_HTTP_PORT;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env(DEFAULT_HTTP_PORT)?;
//!     hubspot_quickstart::http::start_server(config, false).await?;
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;

// Token lifecycle
pub mod auth;
pub mod crm;

// Infrastructure
pub mod cli;
pub mod config;
pub mod http;

pub use error::{QuickstartError, Result};

/// Initialize logging for the application
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hubspot_quickstart=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

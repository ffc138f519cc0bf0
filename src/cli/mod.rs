//! Command-line interface for the quickstart
//!
//! There is a single command: start the server. Flags only tune where it listens
//! and whether a browser window opens.

use crate::Result;
use crate::config::Config;
use crate::constants::DEFAULT_HTTP_PORT;
use clap::{Arg, ArgAction, ArgMatches, Command};

/// Options for starting the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    pub port: u16,
    pub open_browser: bool,
}

impl ServeOptions {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            port: matches
                .get_one::<u16>("port")
                .copied()
                .unwrap_or(DEFAULT_HTTP_PORT),
            open_browser: !matches.get_flag("no-browser"),
        }
    }
}

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    let options = ServeOptions::from_matches(&matches);

    // Credentials are checked before anything binds
    let config = Config::from_env(options.port)?;
    crate::http::start_server(config, options.open_browser).await
}

/// Build the command definition
pub fn build_cli() -> Command {
    Command::new("hubspot-quickstart")
        .about("HubSpot OAuth 2.0 quickstart server")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_parser(clap::value_parser!(u16))
                .default_value("3000")
                .help("Port to listen on; also used in the OAuth redirect URI"),
        )
        .arg(
            Arg::new("no-browser")
                .long("no-browser")
                .action(ArgAction::SetTrue)
                .help("Do not open the home page in a browser on startup"),
        )
}

/// Parse options from an explicit argument list
pub fn parse_options<I, T>(args: I) -> std::result::Result<ServeOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args)?;
    Ok(ServeOptions::from_matches(&matches))
}

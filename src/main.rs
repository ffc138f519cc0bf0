//! HubSpot OAuth quickstart server
//!
//! Run with: cargo run -- --port 3000

#[tokio::main]
async fn main() {
    // CLIENT_ID and CLIENT_SECRET usually come from a .env file
    let _ = dotenvy::dotenv();

    hubspot_quickstart::init_logging();

    if let Err(e) = hubspot_quickstart::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

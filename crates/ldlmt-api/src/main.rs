mod config;
mod handlers;
mod setup;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the gate and routes
    let (gate, router) = crate::setup::initialize_app(&config)?;

    // Start the server
    crate::setup::server::start_server(&config, router, gate).await?;

    Ok(())
}

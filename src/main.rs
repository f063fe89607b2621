//! # Chattr Server
//!
//! Real-time activity broadcast and notification fan-out for the Chattr
//! social backend.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Database connection pool
//! - Push provider client
//! - Broadcast hub
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use chattr_server::config::Settings;
use chattr_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: it selects the log format
    let settings = Settings::load()?;

    chattr_server::telemetry::init_tracing(&settings.log_format);

    info!("Starting Chattr Server...");
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    info!("Server stopped");
    Ok(())
}

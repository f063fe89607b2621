//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Flash (broadcast WebSocket) configuration
    pub flash: FlashSettings,

    /// Push notification provider configuration
    pub push: PushSettings,

    /// Log output format ("pretty" or "json")
    pub log_format: String,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens
    pub secret: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Broadcast hub and flash socket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FlashSettings {
    /// Deadline for a single subscriber write before it is dropped
    pub write_timeout_ms: u64,

    /// Capacity of the hub's command inbox
    pub command_buffer: usize,

    /// Maximum inbound frame size; subscribers are not expected to talk
    pub max_message_size: usize,
}

impl FlashSettings {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for FlashSettings {
    fn default() -> Self {
        Self {
            write_timeout_ms: 5000,
            command_buffer: 1024,
            max_message_size: 4096,
        }
    }
}

/// Push notification provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushSettings {
    /// Upper bound for one push send, including token refresh
    pub timeout_ms: u64,

    /// FCM API base URL
    pub endpoint: String,

    /// Service account key as inline JSON (takes precedence over the path)
    pub service_account_json: Option<String>,

    /// Path to a service account key file
    pub service_account_path: Option<String>,
}

impl PushSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Raw service account JSON, if any credentials are configured.
    pub fn load_service_account(&self) -> std::io::Result<Option<String>> {
        if let Some(json) = self.service_account_json.as_ref().filter(|s| !s.trim().is_empty()) {
            return Ok(Some(json.clone()));
        }

        match self.service_account_path.as_ref().filter(|s| !s.trim().is_empty()) {
            Some(path) => std::fs::read_to_string(path).map(Some),
            None => Ok(None),
        }
    }
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("log_format", "pretty")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("flash.write_timeout_ms", 5000_i64)?
            .set_default("flash.command_buffer", 1024_i64)?
            .set_default("flash.max_message_size", 4096_i64)?
            .set_default("push.timeout_ms", 5000_i64)?
            .set_default("push.endpoint", "https://fcm.googleapis.com")?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__FLASH__WRITE_TIMEOUT_MS=2000 -> flash.write_timeout_ms = 2000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "push.service_account_json",
                std::env::var("FIREBASE_SERVICE_ACCOUNT").ok(),
            )?
            .set_override_option(
                "push.service_account_path",
                std::env::var("FIREBASE_SERVICE_ACCOUNT_PATH").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate())
    }

    /// Reject configurations that would run insecurely or never deliver.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }
        if self.flash.write_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "flash.write_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.flash.command_buffer == 0 {
            return Err(ConfigError::Message(
                "flash.command_buffer must be greater than zero".into(),
            ));
        }
        if self.push.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "push.timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

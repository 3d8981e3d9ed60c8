use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Configuration for the ledger service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Progression settings that may vary per deployment
    pub progression: ProgressionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, uses in-memory fallback)
    pub postgres_enabled: bool,
    /// Pool size
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Enable request/response span logging
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Pirate Points a new profile is seeded with
    pub starting_points: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: "postgresql://localhost:5432/pirate_ledger".to_string(),
            postgres_enabled: false,
            max_connections: 10,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8088,
            },
            database: DatabaseConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: false,
            },
            progression: ProgressionConfig { starting_points: 50 },
        }
    }
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl LedgerConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Server configuration
        if let Some(host) = lookup("PIRATE_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("PIRATE_PORT") {
            config.server.port = port.parse().context("Invalid PIRATE_PORT value")?;
        }

        // Database configuration
        if let Some(url) = lookup("PIRATE_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Some(enabled) = lookup("PIRATE_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid PIRATE_POSTGRES_ENABLED value")?;
        }

        if let Some(max) = lookup("PIRATE_POSTGRES_MAX_CONNECTIONS") {
            config.database.max_connections = max
                .parse()
                .context("Invalid PIRATE_POSTGRES_MAX_CONNECTIONS value")?;
        }

        // Logging configuration
        if let Some(level) = lookup("PIRATE_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(log_requests) = lookup("PIRATE_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid PIRATE_LOG_REQUESTS value")?;
        }

        // Progression configuration
        if let Some(points) = lookup("PIRATE_STARTING_POINTS") {
            config.progression.starting_points = points
                .parse()
                .context("Invalid PIRATE_STARTING_POINTS value")?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.progression.starting_points < 0 {
            return Err(anyhow::anyhow!(
                "Starting points must be non-negative, got {}",
                self.progression.starting_points
            ));
        }

        if self.database.postgres_enabled {
            if self.database.postgres_url.is_empty() {
                return Err(anyhow::anyhow!(
                    "PostgreSQL is enabled but PIRATE_POSTGRES_URL is empty"
                ));
            }
            if self.database.max_connections == 0 {
                return Err(anyhow::anyhow!("PostgreSQL pool needs at least one connection"));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            warn!(
                "Unknown log level '{}', falling back to info",
                self.logging.level
            );
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

//! Server configuration for the wiki REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ROOMWIKI_PORT` | 8080 | Server port |
//! | `ROOMWIKI_HOST` | 127.0.0.1 | Host to bind |
//! | `ROOMWIKI_LOG_LEVEL` | info | Log level |
//! | `ROOMWIKI_MAX_BODY_SIZE` | 2097152 | Max request body (bytes) |
//! | `ROOMWIKI_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `ROOMWIKI_ENABLE_CORS` | true | Enable CORS |
//! | `ROOMWIKI_CORS_ORIGINS` | * | Allowed origins |
//! | `ROOMWIKI_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `ROOMWIKI_DATABASE_URL` | - | Database location |
//!
//! # Example
//!
//! ```rust
//! use roomwiki_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     enable_cors: true,
//!     ..Default::default()
//! };
//! ```

use clap::Parser;

/// Server configuration for the wiki REST API.
///
/// This struct can be constructed from environment variables using
/// [`ServerConfig::from_env`], from command line arguments using
/// [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "roomwiki")]
#[command(about = "Multi-tenant wiki server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "ROOMWIKI_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "ROOMWIKI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ROOMWIKI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "ROOMWIKI_MAX_BODY_SIZE", default_value = "2097152")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "ROOMWIKI_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "ROOMWIKI_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "ROOMWIKI_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Base URL for the server (used when rendering shared links).
    #[arg(long, env = "ROOMWIKI_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Database location. A file path for SQLite; a connection string for
    /// PostgreSQL. Omit for an in-memory database.
    #[arg(long, env = "ROOMWIKI_DATABASE_URL")]
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 2 * 1024 * 1024,
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            base_url: "http://localhost:8080".to_string(),
            database_url: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            max_body_size: 2 * 1024 * 1024,
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            base_url: "http://localhost:0".to_string(),
            database_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.enable_cors);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            port: 3000,
            host: "0.0.0.0".to_string(),
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().iter().any(|e| e.contains("Port")));
    }

    #[test]
    fn test_for_testing() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert!(!config.enable_cors);
    }
}

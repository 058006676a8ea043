//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub url: String,
    /// Name of the database holding the book and user collections
    pub name: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(5000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            database: DatabaseConfig::from_env(),
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            name: env::var("DATABASE_NAME").unwrap_or_else(|_| "technet-server-L2".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var("PORT");
        env::remove_var("HOST");
        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_NAME");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "mongodb://localhost:27017");
        assert_eq!(config.database.name, "technet-server-L2");
        assert_eq!(config.server_addr(), "0.0.0.0:5000");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("PORT", "8080");
        env::set_var("HOST", "127.0.0.1");
        env::set_var("DATABASE_URL", "mongodb://db.example.com:27017");
        env::set_var("DATABASE_NAME", "technet-staging");

        let config = Config::from_env();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.url, "mongodb://db.example.com:27017");
        assert_eq!(config.database.name, "technet-staging");
        assert_eq!(config.server_addr(), "127.0.0.1:8080");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_falls_back_to_default() {
        clear_env();
        env::set_var("PORT", "not-a-port");
        let config = Config::from_env();
        assert_eq!(config.server.port, 5000);
        clear_env();
    }
}

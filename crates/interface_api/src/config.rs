//! API configuration

use core_kernel::Timezone;
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// IANA name of the reporting timezone used to derive "today"
    pub timezone: String,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/recovery".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves the reporting timezone, falling back to the default
    pub fn reporting_timezone(&self) -> Timezone {
        Timezone::parse(&self.timezone).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timezone_resolves() {
        let config = ApiConfig::default();
        assert_eq!(config.reporting_timezone(), Timezone::default());
    }

    #[test]
    fn test_unknown_timezone_falls_back() {
        let config = ApiConfig {
            timezone: "Not/AZone".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(config.reporting_timezone(), Timezone::default());
    }
}

//! API configuration

use core_kernel::Timezone;
use infra_db::DatabaseConfig;
use serde::Deserialize;

/// Prefix of every configuration environment variable
pub const ENV_PREFIX: &str = "CASEDB";

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Store location, e.g. `sqlite://police_violations.db`
    pub database_url: String,
    /// Pool size; 1 keeps the process the single writer
    pub max_connections: u32,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// IANA zone whose calendar days bound the daily snapshots
    pub report_timezone: Timezone,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: DatabaseConfig::default().url,
            max_connections: 1,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            log_level: "info".to_string(),
            log_json: false,
            report_timezone: Timezone::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `CASEDB_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Store settings derived from this configuration
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url).max_connections(self.max_connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.report_timezone.name(), "UTC");
        assert_eq!(config.database().max_connections, 1);
    }
}

//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relational store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Booking orchestration tuning.
    #[serde(default)]
    pub booking: BookingConfig,
    /// Tenant-wide overbooking defaults.
    #[serde(default)]
    pub overbooking: OverbookingDefaults,
    /// Night audit settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Relational store configuration.
///
/// When `url` is absent, rooms and categories are served from the document store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as loaded from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Booking orchestration tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// How many times a stay commit is retried after a room version conflict.
    #[serde(default = "default_max_commit_retries")]
    pub max_commit_retries: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: default_max_commit_retries(),
        }
    }
}

fn default_max_commit_retries() -> u32 {
    3
}

/// Tenant-wide overbooking defaults, in whole percent.
#[derive(Debug, Clone, Deserialize)]
pub struct OverbookingDefaults {
    /// Percent at which a warning alert is raised.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u32,
    /// Percent at which a critical alert is raised.
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: u32,
    /// Maximum overbooking percent accepted when overbooking is enabled.
    #[serde(default = "default_max_overbooking")]
    pub max_overbooking_percent: u32,
}

impl Default for OverbookingDefaults {
    fn default() -> Self {
        Self {
            alert_threshold: default_alert_threshold(),
            critical_threshold: default_critical_threshold(),
            max_overbooking_percent: default_max_overbooking(),
        }
    }
}

fn default_alert_threshold() -> u32 {
    5
}

fn default_critical_threshold() -> u32 {
    8
}

fn default_max_overbooking() -> u32 {
    10
}

/// Night audit settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Tolerance for balance checks, in minor currency units.
    #[serde(default = "default_balance_epsilon_minor")]
    pub balance_epsilon_minor: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            balance_epsilon_minor: default_balance_epsilon_minor(),
        }
    }
}

fn default_balance_epsilon_minor() -> u32 {
    1
}

impl AuditConfig {
    /// Returns the balance tolerance as a decimal amount (1 minor unit = 0.01).
    #[must_use]
    pub fn balance_epsilon(&self) -> Decimal {
        Decimal::new(i64::from(self.balance_epsilon_minor), 2)
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("INNKEEP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("INNKEEP__JWT__SECRET", Some("env-secret")),
                ("INNKEEP__SERVER__PORT", Some("9090")),
                ("INNKEEP__BOOKING__MAX_COMMIT_RETRIES", Some("5")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.jwt.secret, "env-secret");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.booking.max_commit_retries, 5);
                assert!(config.database.url.is_none());
            },
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ServerConfig::default().port, 8080);
        assert_eq!(BookingConfig::default().max_commit_retries, 3);

        let overbooking = OverbookingDefaults::default();
        assert_eq!(overbooking.alert_threshold, 5);
        assert_eq!(overbooking.critical_threshold, 8);
        assert_eq!(overbooking.max_overbooking_percent, 10);
    }

    #[test]
    fn test_balance_epsilon() {
        assert_eq!(AuditConfig::default().balance_epsilon(), Decimal::new(1, 2));
    }
}

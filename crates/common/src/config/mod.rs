//! Configuration management for the site backend
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Object storage configuration
    pub storage: StorageConfig,

    /// Outbound mail configuration
    pub mail: MailConfig,

    /// Admin area configuration
    pub admin: AdminConfig,

    /// Rate limiting configuration (public contact API)
    pub rate_limit: RateLimitConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Storage provider base URL, e.g. https://xyz.supabase.co
    pub base_url: String,

    /// Service-role key used for uploads
    pub service_key: String,

    /// Bucket holding report files, covers and contact attachments
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Upload size ceiling in bytes for contact attachments
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,

    /// Request timeout in seconds
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Mail provider API key; notifications are skipped when unset
    pub api_key: Option<String>,

    /// Destination address for contact notifications; skipped when unset
    pub notify_to: Option<String>,

    /// Sender identity
    #[serde(default = "default_mail_from")]
    pub from: String,

    /// Request timeout in seconds
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Admin password; the admin area is unusable when unset
    pub password: Option<String>,

    /// Session cookie name
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Session cookie max-age in seconds
    #[serde(default = "default_session_max_age")]
    pub session_max_age_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Admission window length in seconds
    #[serde(default = "default_window")]
    pub window_secs: u64,

    /// Maximum admitted requests per address per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Interval between stale-bucket sweeps in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable the Prometheus exporter)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_bucket() -> String { "evaluation-files".to_string() }
fn default_max_attachment_bytes() -> u64 { 10 * 1024 * 1024 }
fn default_storage_timeout() -> u64 { 30 }
fn default_mail_from() -> String { "Evalsite <onboarding@resend.dev>".to_string() }
fn default_mail_timeout() -> u64 { 15 }
fn default_session_cookie() -> String { "is_admin".to_string() }
fn default_session_max_age() -> u64 { 60 * 60 * 8 }
fn default_window() -> u64 { 60 }
fn default_max_requests() -> u32 { 5 }
fn default_sweep_interval() -> u64 { 300 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "evalsite".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Get the rate-limit window as Duration
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit.window_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                shutdown_timeout_secs: default_shutdown_timeout(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/evalsite".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            storage: StorageConfig {
                base_url: "http://localhost:54321".to_string(),
                service_key: String::new(),
                bucket: default_bucket(),
                max_attachment_bytes: default_max_attachment_bytes(),
                timeout_secs: default_storage_timeout(),
            },
            mail: MailConfig {
                api_key: None,
                notify_to: None,
                from: default_mail_from(),
                timeout_secs: default_mail_timeout(),
            },
            admin: AdminConfig {
                password: None,
                session_cookie: default_session_cookie(),
                session_max_age_secs: default_session_max_age(),
            },
            rate_limit: RateLimitConfig {
                window_secs: default_window(),
                max_requests: default_max_requests(),
                sweep_interval_secs: default_sweep_interval(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.storage.max_attachment_bytes, 10 * 1024 * 1024);
        assert_eq!(config.admin.session_cookie, "is_admin");
    }

    #[test]
    fn test_window_duration() {
        let config = AppConfig::default();
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
    }
}

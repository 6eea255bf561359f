// Configuration management with layered configuration (file, env)

use crate::dates::MAX_GENERATION_SPAN_DAYS;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub poll_interval_seconds: u64,
    /// IANA name of the zone that decides which calendar day "today" is
    #[serde(default = "default_timezone_name")]
    pub timezone: String,
    /// Recurring tasks are generated for `[today, today + lookahead]`
    #[serde(default)]
    pub recurring_lookahead_days: u32,
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

impl SchedulerConfig {
    pub fn timezone(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| format!("Unknown scheduler timezone: {}", self.timezone))
    }
}

fn default_timezone_name() -> String {
    "UTC".to_string()
}

fn default_run_on_startup() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// Prometheus exporter port of the scheduler daemon
    pub metrics_port: u16,
    /// Prometheus exporter port of the API server
    #[serde(default = "default_api_metrics_port")]
    pub api_metrics_port: u16,
    pub tracing_endpoint: Option<String>,
}

fn default_api_metrics_port() -> u16 {
    9091
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.observability.metrics_port == 0 || self.observability.api_metrics_port == 0 {
            return Err("Metrics ports must be greater than 0".to_string());
        }
        if self.observability.metrics_port == self.observability.api_metrics_port {
            return Err("Scheduler and API metrics ports must differ".to_string());
        }

        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }

        if self.scheduler.poll_interval_seconds == 0 {
            return Err("Scheduler poll_interval_seconds must be greater than 0".to_string());
        }
        self.scheduler.timezone()?;
        if i64::from(self.scheduler.recurring_lookahead_days) > MAX_GENERATION_SPAN_DAYS {
            return Err(format!(
                "Scheduler recurring_lookahead_days must be at most {}",
                MAX_GENERATION_SPAN_DAYS
            ));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/cadence".to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_seconds: 30,
            },
            scheduler: SchedulerConfig {
                poll_interval_seconds: 60,
                timezone: default_timezone_name(),
                recurring_lookahead_days: 7,
                run_on_startup: true,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                metrics_port: 9090,
                api_metrics_port: default_api_metrics_port(),
                tracing_endpoint: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_empty_database_url() {
        let mut settings = Settings::default();
        settings.database.url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_metrics_port() {
        let mut settings = Settings::default();
        settings.observability.metrics_port = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.observability.api_metrics_port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_shared_metrics_port() {
        let mut settings = Settings::default();
        settings.observability.api_metrics_port = settings.observability.metrics_port;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_unknown_timezone() {
        let mut settings = Settings::default();
        settings.scheduler.timezone = "Mars/Olympus_Mons".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_oversized_lookahead() {
        let mut settings = Settings::default();
        settings.scheduler.recurring_lookahead_days = 90;
        assert!(settings.validate().is_ok());
        settings.scheduler.recurring_lookahead_days = 91;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_scheduler_timezone_parses() {
        let mut settings = Settings::default();
        settings.scheduler.timezone = "Asia/Ho_Chi_Minh".to_string();
        assert_eq!(
            settings.scheduler.timezone().unwrap(),
            chrono_tz::Asia::Ho_Chi_Minh
        );
    }
}

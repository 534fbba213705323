use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::Datelike;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub promotion: PromotionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let evaluation_year = match env::var("APP_EVALUATION_YEAR") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<i32>()
                    .map_err(|_| ConfigError::InvalidEvaluationYear(raw.clone()))?,
            ),
            Err(_) => None,
        };

        let max_attempts = env::var("APP_RECALC_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|attempts| *attempts >= 1)
            .ok_or(ConfigError::InvalidRecalcAttempts)?;

        let retry_delay_ms = env::var("APP_RECALC_RETRY_DELAY_MS")
            .unwrap_or_else(|_| "250".to_string())
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidRecalcDelay)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            promotion: PromotionConfig {
                evaluation_year,
                recalc_max_attempts: max_attempts,
                recalc_retry_delay: Duration::from_millis(retry_delay_ms),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Selection year and background recalculation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionConfig {
    pub evaluation_year: Option<i32>,
    pub recalc_max_attempts: u32,
    pub recalc_retry_delay: Duration,
}

impl PromotionConfig {
    /// The pinned evaluation year, or the current calendar year.
    pub fn target_year(&self) -> i32 {
        self.evaluation_year
            .unwrap_or_else(|| chrono::Local::now().date_naive().year())
    }
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            evaluation_year: None,
            recalc_max_attempts: 3,
            recalc_retry_delay: Duration::from_millis(250),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidEvaluationYear(String),
    InvalidRecalcAttempts,
    InvalidRecalcDelay,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidEvaluationYear(raw) => {
                write!(f, "APP_EVALUATION_YEAR must be a calendar year, got '{raw}'")
            }
            ConfigError::InvalidRecalcAttempts => {
                write!(f, "APP_RECALC_MAX_ATTEMPTS must be a positive integer")
            }
            ConfigError::InvalidRecalcDelay => {
                write!(f, "APP_RECALC_RETRY_DELAY_MS must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

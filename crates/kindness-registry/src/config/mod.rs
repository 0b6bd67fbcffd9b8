use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::registry::codec::{DEFAULT_DELIMITER, DEFAULT_FLOORS};
use crate::registry::masking::DEFAULT_MASK;
use crate::registry::{PositionCodec, PrivacyMasker, RegistrySettings};

const POSITION_SEPARATOR: char = ':';

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
    pub registry: RegistryConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            registry: RegistryConfig::from_env()?,
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

/// Position code layout, applicant masking and storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub delimiter: char,
    pub floors: Vec<String>,
    pub mask: char,
    pub database: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            floors: DEFAULT_FLOORS.iter().map(|floor| floor.to_string()).collect(),
            mask: DEFAULT_MASK,
            database: None,
        }
    }
}

impl RegistryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let delimiter = match env::var("REGISTRY_DELIMITER") {
            Ok(raw) => single_char("REGISTRY_DELIMITER", &raw)?,
            Err(_) => defaults.delimiter,
        };
        if delimiter == POSITION_SEPARATOR {
            return Err(ConfigError::DelimiterIsSeparator);
        }

        let floors = match env::var("REGISTRY_FLOORS") {
            Ok(raw) => {
                let floors: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|floor| !floor.is_empty())
                    .map(str::to_string)
                    .collect();
                if floors.is_empty() {
                    return Err(ConfigError::EmptyFloors);
                }
                floors
            }
            Err(_) => defaults.floors,
        };

        let mask = match env::var("REGISTRY_MASK") {
            Ok(raw) => single_char("REGISTRY_MASK", &raw)?,
            Err(_) => defaults.mask,
        };

        let database = env::var("REGISTRY_DATABASE")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            delimiter,
            floors,
            mask,
            database,
        })
    }

    pub fn settings(&self) -> RegistrySettings {
        RegistrySettings {
            codec: PositionCodec::new(self.delimiter, self.floors.clone()),
            masker: PrivacyMasker::new(self.mask),
        }
    }
}

fn single_char(variable: &'static str, raw: &str) -> Result<char, ConfigError> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(ConfigError::NotSingleChar {
            variable,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    NotSingleChar { variable: &'static str, value: String },
    DelimiterIsSeparator,
    EmptyFloors,
    MissingDatabase,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::NotSingleChar { variable, value } => {
                write!(f, "{variable} must be exactly one character, got '{value}'")
            }
            ConfigError::DelimiterIsSeparator => {
                write!(f, "REGISTRY_DELIMITER cannot be ':' (it separates the position)")
            }
            ConfigError::EmptyFloors => {
                write!(f, "REGISTRY_FLOORS must list at least one floor token")
            }
            ConfigError::MissingDatabase => write!(
                f,
                "a database path is required (pass --database or set REGISTRY_DATABASE)"
            ),
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

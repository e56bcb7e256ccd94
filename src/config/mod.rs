//! Simulator process configuration
//!
//! Settings for the hosting process: server bind address, the simulation
//! configuration file to serve, prefetch behavior, and telemetry. Loadable
//! from YAML/TOML/JSON files with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulatorResult};

/// Main process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub server: ServerConfig,
    pub simulation: SimulationConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            simulation: SimulationConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimulatorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimulationError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("YAML parse error: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("TOML parse error: {}", e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("JSON parse error: {}", e)))?,
            _ => {
                return Err(SimulationError::Config(
                    "Unsupported config file format. Use .yaml, .toml, or .json".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Default configuration with environment variable overrides
    pub fn from_env() -> SimulatorResult<Self> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("API_SIMULATOR_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| SimulationError::Config("Invalid port number".to_string()))?;
        }

        if let Ok(host) = std::env::var("API_SIMULATOR_HOST") {
            config.server.host = host;
        }

        if let Ok(path) = std::env::var("API_SIMULATOR_SIMULATION_CONFIG") {
            config.simulation.config_file = Some(PathBuf::from(path));
        }

        if let Ok(val) = std::env::var("API_SIMULATOR_PREFETCH") {
            config.simulation.prefetch_on_startup = val.parse().unwrap_or(true);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimulatorResult<()> {
        self.server.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 300,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.port == 0 {
            return Err(SimulationError::Validation {
                message: "Port cannot be 0".to_string(),
                param: Some("server.port".to_string()),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(SimulationError::Validation {
                message: "request_timeout_secs must be greater than 0".to_string(),
                param: Some("server.request_timeout_secs".to_string()),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> SimulatorResult<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| SimulationError::Config(format!("Invalid bind address {}:{}", self.host, self.port)))
    }
}

/// Simulation configuration source and prefetch behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Path to the simulated-API configuration (JSON or YAML)
    pub config_file: Option<PathBuf>,
    /// Bulk-prefetch external values after startup
    pub prefetch_on_startup: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            prefetch_on_startup: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        Ok(())
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Enable telemetry
    pub enabled: bool,
    /// Log level
    pub log_level: String,
    /// Enable JSON logging
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

//! CLI for the API simulator
//!
//! Subcommands for serving a simulation configuration, validating and
//! inspecting configuration files, and printing version information.

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::VERSION;

/// API Simulator: deterministic RESTful API simulation
#[derive(Parser, Debug)]
#[command(name = "api-simulator")]
#[command(version = VERSION)]
#[command(about = "Simulate a RESTful API from a declarative configuration")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Simulator settings file (YAML, TOML, or JSON)
    #[arg(short, long, global = true, env = "API_SIMULATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "API_SIMULATOR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable JSON log output
    #[arg(long, global = true, env = "API_SIMULATOR_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the simulator server
    #[command(alias = "s")]
    Serve(ServeCommand),

    /// Simulation configuration management
    #[command(alias = "cfg")]
    Config(ConfigCommand),

    /// Show version information
    Version,
}

/// Start the simulator server
#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Simulation configuration file to serve (JSON or YAML)
    #[arg(short, long, env = "API_SIMULATOR_SIMULATION_CONFIG")]
    pub simulation: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "API_SIMULATOR_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "API_SIMULATOR_HOST")]
    pub host: Option<String>,

    /// Skip the startup external value prefetch
    #[arg(long, env = "API_SIMULATOR_NO_PREFETCH")]
    pub no_prefetch: bool,

    /// Request timeout in seconds
    #[arg(long, env = "API_SIMULATOR_TIMEOUT")]
    pub timeout: Option<u64>,
}

/// Simulation configuration management
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate a simulation configuration file
    Validate {
        /// Configuration file to validate
        file: PathBuf,
    },

    /// Load a simulation configuration file and print it back as JSON
    Show {
        /// Configuration file to show
        file: PathBuf,
    },
}

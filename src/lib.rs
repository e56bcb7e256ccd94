//! # API Simulator
//!
//! A deterministic RESTful API simulator: a declarative configuration
//! describes paths, methods, and canned responses, and the engine answers
//! HTTP requests from it, optionally injecting latency and resolving
//! externally-hosted example payloads.
//!
//! ## Features
//!
//! - **Declarative surface**: Path -> Operation -> Response -> Content -> Example
//! - **Deterministic selection**: status override, Accept negotiation, example
//!   selection by name or at random
//! - **Latency injection**: per-operation `[min, max]` delay ranges
//! - **External values**: payloads fetched from remote URLs, cached, and
//!   bulk-prefetched with bounded parallelism
//! - **Hot reload**: atomic snapshot swap, never a half-built index
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use api_simulator::{run_server, SimulatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = SimulatorConfig::default();
//!     config.simulation.config_file = Some("simulation.json".into());
//!     run_server(config).await
//! }
//! ```

pub mod cli;
pub mod config;
pub mod delay;
pub mod error;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod selector;
pub mod server;
pub mod service;
pub mod telemetry;

pub use config::SimulatorConfig;
pub use error::{SimulationError, SimulatorResult};
pub use model::ApiConfiguration;
pub use pipeline::Simulator;
pub use server::run_server;
pub use service::ConfigurationService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

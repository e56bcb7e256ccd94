//! Server state management

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::SimulatorConfig;
use crate::pipeline::Simulator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<Simulator>,
    pub config: Arc<SimulatorConfig>,
    /// Cancelled on process shutdown; fetches in flight observe it
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(simulator: Arc<Simulator>, config: SimulatorConfig) -> Self {
        Self {
            simulator,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }
}

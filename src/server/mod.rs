//! HTTP server implementation
//!
//! Axum transport hosting the simulation pipeline: reserved health/admin
//! routes, a catch-all fallback that simulates everything else, and the
//! usual middleware stack.

mod handlers;
mod state;

pub use handlers::*;
pub use state::*;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::SimulatorConfig;
use crate::error::SimulationError;
use crate::fetch::ExternalValueFetcher;
use crate::pipeline::{Simulator, ADMIN_PREFIX, HEALTH_PATH};
use crate::service::ConfigurationService;

/// Run the simulator server
pub async fn run_server(config: SimulatorConfig) -> anyhow::Result<()> {
    crate::telemetry::init_telemetry(&config.telemetry)?;

    let config_file = config.simulation.config_file.clone().ok_or_else(|| {
        SimulationError::Config("No simulation configuration file given".to_string())
    })?;

    let fetcher = Arc::new(ExternalValueFetcher::new());
    let service = Arc::new(ConfigurationService::from_file(config_file, fetcher)?);
    let simulator = Arc::new(Simulator::new(service.clone()));

    let state = AppState::new(simulator, config.clone());
    let shutdown = state.shutdown.clone();

    let app = create_router(state);

    let addr: SocketAddr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "Starting API Simulator v{} on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );
    info!(paths = service.summary().path_count, "Simulation surface ready");

    // Startup prefetch runs in the background so the server accepts traffic
    // immediately; the pipeline falls back to on-demand fetches meanwhile.
    if config.simulation.prefetch_on_startup {
        let prefetch_service = service.clone();
        let prefetch_shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = prefetch_service.fetch_external_values(&prefetch_shutdown).await {
                tracing::warn!(error = %e, "Startup prefetch did not complete");
            }
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    let mut router = Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .route(&format!("{}/reload", ADMIN_PREFIX), post(handlers::admin_reload))
        .route(&format!("{}/config", ADMIN_PREFIX), get(handlers::admin_config))
        .fallback(handlers::simulate)
        .layer(middleware);

    if config.server.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

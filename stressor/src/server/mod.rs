//! Resource-consuming HTTP server
//!
//! This module provides:
//! - `AppState`, shared by every handler
//! - HTTP routes that allocate memory, burn CPU, sleep, and move bytes
//! - `build_app`, the full router with tracing and CORS layers

mod memory;
pub mod routes;
mod types;
pub mod work;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use memory::{AllocationTracker, memory_report, to_mib};
pub use routes::stress_routes;
pub use types::{ErrorResponse, HealthResponse, MemoryReport, MetricsResponse, ServerError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub allocations: Arc<AllocationTracker>,
    pub prometheus: Option<PrometheusHandle>,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            allocations: Arc::new(AllocationTracker::new()),
            prometheus: None,
            started_at: Instant::now(),
        }
    }

    /// Expose `/metrics/prometheus` through this recorder handle
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

/// Build the application router with all layers applied
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    stress_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

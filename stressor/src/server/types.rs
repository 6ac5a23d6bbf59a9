//! Server error and response types

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while serving a stress request
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid status code {0}")]
    InvalidStatus(u64),

    #[error("fibo({0}) is too large, n must be at most {max}", max = super::work::MAX_FIBO_N)]
    FiboTooLarge(u64),

    #[error("Could not allocate {0} bytes")]
    Allocation(u64),

    #[error("Failed to read upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("Failed to read memory usage: {0}")]
    Memory(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Prometheus recorder not installed")]
    MetricsUnavailable,
}

/// Error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ServerError {
    fn code(&self) -> &'static str {
        match self {
            ServerError::InvalidStatus(_) => "invalid_status",
            ServerError::FiboTooLarge(_) => "fibo_too_large",
            ServerError::Allocation(_) => "allocation_failed",
            ServerError::Upload(_) => "upload_error",
            ServerError::Memory(_) => "memory_error",
            ServerError::Task(_) => "task_error",
            ServerError::MetricsUnavailable => "metrics_unavailable",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidStatus(_) | ServerError::FiboTooLarge(_) => StatusCode::BAD_REQUEST,
            ServerError::Upload(e) => e.status(),
            ServerError::MetricsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Memory(_) | ServerError::Allocation(_) | ServerError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Memory usage snapshot, all values in MiB rounded to two decimals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryReport {
    /// Resident set size of this process
    pub rss: f64,
    /// Virtual memory size of this process
    pub virtual_memory: f64,
    /// Total physical memory of the host
    pub system_total: f64,
    /// Used physical memory of the host
    pub system_used: f64,
}

/// Response for GET /health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Response for GET /metrics
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
    /// Allocations currently held by `/allocate`
    pub live_allocations: u64,
    /// Memory currently held by `/allocate`, in MiB
    pub live_allocated_mb: f64,
}

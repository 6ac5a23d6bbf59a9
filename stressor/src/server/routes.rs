//! HTTP route handlers for the stress API

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};

use super::AppState;
use super::memory::{MIB, hold_allocation, memory_report, random_bytes, to_mib};
use super::types::{HealthResponse, MemoryReport, MetricsResponse, ServerError};
use super::work::{MAX_FIBO_N, burn_sqrt2, fibo};
use crate::params::query_num;

/// Query string as decoded key/value pairs
type Params = Query<HashMap<String, String>>;

/// Log the message and send it as a plain text body
fn reply(status: StatusCode, message: String) -> Response {
    tracing::info!("{}", message);
    (status, message).into_response()
}

fn count_request(route: &'static str) {
    metrics::counter!("stressor_requests_total", "route" => route).increment(1);
}

/// GET /memory - Memory usage of this process and the host
pub async fn get_memory() -> Result<Json<MemoryReport>, ServerError> {
    count_request("memory");
    let report = tokio::task::spawn_blocking(memory_report).await??;
    tracing::info!(
        "memory: rss={}MB virtual={}MB system={}/{}MB",
        report.rss,
        report.virtual_memory,
        report.system_used,
        report.system_total
    );
    Ok(Json(report))
}

/// GET /allocate?mb=&keep= - Hold `mb` MiB for `keep` seconds
///
/// Answers immediately; the memory is allocated and held by a background task.
pub async fn allocate(State(state): State<AppState>, Query(query): Params) -> Response {
    count_request("allocate");
    let mb = query_num(&query, "mb", 32).min(state.config.max_allocate_mb);
    let keep = query_num(&query, "keep", 10);
    let bytes = mb.saturating_mul(MIB);

    tokio::spawn(hold_allocation(
        state.allocations.clone(),
        bytes,
        Duration::from_secs(keep),
    ));

    reply(
        StatusCode::OK,
        format!(
            "allocated {}MB of memory, will be garbage collected in {}s",
            mb, keep
        ),
    )
}

/// GET /sqrt2?n= - Compute sqrt(2) `n` times
pub async fn compute_sqrt2(Query(query): Params) -> Result<Response, ServerError> {
    count_request("sqrt2");
    let n = query_num(&query, "n", 1000 * 1000 * 1000);

    tokio::task::spawn_blocking(move || burn_sqrt2(n)).await?;
    metrics::counter!("stressor_sqrt_iterations_total").increment(n);

    Ok(reply(StatusCode::OK, format!("computed sqrt(2) {} times", n)))
}

/// GET /fibo?n= - Naive recursive Fibonacci
///
/// `n` above [`MAX_FIBO_N`] is rejected: the result no longer fits a `u64`
/// and the recursion depth would exhaust the thread stack.
pub async fn compute_fibo(Query(query): Params) -> Result<Response, ServerError> {
    count_request("fibo");
    let n = query_num(&query, "n", 9);
    if n > MAX_FIBO_N {
        return Err(ServerError::FiboTooLarge(n));
    }

    let value = tokio::task::spawn_blocking(move || fibo(n)).await?;

    Ok(reply(StatusCode::OK, format!("fibo({}) = {}", n, value)))
}

/// GET /status?status= - Answer with an arbitrary status code
///
/// Informational (1xx) codes cannot end an HTTP exchange and are rejected
/// like any other out-of-range value.
pub async fn return_status(Query(query): Params) -> Result<Response, ServerError> {
    count_request("status");
    let status = query_num(&query, "status", 200);

    let code = u16::try_from(status)
        .ok()
        .filter(|code| (200..=999).contains(code))
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or(ServerError::InvalidStatus(status))?;

    Ok(reply(code, format!("response sent with status {}", status)))
}

/// GET /wait?time= - Sleep `time` milliseconds before answering
pub async fn wait(Query(query): Params) -> Response {
    count_request("wait");
    let time = query_num(&query, "time", 1000);

    tokio::time::sleep(Duration::from_millis(time)).await;

    reply(
        StatusCode::OK,
        format!("waited for {}ms before sending the response", time),
    )
}

/// POST /send - Receive a multipart `file` field and report its size
///
/// Requests without a `file` field get an empty 200.
pub async fn receive_data(multipart: Option<Multipart>) -> Result<Response, ServerError> {
    count_request("send");
    let Some(mut multipart) = multipart else {
        return Ok(StatusCode::OK.into_response());
    };

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
        }
        metrics::counter!("stressor_uploaded_bytes_total").increment(size);

        return Ok(reply(
            StatusCode::OK,
            format!("received {}MB of data", to_mib(size)),
        ));
    }

    Ok(StatusCode::OK.into_response())
}

/// GET /generate?mb= - Send `mb` MiB of random bytes
pub async fn generate_data(
    State(state): State<AppState>,
    Query(query): Params,
) -> Result<Response, ServerError> {
    count_request("generate");
    let mb = query_num(&query, "mb", 32).min(state.config.max_generate_mb);
    let bytes = mb.saturating_mul(MIB);

    let data = tokio::task::spawn_blocking(move || random_bytes(bytes)).await??;
    metrics::counter!("stressor_generated_bytes_total").increment(bytes);

    tracing::info!("sending {}MB of data", mb);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data,
    )
        .into_response())
}

/// GET /health - Liveness probe
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// GET /metrics - JSON snapshot of server counters
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        live_allocations: state.allocations.live(),
        live_allocated_mb: to_mib(state.allocations.live_bytes()),
    })
}

/// GET /metrics/prometheus - Prometheus text exposition
pub async fn prometheus_metrics(State(state): State<AppState>) -> Result<String, ServerError> {
    state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(ServerError::MetricsUnavailable)
}

/// Build the stress API routes
pub fn stress_routes(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/memory", any(get_memory))
        .route("/allocate", any(allocate))
        .route("/sqrt2", any(compute_sqrt2))
        .route("/fibo", any(compute_fibo))
        .route("/status", any(return_status))
        .route("/wait", any(wait))
        .route("/send", any(receive_data))
        .route("/generate", any(generate_data))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

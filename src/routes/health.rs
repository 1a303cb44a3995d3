use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub storage: ComponentHealth,
    pub queue: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

/// GET /health — health check with dependency status.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    // Check blob storage reachability
    let storage_start = std::time::Instant::now();
    let storage_check = match state.storage.health_check().await {
        Ok(_) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(storage_start.elapsed().as_millis() as u64),
            depth: None,
        },
        Err(_) => ComponentHealth {
            status: "error".to_string(),
            latency_ms: None,
            depth: None,
        },
    };

    // The queue is in-process; unhealthy only once shutdown was signalled
    let queue_check = ComponentHealth {
        status: if state.queue.is_alive() {
            "ok".to_string()
        } else {
            "error".to_string()
        },
        latency_ms: None,
        depth: Some(state.queue.depth()),
    };

    let all_healthy = storage_check.status == "ok" && queue_check.status == "ok";
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            storage: storage_check,
            queue: queue_check,
        },
    };

    (status_code, Json(response))
}

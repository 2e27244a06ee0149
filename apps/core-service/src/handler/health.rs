//! # ヘルスチェックハンドラ
//!
//! - `GET /health`: Liveness。プロセスが応答できれば常に 200
//! - `GET /health/ready`: Readiness。データベースに接続できなければ 503

use std::{sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use overtimeflow_infra::db::DatabaseProbe;
use overtimeflow_shared::{CheckStatus, HealthResponse, ReadinessResponse};

const PING_TIMEOUT: Duration = Duration::from_secs(3);

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub database: Arc<dyn DatabaseProbe>,
}

#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let database = match tokio::time::timeout(PING_TIMEOUT, state.database.ping()).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database ping timed out");
            CheckStatus::Error
        }
    };

    let response = ReadinessResponse::from_checks([("database", database)]);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケースに委譲

pub mod health;
pub mod overtime;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
pub use health::{ReadinessState, health_check, readiness_check};
pub use overtime::{
    OvertimeState,
    bulk_transition_requests,
    create_request,
    get_request,
    list_requests,
    transition_request,
    update_request,
};

/// Core Service のルーター
///
/// `bulk/{action}` は静的セグメントのため `{id}/{action}` より優先される。
pub fn router(overtime_state: Arc<OvertimeState>, readiness_state: Arc<ReadinessState>) -> Router {
    let health: Router = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state);

    Router::new()
        .route(
            "/internal/overtime-requests",
            get(list_requests).post(create_request),
        )
        .route(
            "/internal/overtime-requests/{id}",
            get(get_request).patch(update_request),
        )
        .route(
            "/internal/overtime-requests/bulk/{action}",
            post(bulk_transition_requests),
        )
        .route(
            "/internal/overtime-requests/{id}/{action}",
            post(transition_request),
        )
        .with_state(overtime_state)
        .merge(health)
}

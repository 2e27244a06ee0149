//! # Core Service エラー定義
//!
//! Core Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンス本文は [`ErrorResponse`]（RFC 9457 Problem Details）。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use overtimeflow_domain::{DomainError, overtime::TransitionError};
use overtimeflow_infra::InfraError;
use overtimeflow_shared::{ErrorResponse, event_log::error as log_error};
use thiserror::Error;

/// Core Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 権限不足
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// 現在のステータスでは実行できない
    #[error("無効なステータスです: {0}")]
    InvalidStatus(String),

    /// 競合（楽観的ロック失敗）
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<InfraError> for CoreError {
    fn from(err: InfraError) -> Self {
        if err.is_conflict() {
            CoreError::Conflict(format!("{err}。最新の情報を取得してください。"))
        } else {
            CoreError::Database(err)
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => CoreError::BadRequest(msg),
            DomainError::InvalidStatus(msg) => CoreError::InvalidStatus(msg),
            DomainError::Forbidden(msg) => CoreError::Forbidden(msg),
        }
    }
}

impl From<TransitionError> for CoreError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Forbidden { .. } => CoreError::Forbidden(err.to_string()),
            TransitionError::InvalidStatus { .. } => CoreError::InvalidStatus(err.to_string()),
        }
    }
}

impl CoreError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            CoreError::NotFound(msg) => ErrorResponse::not_found(msg.clone()),
            CoreError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            CoreError::Forbidden(msg) => ErrorResponse::forbidden(msg.clone()),
            CoreError::InvalidStatus(msg) => ErrorResponse::invalid_status(msg.clone()),
            CoreError::Conflict(msg) => ErrorResponse::conflict(msg.clone()),
            CoreError::Database(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            CoreError::Internal(msg) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                ErrorResponse::internal_error()
            }
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let body = self.to_error_response();
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(body)).into_response()
    }
}

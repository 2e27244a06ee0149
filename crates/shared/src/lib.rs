//! # OvertimeFlow 共有ユーティリティ
//!
//! HTTP レスポンスの形とログ関連の共通処理をまとめる。
//! 残業申請の業務ルールはここに置かない。
//!
//! axum には依存しない。`IntoResponse` への変換はサービス側で行う。

pub mod api_response;
pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

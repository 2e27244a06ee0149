//! # リポジトリ
//!
//! 残業申請の永続化トレイトと、その PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **トレイト経由**: ユースケースは `Arc<dyn OvertimeRequestRepository>` に依存し、
//!   テストではインメモリモックに差し替える
//! - **ADT の境界**: DB のフラットな行は `OvertimeRequest::from_db` を通して復元し、
//!   不変条件を満たさない行はエラーとして扱う

pub mod overtime_request_repository;

pub use overtime_request_repository::{
    OvertimeRequestFilter,
    OvertimeRequestRepository,
    PostgresOvertimeRequestRepository,
};

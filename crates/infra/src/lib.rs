//! # OvertimeFlow インフラ層
//!
//! 外部システム（PostgreSQL）との接続を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! リポジトリトレイトとその具体実装を提供し、永続化の詳細をカプセル化する。
//! ドメイン層はこのクレートに依存しない（依存性逆転の原則）。
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続プールとマイグレーション
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと PostgreSQL 実装
//! - `mock` - インメモリモック（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use overtimeflow_infra::{db, repository::PostgresOvertimeRequestRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/overtimeflow", 10).await?;
//!     db::run_migrations(&pool).await?;
//!     let repo = PostgresOvertimeRequestRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(feature = "test-utils")]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};

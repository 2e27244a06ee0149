//! # ユースケース層
//!
//! Core Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと時刻プロバイダを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **遷移の判定はドメインに委譲**: 可否は `OvertimeRequest::apply` が決める
//!
//! ## モジュール構成
//!
//! - `overtime`: 残業申請のユースケース

pub(crate) mod helpers;

pub mod overtime;

pub use overtime::{
    BulkTransitionOutcome,
    CreateOvertimeInput,
    OvertimeUseCaseImpl,
    SkipReason,
    SkippedItem,
    UpdateOvertimeInput,
};

//! # インフラ層エラー定義
//!
//! [`InfraError`] は種別（[`InfraErrorKind`]）と、生成時点の [`SpanTrace`] を持つ。
//! どのリポジトリ操作の中で失敗したかをログで追えるよう、
//! 生成はすべて [`InfraError::new`] を経由してスパンを捕捉する。

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
#[derive(Debug, Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// SQL の実行失敗・接続エラー・制約違反
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    #[error("マイグレーションエラー: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// 楽観的ロック競合
    ///
    /// 期待したバージョンの行が存在しなかった（更新済み、または削除済み）。
    #[error("残業申請 {id} は既に更新されています（期待したバージョン: {expected_version}）")]
    Conflict { id: String, expected_version: u32 },

    /// 行がドメインの不変条件を満たさず、エンティティに復元できない
    #[error("残業申請 {id} のデータが不正です: {reason}")]
    Corrupted { id: String, reason: String },
}

impl InfraError {
    /// 現在のスパンを捕捉してエラーを生成する
    pub fn new(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn conflict(id: impl ToString, expected_version: u32) -> Self {
        Self::new(InfraErrorKind::Conflict {
            id: id.to_string(),
            expected_version,
        })
    }

    pub fn corrupted(id: impl ToString, reason: impl ToString) -> Self {
        Self::new(InfraErrorKind::Corrupted {
            id:     id.to_string(),
            reason: reason.to_string(),
        })
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.kind, InfraErrorKind::Conflict { .. })
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self::new(InfraErrorKind::Database(source))
    }
}

impl From<sqlx::migrate::MigrateError> for InfraError {
    fn from(source: sqlx::migrate::MigrateError) -> Self {
        Self::new(InfraErrorKind::Migration(source))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    fn within_span<T>(name: &'static str, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("repo", op = name);
            let _enter = span.enter();
            f()
        })
    }

    #[test]
    fn test_生成時のスパンが記録される() {
        let err = within_span("update_with_version_check", || {
            InfraError::conflict("OT-1", 3)
        });

        let trace = err.span_trace().to_string();
        assert!(trace.contains("repo"), "{trace}");
        assert!(trace.contains("update_with_version_check"), "{trace}");
    }

    #[test]
    fn test_競合はバージョンを含むメッセージになる() {
        let err = InfraError::conflict("OT-1", 3);

        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "残業申請 OT-1 は既に更新されています（期待したバージョン: 3）"
        );
    }

    #[test]
    fn test_競合以外はis_conflictがfalse() {
        assert!(!InfraError::corrupted("OT-1", "status=unknown").is_conflict());
        assert!(!InfraError::from(sqlx::Error::RowNotFound).is_conflict());
    }

    #[test]
    fn test_sqlxエラーはsourceとして辿れる() {
        let err = InfraError::from(sqlx::Error::PoolTimedOut);

        assert!(matches!(err.kind(), InfraErrorKind::Database(_)));
        assert!(err.source().is_some());
    }
}

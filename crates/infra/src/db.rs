//! # PostgreSQL 接続
//!
//! 起動時に 1 度だけ接続プールを作り、リポジトリ間で共有する。
//! スキーマはワークスペース直下の `migrations/` から埋め込む。
//! [`DatabaseProbe`] は `/health/ready` が使う疎通確認。

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::InfraError;

/// 接続取得の待ち時間の上限
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// 接続プールを作成する
///
/// 作成時に 1 本接続して疎通を確認する。
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    tracing::debug!(max_connections, "接続プールを作成しました");
    Ok(pool)
}

/// 未適用のマイグレーションを適用する
///
/// sqlx が advisory lock を取るため、複数インスタンスが同時に起動しても二重適用されない。
#[tracing::instrument(skip_all, err)]
pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    let migrator = sqlx::migrate!("../../migrations");
    migrator.run(pool).await?;

    tracing::debug!(count = migrator.iter().count(), "マイグレーションを確認しました");
    Ok(())
}

/// Readiness チェック用の疎通確認
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), InfraError>;
}

#[async_trait]
impl DatabaseProbe for PgPool {
    async fn ping(&self) -> Result<(), InfraError> {
        sqlx::query("SELECT 1").execute(self).await?;
        Ok(())
    }
}

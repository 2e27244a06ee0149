//! # Core Service サーバー
//!
//! 残業申請の承認ワークフローを実行する内部サービス。
//!
//! ## 役割
//!
//! - **ビジネスロジック**: 残業申請の作成・変更と、ロールに基づく状態遷移（単体・一括）
//! - **データ永続化**: PostgreSQL への残業申請の保存
//!
//! ## アクセス制御
//!
//! Core Service は内部ネットワークからのみアクセス可能とする。
//! 認証とロール解決（LDAP など）は呼び出し側のポータルが行い、
//! 解決済みのアクターをリクエストに含めて渡す。
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Internet   │──X──│Core Service  │─────│   Database   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             ↑
//!                      内部ネットワークのみ
//!                             ↓
//!                      ┌──────────────┐
//!                      │    Portal    │
//!                      └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CORE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `CORE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `DB_MAX_CONNECTIONS` | No | 接続プールの最大接続数（デフォルト: `10`） |
//! | `RUN_MIGRATIONS` | No | 起動時にマイグレーションを適用するか（デフォルト: `true`） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,overtimeflow=debug,tower_http=debug`） |
//!
//! ## 起動方法
//!
//! ```bash
//! CORE_PORT=13001 DATABASE_URL=postgres://... cargo run -p overtimeflow-core-service
//! ```

mod config;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use config::CoreConfig;
use overtimeflow_core_service::{
    handler::{OvertimeState, ReadinessState, router},
    usecase::OvertimeUseCaseImpl,
};
use overtimeflow_domain::clock::SystemClock;
use overtimeflow_infra::{db, repository::PostgresOvertimeRequestRepository};
use overtimeflow_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Core Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env("core-service"))
        .map_err(|e| anyhow::anyhow!(e).context("トレーシングの初期化に失敗しました"))?;

    let config = CoreConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Core Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    if config.run_migrations {
        db::run_migrations(&pool)
            .await
            .context("マイグレーションの適用に失敗しました")?;
        tracing::info!("マイグレーションを適用しました");
    }

    // 依存コンポーネントを初期化
    let usecase = OvertimeUseCaseImpl::new(
        Arc::new(PostgresOvertimeRequestRepository::new(pool.clone())),
        Arc::new(SystemClock),
    );
    let overtime_state = Arc::new(OvertimeState { usecase });
    let readiness_state = Arc::new(ReadinessState {
        database: Arc::new(pool),
    });

    let app = router(overtime_state, readiness_state).layer(TraceLayer::new_for_http());

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Core Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use overtimeflow_domain::{
    department::Department,
    overtime::{NewOvertimeRequest, OvertimeRequest, OvertimeRequestId},
    role::{Role, RoleSet},
    session::Actor,
    user::UserId,
    value_objects::{Headcount, Reason, WorkWindow},
};

/// テスト用の固定日時
///
/// PostgreSQL の TIMESTAMPTZ はマイクロ秒精度のため、秒単位の値を使う。
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 指定ロールを持つアクター
pub fn actor(roles: &[Role]) -> Actor {
    Actor::new(UserId::new(), RoleSet::from_iter(roles.iter().copied()))
}

/// 管理者アクター
pub fn admin() -> Actor {
    actor(&[Role::Admin])
}

/// デフォルト値で OvertimeRequest を作成
pub fn create_test_request(department: &str) -> OvertimeRequest {
    create_test_request_at(department, test_now())
}

/// 作成日時（と作業開始日時）を指定して OvertimeRequest を作成
pub fn create_test_request_at(department: &str, now: DateTime<Utc>) -> OvertimeRequest {
    OvertimeRequest::new(NewOvertimeRequest {
        id: OvertimeRequestId::new(),
        department: Department::new(department).unwrap(),
        requested_by: UserId::new(),
        responsible_employee: UserId::new(),
        window: WorkWindow::new(now, now + Duration::hours(3)).unwrap(),
        number_of_employees: Headcount::new(4, "人数").unwrap(),
        number_of_shifts: Headcount::new(1, "シフト数").unwrap(),
        reason: Reason::parse("受注増による増産").unwrap(),
        now,
    })
}

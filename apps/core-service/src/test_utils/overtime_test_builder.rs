//! 残業申請テストビルダー
//!
//! テストコードの重複を削減するためのビルダーパターン実装。
//! 標準的なテストデータとモックリポジトリのセットアップを提供する。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use overtimeflow_domain::{
    clock::FixedClock,
    department::Department,
    overtime::{NewOvertimeRequest, OvertimeRequest, OvertimeRequestId},
    role::{Role, RoleSet},
    session::Actor,
    user::UserId,
    value_objects::{Headcount, WorkWindow},
};
use overtimeflow_infra::mock::MockOvertimeRequestRepository;

use crate::usecase::OvertimeUseCaseImpl;

/// 残業申請テストのセットアップデータ
///
/// SUT とモックリポジトリのセット。リポジトリは SUT と状態を共有する。
pub struct OvertimeTestSetup {
    pub sut:  OvertimeUseCaseImpl,
    pub repo: MockOvertimeRequestRepository,
}

/// 残業申請テストビルダー
///
/// # 使用例
///
/// ```ignore
/// use overtimeflow_core_service::test_utils::OvertimeTestBuilder;
///
/// #[tokio::test]
/// async fn test_example() {
///     let builder = OvertimeTestBuilder::new();
///     let request = builder.pending_request("logistics");
///     let setup = builder.build();
///     setup.repo.add_request(request.clone());
///
///     let result = setup.sut.get_request(request.id()).await;
/// }
/// ```
pub struct OvertimeTestBuilder {
    requester: UserId,
    now:       DateTime<Utc>,
}

impl OvertimeTestBuilder {
    pub fn new() -> Self {
        Self {
            requester: UserId::new(),
            now:       DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    /// 時計の固定時刻を変更する
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// このビルダーで作成する申請の申請者
    pub fn requester(&self) -> Actor {
        Actor::new(self.requester.clone(), RoleSet::empty())
    }

    /// 指定ロールを持つ新しいアクター
    pub fn actor(&self, roles: &[Role]) -> Actor {
        Actor::new(UserId::new(), RoleSet::from_iter(roles.iter().copied()))
    }

    /// 申請中の残業申請（作業時間帯は固定時刻から 2 時間）
    pub fn pending_request(&self, department: &str) -> OvertimeRequest {
        OvertimeRequest::new(NewOvertimeRequest {
            id: OvertimeRequestId::new(),
            department: Department::new(department).unwrap(),
            requested_by: self.requester.clone(),
            responsible_employee: UserId::new(),
            window: WorkWindow::new(self.now, self.now + Duration::hours(2)).unwrap(),
            number_of_employees: Headcount::new(3, "人数").unwrap(),
            number_of_shifts: Headcount::new(1, "シフト数").unwrap(),
            reason: None,
            now: self.now,
        })
    }

    /// モックリポジトリと固定時計で SUT を構築する
    pub fn build(&self) -> OvertimeTestSetup {
        let repo = MockOvertimeRequestRepository::new();
        let sut = OvertimeUseCaseImpl::new(
            Arc::new(repo.clone()),
            Arc::new(FixedClock::new(self.now)),
        );
        OvertimeTestSetup { sut, repo }
    }
}

impl Default for OvertimeTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

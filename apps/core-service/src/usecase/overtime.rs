//! # 残業申請ユースケース
//!
//! 残業申請の作成・変更・状態遷移・参照を実装する。
//!
//! 遷移の可否（ロールと遷移元ステータス）はドメインの遷移表が判定する。
//! ユースケースは取得 → 適用 → 楽観的ロック付き保存 → イベント記録の順に進める。

mod command;
mod query;

use std::sync::Arc;

use overtimeflow_domain::{
    clock::Clock,
    department::Department,
    overtime::{
        OvertimeAction,
        OvertimeRequestChanges,
        OvertimeRequestId,
        OvertimeStatus,
        TransitionError,
    },
    user::UserId,
    value_objects::{Headcount, Reason, Version, WorkWindow},
};
use overtimeflow_infra::repository::OvertimeRequestRepository;
use overtimeflow_shared::event_log::event;

/// 残業申請の作成入力
///
/// 申請者は操作中のアクター自身。
#[derive(Debug, Clone)]
pub struct CreateOvertimeInput {
    pub department:           Department,
    pub responsible_employee: UserId,
    pub window:               WorkWindow,
    pub number_of_employees:  Headcount,
    pub number_of_shifts:     Headcount,
    pub reason:               Option<Reason>,
}

/// 残業申請の変更入力
#[derive(Debug, Clone)]
pub struct UpdateOvertimeInput {
    pub changes:          OvertimeRequestChanges,
    /// 楽観的ロック用バージョン
    pub expected_version: Version,
}

/// 一括遷移でスキップした理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 申請が存在しない
    NotFound,
    /// このアクターはこの申請に対して実行できない
    Forbidden,
    /// 遷移元のステータスではない
    InvalidStatus(OvertimeStatus),
    /// 読み込み後に他の操作で更新された
    Conflict,
}

impl SkipReason {
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::NotFound => "not-found",
            SkipReason::Forbidden => "forbidden",
            SkipReason::InvalidStatus(_) => "invalid-status",
            SkipReason::Conflict => "conflict",
        }
    }
}

/// 一括遷移でスキップした申請
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id:     OvertimeRequestId,
    pub reason: SkipReason,
}

/// 一括遷移の結果
///
/// バッチ全体ではアトミックではない。`modified_count` は実際に保存できた件数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTransitionOutcome {
    pub action:         OvertimeAction,
    pub modified_count: usize,
    pub modified:       Vec<OvertimeRequestId>,
    pub skipped:        Vec<SkippedItem>,
}

/// 残業申請ユースケース実装
pub struct OvertimeUseCaseImpl {
    repo:  Arc<dyn OvertimeRequestRepository>,
    clock: Arc<dyn Clock>,
}

impl OvertimeUseCaseImpl {
    pub fn new(repo: Arc<dyn OvertimeRequestRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

/// 遷移に対応するビジネスイベント名
fn event_action(action: OvertimeAction) -> &'static str {
    match action {
        OvertimeAction::PreApprove => event::action::OVERTIME_PRE_APPROVED,
        OvertimeAction::Approve => event::action::OVERTIME_APPROVED,
        OvertimeAction::Complete => event::action::OVERTIME_COMPLETED,
        OvertimeAction::MarkAccounted => event::action::OVERTIME_ACCOUNTED,
        OvertimeAction::Cancel => event::action::OVERTIME_CANCELED,
        OvertimeAction::Reactivate => event::action::OVERTIME_REACTIVATED,
    }
}

/// 拒否された遷移の `event.reason`
fn rejection_reason(err: &TransitionError) -> &'static str {
    match err {
        TransitionError::Forbidden { .. } => event::reason::FORBIDDEN,
        TransitionError::InvalidStatus { .. } => event::reason::INVALID_STATUS,
    }
}

#[cfg(test)]
pub(super) mod test_helpers {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, Utc};
    use overtimeflow_domain::{
        clock::FixedClock,
        department::Department,
        overtime::{NewOvertimeRequest, OvertimeAction, OvertimeRequest, OvertimeRequestId},
        role::{Role, RoleSet},
        session::Actor,
        user::UserId,
        value_objects::{Headcount, WorkWindow},
    };
    use overtimeflow_infra::mock::MockOvertimeRequestRepository;
    use tracing_subscriber::layer::SubscriberExt;

    use super::OvertimeUseCaseImpl;

    pub fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    pub fn build_sut(repo: &MockOvertimeRequestRepository) -> OvertimeUseCaseImpl {
        OvertimeUseCaseImpl::new(Arc::new(repo.clone()), Arc::new(FixedClock::new(now())))
    }

    pub fn actor(roles: &[Role]) -> Actor {
        Actor::new(UserId::new(), RoleSet::from_iter(roles.iter().copied()))
    }

    pub fn pending(department: &str) -> OvertimeRequest {
        OvertimeRequest::new(NewOvertimeRequest {
            id: OvertimeRequestId::new(),
            department: Department::new(department).unwrap(),
            requested_by: UserId::new(),
            responsible_employee: UserId::new(),
            window: WorkWindow::new(now(), now() + Duration::hours(2)).unwrap(),
            number_of_employees: Headcount::new(3, "人数").unwrap(),
            number_of_shifts: Headcount::new(1, "シフト数").unwrap(),
            reason: None,
            now: now(),
        })
    }

    /// admin で遷移を順に適用した申請
    pub fn advanced(department: &str, actions: &[OvertimeAction]) -> OvertimeRequest {
        let admin = actor(&[Role::Admin]);
        actions.iter().fold(pending(department), |request, action| {
            request.apply(*action, &admin, now()).unwrap()
        })
    }

    /// ビジネスイベントのフィールドを記録する Layer
    #[derive(Clone, Default)]
    pub struct CaptureLayer {
        events: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    }

    impl CaptureLayer {
        /// 記録したイベントのうち、指定フィールドの値を出現順に返す
        pub fn values_of(&self, name: &str) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .flat_map(|fields| fields.iter().filter(|(k, _)| k == name))
                .map(|(_, v)| v.clone())
                .collect()
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(visitor.0);
        }
    }

    #[derive(Default)]
    struct FieldVisitor(Vec<(String, String)>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{:?}", value)));
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
    }

    /// スレッドローカルにキャプチャ subscriber を設定する
    ///
    /// 返り値の `DefaultGuard` はスコープに保持すること（ドロップでリセット）。
    pub fn capture_events() -> (tracing::subscriber::DefaultGuard, CaptureLayer) {
        let capture = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        (tracing::subscriber::set_default(subscriber), capture)
    }
}

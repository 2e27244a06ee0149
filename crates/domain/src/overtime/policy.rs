//! # 遷移ポリシー
//!
//! 残業申請の状態遷移を「ロール集合をキーにした遷移表」として定義する。
//!
//! 各画面・各部署で個別に書かれていた承認条件を [`TransitionRule`] の静的な表に集約し、
//! [`authorize`] だけが遷移可否を判定する。エンティティ側の遷移メソッドも必ずここを通る。
//!
//! ## 遷移表
//!
//! | 操作 | ロール | 当事者 | 遷移元 | 遷移先 |
//! |------|--------|--------|--------|--------|
//! | `pre-approve` | production-manager, admin | - | pending（物流以外） | pre_approved |
//! | `approve` | plant-manager, admin | - | pending（物流）/ pre_approved（物流以外） | approved |
//! | `complete` | group-leader, production-manager, admin | 責任者 | approved | completed |
//! | `mark-accounted` | hr, admin | - | completed | accounted |
//! | `cancel` | plant-manager, admin, group-leader, production-manager, hr | 申請者 | pending, pre_approved, approved | canceled |
//! | `reactivate` | admin, hr | - | canceled | pending |
//!
//! ## 評価順序
//!
//! ロールの判定を先に行い、通過した場合のみステータスを判定する。
//! 権限のないアクターには申請の状態に関する情報を返さない。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use super::{OvertimeRequest, OvertimeStatus};
use crate::{DomainError, department::Department, role::Role, session::Actor};

/// 状態を変える操作
///
/// ワイヤ表現（URL パス、JSON）はケバブケース。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(
    serialize_all = "kebab-case",
    parse_err_ty = DomainError,
    parse_err_fn = invalid_action
)]
pub enum OvertimeAction {
    /// 事前承認（製造部長）
    PreApprove,
    /// 承認（工場長）
    Approve,
    /// 完了（出勤者リスト提出）
    Complete,
    /// 計上（人事）
    MarkAccounted,
    /// 取消
    Cancel,
    /// 再開（取消の取り消し）
    Reactivate,
}

impl OvertimeAction {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// この操作の遷移規則
    pub fn rule(self) -> &'static TransitionRule {
        match self {
            Self::PreApprove => &PRE_APPROVE,
            Self::Approve => &APPROVE,
            Self::Complete => &COMPLETE,
            Self::MarkAccounted => &MARK_ACCOUNTED,
            Self::Cancel => &CANCEL,
            Self::Reactivate => &REACTIVATE,
        }
    }
}

fn invalid_action(s: &str) -> DomainError {
    DomainError::Validation(format!("不正な操作: {}", s))
}

/// ロール以外で操作を許可される当事者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// 申請者本人
    Requester,
    /// 残業の責任者
    ResponsibleEmployee,
}

impl Party {
    fn matches(self, actor: &Actor, request: &OvertimeRequest) -> bool {
        match self {
            Self::Requester => actor.is(request.requested_by()),
            Self::ResponsibleEmployee => actor.is(request.responsible_employee()),
        }
    }
}

/// 遷移規則（遷移表の 1 行）
#[derive(Debug)]
pub struct TransitionRule {
    pub action:  OvertimeAction,
    /// いずれかを保持していれば許可されるロール
    pub roles:   &'static [Role],
    /// ロールに関係なく許可される当事者
    pub parties: &'static [Party],
    /// 遷移元の条件
    pub source:  fn(OvertimeStatus, &Department) -> bool,
    pub target:  OvertimeStatus,
}

impl TransitionRule {
    /// アクターがこの操作を行う資格を持つか（ステータスは見ない）
    pub fn permits(&self, actor: &Actor, request: &OvertimeRequest) -> bool {
        actor.has_any(self.roles) || self.parties.iter().any(|p| p.matches(actor, request))
    }

    /// 申請が遷移元の条件を満たすか（アクターは見ない）
    pub fn accepts(&self, request: &OvertimeRequest) -> bool {
        (self.source)(request.status(), request.department())
    }
}

// 遷移元の条件

fn pending_non_logistics(status: OvertimeStatus, department: &Department) -> bool {
    status == OvertimeStatus::Pending && !department.is_logistics()
}

/// 物流は申請中から、それ以外は事前承認済みから
fn awaiting_approval(status: OvertimeStatus, department: &Department) -> bool {
    if department.is_logistics() {
        status == OvertimeStatus::Pending
    } else {
        status == OvertimeStatus::PreApproved
    }
}

fn approved(status: OvertimeStatus, _: &Department) -> bool {
    status == OvertimeStatus::Approved
}

fn completed(status: OvertimeStatus, _: &Department) -> bool {
    status == OvertimeStatus::Completed
}

fn cancelable(status: OvertimeStatus, _: &Department) -> bool {
    !matches!(
        status,
        OvertimeStatus::Completed | OvertimeStatus::Accounted | OvertimeStatus::Canceled
    )
}

fn canceled(status: OvertimeStatus, _: &Department) -> bool {
    status == OvertimeStatus::Canceled
}

static PRE_APPROVE: TransitionRule = TransitionRule {
    action:  OvertimeAction::PreApprove,
    roles:   &[Role::ProductionManager, Role::Admin],
    parties: &[],
    source:  pending_non_logistics,
    target:  OvertimeStatus::PreApproved,
};

static APPROVE: TransitionRule = TransitionRule {
    action:  OvertimeAction::Approve,
    roles:   &[Role::PlantManager, Role::Admin],
    parties: &[],
    source:  awaiting_approval,
    target:  OvertimeStatus::Approved,
};

static COMPLETE: TransitionRule = TransitionRule {
    action:  OvertimeAction::Complete,
    roles:   &[Role::GroupLeader, Role::ProductionManager, Role::Admin],
    parties: &[Party::ResponsibleEmployee],
    source:  approved,
    target:  OvertimeStatus::Completed,
};

static MARK_ACCOUNTED: TransitionRule = TransitionRule {
    action:  OvertimeAction::MarkAccounted,
    roles:   &[Role::Hr, Role::Admin],
    parties: &[],
    source:  completed,
    target:  OvertimeStatus::Accounted,
};

static CANCEL: TransitionRule = TransitionRule {
    action:  OvertimeAction::Cancel,
    roles:   &[
        Role::PlantManager,
        Role::Admin,
        Role::GroupLeader,
        Role::ProductionManager,
        Role::Hr,
    ],
    parties: &[Party::Requester],
    source:  cancelable,
    target:  OvertimeStatus::Canceled,
};

static REACTIVATE: TransitionRule = TransitionRule {
    action:  OvertimeAction::Reactivate,
    roles:   &[Role::Admin, Role::Hr],
    parties: &[],
    source:  canceled,
    target:  OvertimeStatus::Pending,
};

/// 遷移の拒否理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// ロールも当事者性も満たさない
    #[error("{action} を実行できるロールを持っていません")]
    Forbidden { action: OvertimeAction },

    /// 現在のステータス（と部署）では実行できない
    #[error("{status} の申請には {action} を実行できません")]
    InvalidStatus {
        action: OvertimeAction,
        status: OvertimeStatus,
    },
}

/// 遷移可否を判定し、遷移先のステータスを返す
///
/// # Errors
///
/// - `TransitionError::Forbidden`: アクターがロールも当事者性も満たさない
/// - `TransitionError::InvalidStatus`: 申請が遷移元の条件を満たさない
pub fn authorize(
    action: OvertimeAction,
    actor: &Actor,
    request: &OvertimeRequest,
) -> Result<OvertimeStatus, TransitionError> {
    let rule = action.rule();

    if !rule.permits(actor, request) {
        return Err(TransitionError::Forbidden { action });
    }
    if !rule.accepts(request) {
        return Err(TransitionError::InvalidStatus {
            action,
            status: request.status(),
        });
    }

    Ok(rule.target)
}

/// アクターが今この申請に対して実行できる操作の一覧（宣言順）
pub fn available_actions(actor: &Actor, request: &OvertimeRequest) -> Vec<OvertimeAction> {
    use strum::IntoEnumIterator;

    OvertimeAction::iter()
        .filter(|action| authorize(*action, actor, request).is_ok())
        .collect()
}

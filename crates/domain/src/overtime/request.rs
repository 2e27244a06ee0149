//! # 残業申請エンティティ
//!
//! 状態遷移は ADT（代数的データ型）で表現し、各状態で有効な監査スタンプだけを持たせる。
//! 遷移の可否は [`policy`](super::policy) が判定し、このモジュールは遷移後の形を組み立てる。

use chrono::{DateTime, Utc};

use super::{
    OvertimeStatus,
    policy::{self, OvertimeAction, TransitionError},
};
use crate::{
    DomainError,
    department::Department,
    role::Role,
    session::Actor,
    user::UserId,
    value_objects::{Headcount, Reason, Stamp, Version, WorkWindow},
};

define_uuid_id! {
    /// 残業申請 ID
    pub struct OvertimeRequestId;
}

/// 残業申請の状態（ADT ベースステートマシン）
///
/// 各状態で有効な監査スタンプのみを持つ。物流の申請は事前承認を経ないため、
/// 事前承認スタンプは `Option` で表現する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OvertimeRequestState {
    /// 申請中
    Pending,
    /// 事前承認済み
    PreApproved(PreApprovedState),
    /// 承認済み
    Approved(ApprovedState),
    /// 完了
    Completed(CompletedState),
    /// 計上済み
    Accounted(AccountedState),
    /// 取消
    Canceled(CanceledState),
}

/// PreApproved 状態の固有フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreApprovedState {
    pub pre_approved: Stamp,
}

/// Approved 状態の固有フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedState {
    /// 物流の場合は None
    pub pre_approved: Option<Stamp>,
    pub approved:     Stamp,
}

/// Completed 状態の固有フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedState {
    pub pre_approved: Option<Stamp>,
    pub approved:     Stamp,
    pub completed:    Stamp,
}

/// Accounted 状態の固有フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountedState {
    pub pre_approved: Option<Stamp>,
    pub approved:     Stamp,
    pub completed:    Stamp,
    pub accounted:    Stamp,
}

/// Canceled 状態の固有フィールド
///
/// pending / pre_approved / approved から遷移するため、
/// それまでに押されたスタンプをそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanceledState {
    pub pre_approved: Option<Stamp>,
    pub approved:     Option<Stamp>,
    pub canceled:     Stamp,
}

/// 残業申請エンティティ
///
/// 共通フィールドを外側に、状態固有フィールドを `state` enum に分離する。
///
/// ## 楽観的ロック
///
/// 状態を変える操作（遷移・編集）のたびに `version` をインクリメントする。
/// 永続化時は読み込み時の version と DB の version を比較し、
/// 一致しない場合は競合エラー（409 Conflict）とする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertimeRequest {
    id: OvertimeRequestId,
    department: Department,
    requested_by: UserId,
    responsible_employee: UserId,
    window: WorkWindow,
    number_of_employees: Headcount,
    number_of_shifts: Headcount,
    reason: Option<Reason>,
    /// 最後に再開された記録。再開後も履歴として残す
    reactivated: Option<Stamp>,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    state: OvertimeRequestState,
}

/// 残業申請の新規作成パラメータ
pub struct NewOvertimeRequest {
    pub id: OvertimeRequestId,
    pub department: Department,
    pub requested_by: UserId,
    pub responsible_employee: UserId,
    pub window: WorkWindow,
    pub number_of_employees: Headcount,
    pub number_of_shifts: Headcount,
    pub reason: Option<Reason>,
    pub now: DateTime<Utc>,
}

/// 申請中の内容変更
///
/// `None` の項目は変更しない。`reason` は `Some(None)` で削除する。
#[derive(Debug, Clone, Default)]
pub struct OvertimeRequestChanges {
    pub window: Option<WorkWindow>,
    pub number_of_employees: Option<Headcount>,
    pub number_of_shifts: Option<Headcount>,
    pub reason: Option<Option<Reason>>,
    pub responsible_employee: Option<UserId>,
}

impl OvertimeRequestChanges {
    pub fn is_empty(&self) -> bool {
        self.window.is_none()
            && self.number_of_employees.is_none()
            && self.number_of_shifts.is_none()
            && self.reason.is_none()
            && self.responsible_employee.is_none()
    }
}

/// 残業申請の DB 復元パラメータ
///
/// DB スキーマのフラット構造を表現する。`from_db()` で不変条件を検証して ADT に変換する。
#[derive(Debug, Clone)]
pub struct OvertimeRequestRecord {
    pub id: OvertimeRequestId,
    pub department: Department,
    pub requested_by: UserId,
    pub responsible_employee: UserId,
    pub window: WorkWindow,
    pub number_of_employees: Headcount,
    pub number_of_shifts: Headcount,
    pub reason: Option<Reason>,
    pub status: OvertimeStatus,
    pub version: Version,
    pub pre_approved: Option<Stamp>,
    pub approved: Option<Stamp>,
    pub completed: Option<Stamp>,
    pub accounted: Option<Stamp>,
    pub canceled: Option<Stamp>,
    pub reactivated: Option<Stamp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn require(
    stamp: Option<Stamp>,
    status: OvertimeStatus,
    column: &str,
) -> Result<Stamp, DomainError> {
    stamp.ok_or_else(|| {
        DomainError::Validation(format!(
            "{} の残業申請には {}_at / {}_by が必要です",
            status, column, column
        ))
    })
}

fn forbid(stamp: &Option<Stamp>, status: OvertimeStatus, column: &str) -> Result<(), DomainError> {
    match stamp {
        Some(_) => Err(DomainError::Validation(format!(
            "{} の残業申請に {}_at / {}_by が設定されています",
            status, column, column
        ))),
        None => Ok(()),
    }
}

impl OvertimeRequest {
    /// 新しい残業申請を作成する（申請中）
    pub fn new(params: NewOvertimeRequest) -> Self {
        Self {
            id: params.id,
            department: params.department,
            requested_by: params.requested_by,
            responsible_employee: params.responsible_employee,
            window: params.window,
            number_of_employees: params.number_of_employees,
            number_of_shifts: params.number_of_shifts,
            reason: params.reason,
            reactivated: None,
            version: Version::initial(),
            created_at: params.now,
            updated_at: params.now,
            state: OvertimeRequestState::Pending,
        }
    }

    /// 既存のデータから復元する
    ///
    /// DB のフラット構造から ADT に変換し、状態ごとのスタンプの有無を検証する。
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 不変条件違反
    ///   - 状態に必要なスタンプが欠けている（例: Completed で approved が None）
    ///   - 状態に不要なスタンプが設定されている（例: Pending で canceled が Some）
    ///   - 物流の申請に事前承認スタンプがある、物流以外の承認済み申請に事前承認スタンプがない
    pub fn from_db(record: OvertimeRequestRecord) -> Result<Self, DomainError> {
        let status = record.status;
        let logistics = record.department.is_logistics();

        if logistics {
            forbid(&record.pre_approved, status, "pre_approved")?;
        }
        let pre_approved = |stamp: Option<Stamp>| -> Result<Option<Stamp>, DomainError> {
            if logistics {
                Ok(None)
            } else {
                require(stamp, status, "pre_approved").map(Some)
            }
        };

        let state = match status {
            OvertimeStatus::Pending => {
                forbid(&record.pre_approved, status, "pre_approved")?;
                forbid(&record.approved, status, "approved")?;
                forbid(&record.completed, status, "completed")?;
                forbid(&record.accounted, status, "accounted")?;
                forbid(&record.canceled, status, "canceled")?;
                OvertimeRequestState::Pending
            }
            OvertimeStatus::PreApproved => {
                if logistics {
                    return Err(DomainError::Validation(
                        "物流の残業申請は事前承認済みになりません".to_string(),
                    ));
                }
                forbid(&record.approved, status, "approved")?;
                forbid(&record.completed, status, "completed")?;
                forbid(&record.accounted, status, "accounted")?;
                forbid(&record.canceled, status, "canceled")?;
                OvertimeRequestState::PreApproved(PreApprovedState {
                    pre_approved: require(record.pre_approved, status, "pre_approved")?,
                })
            }
            OvertimeStatus::Approved => {
                forbid(&record.completed, status, "completed")?;
                forbid(&record.accounted, status, "accounted")?;
                forbid(&record.canceled, status, "canceled")?;
                OvertimeRequestState::Approved(ApprovedState {
                    pre_approved: pre_approved(record.pre_approved)?,
                    approved:     require(record.approved, status, "approved")?,
                })
            }
            OvertimeStatus::Completed => {
                forbid(&record.accounted, status, "accounted")?;
                forbid(&record.canceled, status, "canceled")?;
                OvertimeRequestState::Completed(CompletedState {
                    pre_approved: pre_approved(record.pre_approved)?,
                    approved:     require(record.approved, status, "approved")?,
                    completed:    require(record.completed, status, "completed")?,
                })
            }
            OvertimeStatus::Accounted => {
                forbid(&record.canceled, status, "canceled")?;
                OvertimeRequestState::Accounted(AccountedState {
                    pre_approved: pre_approved(record.pre_approved)?,
                    approved:     require(record.approved, status, "approved")?,
                    completed:    require(record.completed, status, "completed")?,
                    accounted:    require(record.accounted, status, "accounted")?,
                })
            }
            OvertimeStatus::Canceled => {
                forbid(&record.completed, status, "completed")?;
                forbid(&record.accounted, status, "accounted")?;
                if !logistics && record.approved.is_some() && record.pre_approved.is_none() {
                    return Err(DomainError::Validation(
                        "物流以外の承認済み申請には事前承認が必要です".to_string(),
                    ));
                }
                OvertimeRequestState::Canceled(CanceledState {
                    pre_approved: record.pre_approved,
                    approved:     record.approved,
                    canceled:     require(record.canceled, status, "canceled")?,
                })
            }
        };

        Ok(Self {
            id: record.id,
            department: record.department,
            requested_by: record.requested_by,
            responsible_employee: record.responsible_employee,
            window: record.window,
            number_of_employees: record.number_of_employees,
            number_of_shifts: record.number_of_shifts,
            reason: record.reason,
            reactivated: record.reactivated,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
            state,
        })
    }

    /// DB に書き込むためのフラット構造に変換する
    pub fn to_record(&self) -> OvertimeRequestRecord {
        OvertimeRequestRecord {
            id: self.id.clone(),
            department: self.department.clone(),
            requested_by: self.requested_by.clone(),
            responsible_employee: self.responsible_employee.clone(),
            window: self.window,
            number_of_employees: self.number_of_employees,
            number_of_shifts: self.number_of_shifts,
            reason: self.reason.clone(),
            status: self.status(),
            version: self.version,
            pre_approved: self.pre_approved().cloned(),
            approved: self.approved().cloned(),
            completed: self.completed().cloned(),
            accounted: self.accounted().cloned(),
            canceled: self.canceled().cloned(),
            reactivated: self.reactivated.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &OvertimeRequestId {
        &self.id
    }

    pub fn department(&self) -> &Department {
        &self.department
    }

    pub fn requested_by(&self) -> &UserId {
        &self.requested_by
    }

    pub fn responsible_employee(&self) -> &UserId {
        &self.responsible_employee
    }

    pub fn window(&self) -> &WorkWindow {
        &self.window
    }

    pub fn number_of_employees(&self) -> Headcount {
        self.number_of_employees
    }

    pub fn number_of_shifts(&self) -> Headcount {
        self.number_of_shifts
    }

    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn status(&self) -> OvertimeStatus {
        match &self.state {
            OvertimeRequestState::Pending => OvertimeStatus::Pending,
            OvertimeRequestState::PreApproved(_) => OvertimeStatus::PreApproved,
            OvertimeRequestState::Approved(_) => OvertimeStatus::Approved,
            OvertimeRequestState::Completed(_) => OvertimeStatus::Completed,
            OvertimeRequestState::Accounted(_) => OvertimeStatus::Accounted,
            OvertimeRequestState::Canceled(_) => OvertimeStatus::Canceled,
        }
    }

    /// 状態への直接アクセス（パターンマッチ用）
    pub fn state(&self) -> &OvertimeRequestState {
        &self.state
    }

    pub fn pre_approved(&self) -> Option<&Stamp> {
        match &self.state {
            OvertimeRequestState::Pending => None,
            OvertimeRequestState::PreApproved(s) => Some(&s.pre_approved),
            OvertimeRequestState::Approved(s) => s.pre_approved.as_ref(),
            OvertimeRequestState::Completed(s) => s.pre_approved.as_ref(),
            OvertimeRequestState::Accounted(s) => s.pre_approved.as_ref(),
            OvertimeRequestState::Canceled(s) => s.pre_approved.as_ref(),
        }
    }

    pub fn approved(&self) -> Option<&Stamp> {
        match &self.state {
            OvertimeRequestState::Pending | OvertimeRequestState::PreApproved(_) => None,
            OvertimeRequestState::Approved(s) => Some(&s.approved),
            OvertimeRequestState::Completed(s) => Some(&s.approved),
            OvertimeRequestState::Accounted(s) => Some(&s.approved),
            OvertimeRequestState::Canceled(s) => s.approved.as_ref(),
        }
    }

    pub fn completed(&self) -> Option<&Stamp> {
        match &self.state {
            OvertimeRequestState::Completed(s) => Some(&s.completed),
            OvertimeRequestState::Accounted(s) => Some(&s.completed),
            _ => None,
        }
    }

    pub fn accounted(&self) -> Option<&Stamp> {
        match &self.state {
            OvertimeRequestState::Accounted(s) => Some(&s.accounted),
            _ => None,
        }
    }

    pub fn canceled(&self) -> Option<&Stamp> {
        match &self.state {
            OvertimeRequestState::Canceled(s) => Some(&s.canceled),
            _ => None,
        }
    }

    pub fn reactivated(&self) -> Option<&Stamp> {
        self.reactivated.as_ref()
    }

    // ビジネスロジックメソッド

    /// 操作を適用した新しい申請を返す
    ///
    /// 可否は [`policy::authorize`] で判定し、通過した場合のみ状態を組み立てる。
    /// version をインクリメントして楽観的ロックに対応。
    ///
    /// # Errors
    ///
    /// - `TransitionError::Forbidden`: ロール不足
    /// - `TransitionError::InvalidStatus`: 現在のステータスでは実行できない
    pub fn apply(
        self,
        action: OvertimeAction,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        policy::authorize(action, actor, &self)?;

        let status = self.status();
        let stamp = Stamp::new(now, actor.user_id().clone());
        let invalid = TransitionError::InvalidStatus { action, status };

        let (state, reactivated) = match (action, self.state) {
            (OvertimeAction::PreApprove, OvertimeRequestState::Pending) => (
                OvertimeRequestState::PreApproved(PreApprovedState {
                    pre_approved: stamp,
                }),
                self.reactivated,
            ),
            (OvertimeAction::Approve, OvertimeRequestState::Pending) => (
                OvertimeRequestState::Approved(ApprovedState {
                    pre_approved: None,
                    approved:     stamp,
                }),
                self.reactivated,
            ),
            (OvertimeAction::Approve, OvertimeRequestState::PreApproved(s)) => (
                OvertimeRequestState::Approved(ApprovedState {
                    pre_approved: Some(s.pre_approved),
                    approved:     stamp,
                }),
                self.reactivated,
            ),
            (OvertimeAction::Complete, OvertimeRequestState::Approved(s)) => (
                OvertimeRequestState::Completed(CompletedState {
                    pre_approved: s.pre_approved,
                    approved:     s.approved,
                    completed:    stamp,
                }),
                self.reactivated,
            ),
            (OvertimeAction::MarkAccounted, OvertimeRequestState::Completed(s)) => (
                OvertimeRequestState::Accounted(AccountedState {
                    pre_approved: s.pre_approved,
                    approved:     s.approved,
                    completed:    s.completed,
                    accounted:    stamp,
                }),
                self.reactivated,
            ),
            (OvertimeAction::Cancel, OvertimeRequestState::Pending) => (
                OvertimeRequestState::Canceled(CanceledState {
                    pre_approved: None,
                    approved:     None,
                    canceled:     stamp,
                }),
                self.reactivated,
            ),
            (OvertimeAction::Cancel, OvertimeRequestState::PreApproved(s)) => (
                OvertimeRequestState::Canceled(CanceledState {
                    pre_approved: Some(s.pre_approved),
                    approved:     None,
                    canceled:     stamp,
                }),
                self.reactivated,
            ),
            (OvertimeAction::Cancel, OvertimeRequestState::Approved(s)) => (
                OvertimeRequestState::Canceled(CanceledState {
                    pre_approved: s.pre_approved,
                    approved:     Some(s.approved),
                    canceled:     stamp,
                }),
                self.reactivated,
            ),
            // 再開は承認をやり直すため、承認系と取消のスタンプを破棄する
            (OvertimeAction::Reactivate, OvertimeRequestState::Canceled(_)) => {
                (OvertimeRequestState::Pending, Some(stamp))
            }
            _ => return Err(invalid),
        };

        Ok(Self {
            state,
            reactivated,
            version: self.version.next(),
            updated_at: now,
            ..self
        })
    }

    /// 申請中の内容を変更した新しい申請を返す
    ///
    /// 申請者本人または admin のみ実行できる。
    /// version をインクリメントして楽観的ロックに対応。
    ///
    /// # Errors
    ///
    /// - `DomainError::Forbidden`: 申請者本人でも admin でもない
    /// - `DomainError::InvalidStatus`: 申請中以外
    pub fn edited(
        self,
        changes: OvertimeRequestChanges,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !actor.is(&self.requested_by) && !actor.has_any(&[Role::Admin]) {
            return Err(DomainError::Forbidden(
                "申請内容を変更できるのは申請者本人または管理者のみです".to_string(),
            ));
        }
        if self.state != OvertimeRequestState::Pending {
            return Err(DomainError::InvalidStatus(format!(
                "申請内容は申請中のみ変更できます（現在: {}）",
                self.status()
            )));
        }

        Ok(Self {
            window: changes.window.unwrap_or(self.window),
            number_of_employees: changes
                .number_of_employees
                .unwrap_or(self.number_of_employees),
            number_of_shifts: changes.number_of_shifts.unwrap_or(self.number_of_shifts),
            reason: changes.reason.unwrap_or(self.reason),
            responsible_employee: changes
                .responsible_employee
                .unwrap_or(self.responsible_employee),
            version: self.version.next(),
            updated_at: now,
            ..self
        })
    }
}

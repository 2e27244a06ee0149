//! # 残業申請ステータス

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// 残業申請ステータス
///
/// DB・API 上のフラットな表現。状態固有のフィールドは
/// [`OvertimeRequestState`](super::OvertimeRequestState) が保持する。
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
#[serde(rename_all = "snake_case")]
#[strum(
    serialize_all = "snake_case",
    parse_err_ty = DomainError,
    parse_err_fn = invalid_status
)]
pub enum OvertimeStatus {
    /// 申請中
    Pending,
    /// 事前承認済み（物流以外）
    PreApproved,
    /// 承認済み
    Approved,
    /// 完了（出勤者リスト提出済み）
    Completed,
    /// 計上済み
    Accounted,
    /// 取消
    Canceled,
}

impl OvertimeStatus {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// 前に進む遷移がもう存在しない状態か
    ///
    /// `canceled` は再開（reactivate）でのみ `pending` に戻れる。
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accounted | Self::Canceled)
    }
}

fn invalid_status(s: &str) -> DomainError {
    DomainError::Validation(format!("不正な残業申請ステータス: {}", s))
}

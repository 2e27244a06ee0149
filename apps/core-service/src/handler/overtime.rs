//! # 残業申請 API ハンドラ
//!
//! Core Service の残業申請エンドポイントを実装する。
//!
//! 認証とロール解決は呼び出し側の責務。操作するアクター（ユーザー ID とロール名）は
//! リクエストボディ（GET ではクエリ）で受け取る。

mod command;
mod query;

use chrono::{DateTime, Utc};
pub use command::{bulk_transition_requests, create_request, transition_request, update_request};
use overtimeflow_domain::{
    overtime::{OvertimeAction, OvertimeRequest, policy::available_actions},
    role::{Role, RoleSet},
    session::Actor,
    user::UserId,
    value_objects::Stamp,
};
pub use query::{get_request, list_requests};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::CoreError,
    usecase::{BulkTransitionOutcome, OvertimeUseCaseImpl, SkipReason},
};

/// 残業申請ハンドラの共有状態
pub struct OvertimeState {
    pub usecase: OvertimeUseCaseImpl,
}

// ===== リクエスト =====

/// 操作するアクター
#[derive(Debug, Deserialize)]
pub struct ActorDto {
    /// ユーザー ID
    pub id:    Uuid,
    /// ロール名（`plant-manager` など）
    #[serde(default)]
    pub roles: Vec<String>,
}

impl ActorDto {
    fn into_actor(self) -> Result<Actor, CoreError> {
        let roles = parse_roles(self.roles.iter().map(String::as_str))?;
        Ok(Actor::new(UserId::from_uuid(self.id), roles))
    }
}

/// 残業申請作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateOvertimeRequest {
    pub actor: ActorDto,
    pub department: String,
    pub responsible_employee: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub number_of_employees: i64,
    pub number_of_shifts: i64,
    pub reason: Option<String>,
}

/// 残業申請変更リクエスト
///
/// 省略した項目は変更しない。`from` と `to` は同時に指定する。
/// `reason` に空文字列を渡すと理由を削除する。
#[derive(Debug, Deserialize)]
pub struct UpdateOvertimeRequest {
    pub actor: ActorDto,
    /// 楽観的ロック用バージョン
    pub version: i32,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub number_of_employees: Option<i64>,
    pub number_of_shifts: Option<i64>,
    pub reason: Option<String>,
    pub responsible_employee: Option<Uuid>,
}

/// 単一遷移リクエスト
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub actor:   ActorDto,
    /// 楽観的ロック用バージョン（任意）
    pub version: Option<i32>,
}

/// 一括遷移リクエスト
#[derive(Debug, Deserialize)]
pub struct BulkTransitionRequest {
    pub actor: ActorDto,
    pub ids:   Vec<Uuid>,
}

/// アクター指定クエリパラメータ（GET リクエスト用）
///
/// 両方指定した場合のみ `available_actions` を計算する。`roles` はカンマ区切り。
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub actor_id: Option<Uuid>,
    pub roles:    Option<String>,
}

impl ActorQuery {
    fn into_actor(self) -> Result<Option<Actor>, CoreError> {
        match (self.actor_id, self.roles) {
            (Some(id), roles) => {
                let roles = parse_roles(split_list(roles.as_deref().unwrap_or("")))?;
                Ok(Some(Actor::new(UserId::from_uuid(id), roles)))
            }
            (None, None) => Ok(None),
            (None, Some(_)) => Err(CoreError::BadRequest(
                "roles を指定する場合は actor_id も指定してください".to_string(),
            )),
        }
    }
}

/// 一覧検索クエリパラメータ
///
/// `status` はカンマ区切りで複数指定できる（いずれかに一致）。
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub department: Option<String>,
    pub requested_by: Option<Uuid>,
    pub responsible_employee: Option<Uuid>,
    pub from_since: Option<DateTime<Utc>>,
    pub from_until: Option<DateTime<Utc>>,
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_roles<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<RoleSet, CoreError> {
    names
        .into_iter()
        .map(|name| name.parse::<Role>())
        .collect::<Result<RoleSet, _>>()
        .map_err(CoreError::from)
}

/// パスの操作名（`pre-approve` など）を解決する。未知の操作は 404。
fn parse_action(name: &str) -> Result<OvertimeAction, CoreError> {
    name.parse()
        .map_err(|_| CoreError::NotFound(format!("不明な操作です: {}", name)))
}

// ===== レスポンス =====

/// 監査スタンプ DTO
#[derive(Debug, Serialize)]
pub struct StampDto {
    pub at: String,
    pub by: String,
}

impl From<&Stamp> for StampDto {
    fn from(stamp: &Stamp) -> Self {
        Self {
            at: stamp.at.to_rfc3339(),
            by: stamp.by.to_string(),
        }
    }
}

/// 残業申請 DTO
#[derive(Debug, Serialize)]
pub struct OvertimeRequestDto {
    pub id: String,
    pub department: String,
    pub status: String,
    pub version: i32,
    pub requested_by: String,
    pub responsible_employee: String,
    pub from: String,
    pub to: String,
    pub number_of_employees: u32,
    pub number_of_shifts: u32,
    pub reason: Option<String>,
    pub pre_approved: Option<StampDto>,
    pub approved: Option<StampDto>,
    pub completed: Option<StampDto>,
    pub accounted: Option<StampDto>,
    pub canceled: Option<StampDto>,
    pub reactivated: Option<StampDto>,
    pub created_at: String,
    pub updated_at: String,
    /// アクターが今実行できる操作（アクター指定時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_actions: Option<Vec<String>>,
}

impl From<&OvertimeRequest> for OvertimeRequestDto {
    fn from(request: &OvertimeRequest) -> Self {
        Self {
            id: request.id().to_string(),
            department: request.department().to_string(),
            status: request.status().to_string(),
            version: request.version().as_i32(),
            requested_by: request.requested_by().to_string(),
            responsible_employee: request.responsible_employee().to_string(),
            from: request.window().from().to_rfc3339(),
            to: request.window().to().to_rfc3339(),
            number_of_employees: request.number_of_employees().as_u32(),
            number_of_shifts: request.number_of_shifts().as_u32(),
            reason: request.reason().map(ToString::to_string),
            pre_approved: request.pre_approved().map(StampDto::from),
            approved: request.approved().map(StampDto::from),
            completed: request.completed().map(StampDto::from),
            accounted: request.accounted().map(StampDto::from),
            canceled: request.canceled().map(StampDto::from),
            reactivated: request.reactivated().map(StampDto::from),
            created_at: request.created_at().to_rfc3339(),
            updated_at: request.updated_at().to_rfc3339(),
            available_actions: None,
        }
    }
}

impl OvertimeRequestDto {
    /// アクターが実行できる操作を付与して変換する
    fn with_actions(request: &OvertimeRequest, actor: &Actor) -> Self {
        Self {
            available_actions: Some(
                available_actions(actor, request)
                    .into_iter()
                    .map(|a| a.as_str().to_string())
                    .collect(),
            ),
            ..Self::from(request)
        }
    }
}

/// 一括遷移でスキップした申請 DTO
#[derive(Debug, Serialize)]
pub struct SkippedItemDto {
    pub id:     String,
    /// `not-found` / `forbidden` / `invalid-status` / `conflict`
    pub reason: String,
    /// `invalid-status` の場合の現在のステータス
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// 一括遷移結果 DTO
#[derive(Debug, Serialize)]
pub struct BulkTransitionDto {
    pub action:         String,
    pub modified_count: usize,
    pub modified:       Vec<String>,
    pub skipped:        Vec<SkippedItemDto>,
}

impl From<BulkTransitionOutcome> for BulkTransitionDto {
    fn from(outcome: BulkTransitionOutcome) -> Self {
        Self {
            action:         outcome.action.as_str().to_string(),
            modified_count: outcome.modified_count,
            modified:       outcome.modified.iter().map(|id| id.to_string()).collect(),
            skipped:        outcome
                .skipped
                .into_iter()
                .map(|item| SkippedItemDto {
                    id:     item.id.to_string(),
                    reason: item.reason.code().to_string(),
                    status: match item.reason {
                        SkipReason::InvalidStatus(status) => Some(status.to_string()),
                        _ => None,
                    },
                })
                .collect(),
        }
    }
}

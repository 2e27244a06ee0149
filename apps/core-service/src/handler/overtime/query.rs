//! 残業申請ハンドラの読み取り操作

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use overtimeflow_domain::{
    department::Department,
    overtime::{OvertimeRequestId, OvertimeStatus},
    user::UserId,
};
use overtimeflow_infra::repository::OvertimeRequestFilter;
use overtimeflow_shared::ApiResponse;
use uuid::Uuid;

use super::{ActorQuery, ListQuery, OvertimeRequestDto, OvertimeState, split_list};
use crate::error::CoreError;

impl ListQuery {
    fn into_filter(self) -> Result<OvertimeRequestFilter, CoreError> {
        let statuses = split_list(self.status.as_deref().unwrap_or(""))
            .map(|s| s.parse::<OvertimeStatus>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OvertimeRequestFilter {
            statuses,
            department: self.department.map(Department::new).transpose()?,
            requested_by: self.requested_by.map(UserId::from_uuid),
            responsible_employee: self.responsible_employee.map(UserId::from_uuid),
            from_since: self.from_since,
            from_until: self.from_until,
        })
    }
}

/// 残業申請を 1 件取得する
///
/// ## エンドポイント
/// GET /internal/overtime-requests/{id}?actor_id=...&roles=...
///
/// アクターを指定すると、そのアクターが今実行できる操作を `available_actions` に含める。
pub async fn get_request(
    State(state): State<Arc<OvertimeState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, CoreError> {
    let actor = query.into_actor()?;

    let request = state
        .usecase
        .get_request(&OvertimeRequestId::from_uuid(id))
        .await?;

    let dto = match &actor {
        Some(actor) => OvertimeRequestDto::with_actions(&request, actor),
        None => OvertimeRequestDto::from(&request),
    };
    Ok((StatusCode::OK, Json(ApiResponse::new(dto))).into_response())
}

/// 残業申請を一覧取得する（新しい順）
///
/// ## エンドポイント
/// GET /internal/overtime-requests?status=pending,approved&department=logistics
pub async fn list_requests(
    State(state): State<Arc<OvertimeState>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, CoreError> {
    let filter = query.into_filter()?;

    let requests = state.usecase.list_requests(&filter).await?;

    let response = ApiResponse::new(
        requests
            .iter()
            .map(OvertimeRequestDto::from)
            .collect::<Vec<_>>(),
    );
    Ok((StatusCode::OK, Json(response)).into_response())
}

//! 残業申請ハンドラの状態変更操作

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use overtimeflow_domain::{
    department::Department,
    overtime::{OvertimeRequestChanges, OvertimeRequestId},
    user::UserId,
    value_objects::{Headcount, Reason, Version, WorkWindow},
};
use overtimeflow_shared::ApiResponse;
use uuid::Uuid;

use super::{
    BulkTransitionDto,
    BulkTransitionRequest,
    CreateOvertimeRequest,
    OvertimeRequestDto,
    OvertimeState,
    TransitionRequest,
    UpdateOvertimeRequest,
    parse_action,
};
use crate::{
    error::CoreError,
    usecase::{CreateOvertimeInput, UpdateOvertimeInput},
};

fn parse_version(version: i32) -> Result<Version, CoreError> {
    Version::try_from(version)
        .map_err(|e| CoreError::BadRequest(format!("不正なバージョン: {}", e)))
}

/// 残業申請を作成する
///
/// ## エンドポイント
/// POST /internal/overtime-requests
pub async fn create_request(
    State(state): State<Arc<OvertimeState>>,
    Json(req): Json<CreateOvertimeRequest>,
) -> Result<Response, CoreError> {
    let actor = req.actor.into_actor()?;
    let input = CreateOvertimeInput {
        department:           Department::new(req.department)?,
        responsible_employee: UserId::from_uuid(req.responsible_employee),
        window:               WorkWindow::new(req.from, req.to)?,
        number_of_employees:  Headcount::new(req.number_of_employees, "人数")?,
        number_of_shifts:     Headcount::new(req.number_of_shifts, "シフト数")?,
        reason:               match req.reason {
            Some(reason) => Reason::parse(reason)?,
            None => None,
        },
    };

    let request = state.usecase.create_request(input, &actor).await?;

    let response = ApiResponse::new(OvertimeRequestDto::with_actions(&request, &actor));
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// 申請中の残業申請を変更する
///
/// ## エンドポイント
/// PATCH /internal/overtime-requests/{id}
pub async fn update_request(
    State(state): State<Arc<OvertimeState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOvertimeRequest>,
) -> Result<Response, CoreError> {
    let actor = req.actor.into_actor()?;
    let window = match (req.from, req.to) {
        (Some(from), Some(to)) => Some(WorkWindow::new(from, to)?),
        (None, None) => None,
        _ => {
            return Err(CoreError::BadRequest(
                "from と to は同時に指定してください".to_string(),
            ));
        }
    };
    let changes = OvertimeRequestChanges {
        window,
        number_of_employees: req
            .number_of_employees
            .map(|n| Headcount::new(n, "人数"))
            .transpose()?,
        number_of_shifts: req
            .number_of_shifts
            .map(|n| Headcount::new(n, "シフト数"))
            .transpose()?,
        reason: req.reason.map(Reason::parse).transpose()?,
        responsible_employee: req.responsible_employee.map(UserId::from_uuid),
    };
    let input = UpdateOvertimeInput {
        changes,
        expected_version: parse_version(req.version)?,
    };

    let request = state
        .usecase
        .update_request(OvertimeRequestId::from_uuid(id), input, &actor)
        .await?;

    let response = ApiResponse::new(OvertimeRequestDto::with_actions(&request, &actor));
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// 残業申請に操作を適用する
///
/// ## エンドポイント
/// POST /internal/overtime-requests/{id}/{action}
///
/// `action` は `pre-approve` / `approve` / `complete` / `mark-accounted` /
/// `cancel` / `reactivate`。
pub async fn transition_request(
    State(state): State<Arc<OvertimeState>>,
    Path((id, action)): Path<(Uuid, String)>,
    Json(req): Json<TransitionRequest>,
) -> Result<Response, CoreError> {
    let action = parse_action(&action)?;
    let actor = req.actor.into_actor()?;
    let expected_version = req.version.map(parse_version).transpose()?;

    let request = state
        .usecase
        .transition(
            action,
            OvertimeRequestId::from_uuid(id),
            &actor,
            expected_version,
        )
        .await?;

    let response = ApiResponse::new(OvertimeRequestDto::with_actions(&request, &actor));
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// 複数の残業申請に同じ操作を適用する
///
/// ## エンドポイント
/// POST /internal/overtime-requests/bulk/{action}
///
/// 条件を満たさない申請はスキップし、`skipped` に理由を返す。
pub async fn bulk_transition_requests(
    State(state): State<Arc<OvertimeState>>,
    Path(action): Path<String>,
    Json(req): Json<BulkTransitionRequest>,
) -> Result<Response, CoreError> {
    let action = parse_action(&action)?;
    let actor = req.actor.into_actor()?;
    let ids = req.ids.into_iter().map(OvertimeRequestId::from_uuid).collect();

    let outcome = state.usecase.bulk_transition(action, ids, &actor).await?;

    let response = ApiResponse::new(BulkTransitionDto::from(outcome));
    Ok((StatusCode::OK, Json(response)).into_response())
}

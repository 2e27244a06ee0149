//! 残業申請ユースケースの状態変更操作

use std::collections::HashMap;

use itertools::Itertools;
use overtimeflow_domain::{
    overtime::{
        NewOvertimeRequest,
        OvertimeAction,
        OvertimeRequest,
        OvertimeRequestId,
        TransitionError,
    },
    session::Actor,
    value_objects::Version,
};
use overtimeflow_shared::{event_log::event, log_business_event};

use super::{
    BulkTransitionOutcome,
    CreateOvertimeInput,
    OvertimeUseCaseImpl,
    SkipReason,
    SkippedItem,
    UpdateOvertimeInput,
    event_action,
    rejection_reason,
};
use crate::{error::CoreError, usecase::helpers::FindResultExt};

impl OvertimeUseCaseImpl {
    /// 残業申請を作成する（申請中）
    ///
    /// 申請者は操作中のアクター。ロールは問わない。
    pub async fn create_request(
        &self,
        input: CreateOvertimeInput,
        actor: &Actor,
    ) -> Result<OvertimeRequest, CoreError> {
        let request = OvertimeRequest::new(NewOvertimeRequest {
            id: OvertimeRequestId::new(),
            department: input.department,
            requested_by: actor.user_id().clone(),
            responsible_employee: input.responsible_employee,
            window: input.window,
            number_of_employees: input.number_of_employees,
            number_of_shifts: input.number_of_shifts,
            reason: input.reason,
            now: self.clock.now(),
        });

        self.repo.insert(&request).await?;

        log_business_event!(
            event.category = event::category::OVERTIME,
            event.action = event::action::OVERTIME_CREATED,
            event.entity_type = event::entity_type::OVERTIME_REQUEST,
            event.entity_id = %request.id(),
            event.actor_id = %actor.user_id(),
            department = %request.department(),
            event.result = event::result::SUCCESS,
            "残業申請を作成"
        );

        Ok(request)
    }

    /// 申請中の残業申請の内容を変更する
    ///
    /// ## エラー
    ///
    /// - 申請が存在しない: `NotFound`
    /// - バージョン不一致: `Conflict`
    /// - 申請者本人でも admin でもない: `Forbidden`
    /// - 申請中ではない: `InvalidStatus`
    pub async fn update_request(
        &self,
        id: OvertimeRequestId,
        input: UpdateOvertimeInput,
        actor: &Actor,
    ) -> Result<OvertimeRequest, CoreError> {
        if input.changes.is_empty() {
            return Err(CoreError::BadRequest(
                "変更する項目を 1 つ以上指定してください".to_string(),
            ));
        }

        let request = self.repo.find_by_id(&id).await.or_not_found("残業申請")?;
        check_version(&request, input.expected_version)?;

        let expected_version = request.version();
        let updated = request.edited(input.changes, actor, self.clock.now())?;
        self.repo
            .update_with_version_check(&updated, expected_version)
            .await?;

        log_business_event!(
            event.category = event::category::OVERTIME,
            event.action = event::action::OVERTIME_UPDATED,
            event.entity_type = event::entity_type::OVERTIME_REQUEST,
            event.entity_id = %id,
            event.actor_id = %actor.user_id(),
            event.result = event::result::SUCCESS,
            "残業申請を変更"
        );

        Ok(updated)
    }

    /// 1 件の残業申請に操作を適用する
    ///
    /// `expected_version` を指定した場合、ロールの判定を通過した後に
    /// 読み込んだ申請のバージョンと比較し、一致しなければ `Conflict` を返す。
    ///
    /// ## エラー
    ///
    /// - 申請が存在しない: `NotFound`
    /// - ロール不足: `Forbidden`
    /// - 遷移元のステータスではない: `InvalidStatus`
    /// - 同時更新: `Conflict`
    pub async fn transition(
        &self,
        action: OvertimeAction,
        id: OvertimeRequestId,
        actor: &Actor,
        expected_version: Option<Version>,
    ) -> Result<OvertimeRequest, CoreError> {
        let request = self.repo.find_by_id(&id).await.or_not_found("残業申請")?;
        let reject = |e: &TransitionError| {
            log_business_event!(
                event.category = event::category::OVERTIME,
                event.action = event_action(action),
                event.entity_type = event::entity_type::OVERTIME_REQUEST,
                event.entity_id = %id,
                event.actor_id = %actor.user_id(),
                event.result = event::result::FAILURE,
                event.reason = rejection_reason(e),
                "残業申請の遷移を拒否"
            );
        };

        if !action.rule().permits(actor, &request) {
            let err = TransitionError::Forbidden { action };
            reject(&err);
            return Err(err.into());
        }
        if let Some(expected) = expected_version {
            check_version(&request, expected)?;
        }

        let from = request.status();
        let expected = request.version();
        let updated = request
            .apply(action, actor, self.clock.now())
            .inspect_err(reject)?;
        self.repo.update_with_version_check(&updated, expected).await?;

        log_business_event!(
            event.category = event::category::OVERTIME,
            event.action = event_action(action),
            event.entity_type = event::entity_type::OVERTIME_REQUEST,
            event.entity_id = %id,
            event.actor_id = %actor.user_id(),
            from_status = %from,
            to_status = %updated.status(),
            event.result = event::result::SUCCESS,
            "残業申請を遷移"
        );

        Ok(updated)
    }

    /// 複数の残業申請に同じ操作を適用する
    ///
    /// 各申請に単体と同じ判定を行い、条件を満たさない申請はスキップする。
    /// バッチ全体ではアトミックではなく、保存済みの申請は後続の失敗で巻き戻らない。
    ///
    /// ## エラー
    ///
    /// - ID が空: `BadRequest`
    /// - 当事者条件のない操作で、アクターが必要なロールを 1 つも持たない: `Forbidden`
    /// - 1 件も変更できなかった: `InvalidStatus`
    /// - データベースエラー: その時点で中断する
    pub async fn bulk_transition(
        &self,
        action: OvertimeAction,
        ids: Vec<OvertimeRequestId>,
        actor: &Actor,
    ) -> Result<BulkTransitionOutcome, CoreError> {
        if ids.is_empty() {
            return Err(CoreError::BadRequest(
                "対象の申請 ID を 1 つ以上指定してください".to_string(),
            ));
        }

        let rule = action.rule();
        if rule.parties.is_empty() && !actor.has_any(rule.roles) {
            return Err(TransitionError::Forbidden { action }.into());
        }

        let ids: Vec<OvertimeRequestId> = ids.into_iter().unique().collect();
        let mut found: HashMap<OvertimeRequestId, OvertimeRequest> = self
            .repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|r| (r.id().clone(), r))
            .collect();

        let now = self.clock.now();
        let mut modified = Vec::new();
        let mut skipped = Vec::new();

        for id in ids {
            let Some(request) = found.remove(&id) else {
                skipped.push(SkippedItem {
                    id,
                    reason: SkipReason::NotFound,
                });
                continue;
            };

            let from = request.status();
            let expected = request.version();
            let updated = match request.apply(action, actor, now) {
                Ok(updated) => updated,
                Err(TransitionError::Forbidden { .. }) => {
                    skipped.push(SkippedItem {
                        id,
                        reason: SkipReason::Forbidden,
                    });
                    continue;
                }
                Err(TransitionError::InvalidStatus { status, .. }) => {
                    skipped.push(SkippedItem {
                        id,
                        reason: SkipReason::InvalidStatus(status),
                    });
                    continue;
                }
            };

            match self.repo.update_with_version_check(&updated, expected).await {
                Ok(()) => {
                    log_business_event!(
                        event.category = event::category::OVERTIME,
                        event.action = event_action(action),
                        event.entity_type = event::entity_type::OVERTIME_REQUEST,
                        event.entity_id = %id,
                        event.actor_id = %actor.user_id(),
                        from_status = %from,
                        to_status = %updated.status(),
                        event.result = event::result::SUCCESS,
                        "残業申請を遷移（一括）"
                    );
                    modified.push(id);
                }
                Err(e) if e.is_conflict() => skipped.push(SkippedItem {
                    id,
                    reason: SkipReason::Conflict,
                }),
                Err(e) => return Err(e.into()),
            }
        }

        let modified_count = modified.len();
        log_business_event!(
            event.category = event::category::OVERTIME,
            event.action = event::action::OVERTIME_BULK_TRANSITIONED,
            event.entity_type = event::entity_type::OVERTIME_REQUEST,
            event.actor_id = %actor.user_id(),
            transition = action.as_str(),
            modified_count,
            skipped_count = skipped.len(),
            event.result = if modified_count > 0 {
                event::result::SUCCESS
            } else {
                event::result::FAILURE
            },
            "残業申請を一括遷移"
        );

        if modified_count == 0 {
            return Err(CoreError::InvalidStatus(format!(
                "{} を実行できる申請がありません（{} 件すべてスキップ）",
                action,
                skipped.len()
            )));
        }

        Ok(BulkTransitionOutcome {
            action,
            modified_count,
            modified,
            skipped,
        })
    }
}

fn check_version(request: &OvertimeRequest, expected: Version) -> Result<(), CoreError> {
    if request.version() != expected {
        return Err(CoreError::Conflict(
            "申請は既に更新されています。最新の情報を取得してください。".to_string(),
        ));
    }
    Ok(())
}

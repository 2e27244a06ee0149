//! 残業申請ユースケースの読み取り操作

use overtimeflow_domain::overtime::{OvertimeRequest, OvertimeRequestId};
use overtimeflow_infra::repository::OvertimeRequestFilter;

use super::OvertimeUseCaseImpl;
use crate::{error::CoreError, usecase::helpers::FindResultExt};

impl OvertimeUseCaseImpl {
    /// 残業申請を 1 件取得する
    pub async fn get_request(&self, id: &OvertimeRequestId) -> Result<OvertimeRequest, CoreError> {
        self.repo.find_by_id(id).await.or_not_found("残業申請")
    }

    /// 条件に一致する残業申請を新しい順に取得する
    pub async fn list_requests(
        &self,
        filter: &OvertimeRequestFilter,
    ) -> Result<Vec<OvertimeRequest>, CoreError> {
        let inverted = matches!(
            (filter.from_since, filter.from_until),
            (Some(since), Some(until)) if since >= until
        );
        if inverted {
            return Err(CoreError::BadRequest(
                "from_since は from_until より前である必要があります".to_string(),
            ));
        }

        Ok(self.repo.find_by_filter(filter).await?)
    }
}

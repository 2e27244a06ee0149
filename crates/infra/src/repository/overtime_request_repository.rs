//! # OvertimeRequestRepository
//!
//! 残業申請の永続化を担当するリポジトリ。
//!
//! 監査スタンプは `<action>_at` / `<action>_by` の 2 カラムで保持する。
//! 書き込みは [`OvertimeRequest::to_record`]、読み込みは [`OvertimeRequest::from_db`]
//! を経由するため、ADT とテーブルの対応はドメイン側の 1 か所に閉じる。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use overtimeflow_domain::{
    DomainError,
    department::Department,
    overtime::{OvertimeRequest, OvertimeRequestId, OvertimeRequestRecord, OvertimeStatus},
    user::UserId,
    value_objects::{Headcount, Reason, Stamp, Version, WorkWindow},
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::InfraError;

/// 一覧検索の条件
///
/// 未指定（`None` / 空）の条件は絞り込みに使わない。
/// 結果は `created_at` の降順（新しい順）で返す。
#[derive(Debug, Clone, Default)]
pub struct OvertimeRequestFilter {
    /// いずれかに一致
    pub statuses: Vec<OvertimeStatus>,
    pub department: Option<Department>,
    pub requested_by: Option<UserId>,
    pub responsible_employee: Option<UserId>,
    /// 作業開始日時の下限（この日時を含む）
    pub from_since: Option<DateTime<Utc>>,
    /// 作業開始日時の上限（この日時を含まない）
    pub from_until: Option<DateTime<Utc>>,
}

impl OvertimeRequestFilter {
    /// 申請が条件を満たすか
    ///
    /// SQL の WHERE 句と同じ判定をメモリ上で行う（モック用）。
    pub fn matches(&self, request: &OvertimeRequest) -> bool {
        let from = request.window().from();

        (self.statuses.is_empty() || self.statuses.contains(&request.status()))
            && self
                .department
                .as_ref()
                .is_none_or(|d| d == request.department())
            && self
                .requested_by
                .as_ref()
                .is_none_or(|u| u == request.requested_by())
            && self
                .responsible_employee
                .as_ref()
                .is_none_or(|u| u == request.responsible_employee())
            && self.from_since.is_none_or(|since| from >= since)
            && self.from_until.is_none_or(|until| from < until)
    }
}

/// 残業申請リポジトリトレイト
#[async_trait]
pub trait OvertimeRequestRepository: Send + Sync {
    /// 新規作成
    async fn insert(&self, request: &OvertimeRequest) -> Result<(), InfraError>;

    /// 楽観的ロック付きで更新する
    ///
    /// DB 上の version が `expected_version` と一致する場合のみ更新する。
    /// 一致しない（または行が存在しない）場合は `InfraErrorKind::Conflict` を返す。
    async fn update_with_version_check(
        &self,
        request: &OvertimeRequest,
        expected_version: Version,
    ) -> Result<(), InfraError>;

    /// ID で取得
    async fn find_by_id(
        &self,
        id: &OvertimeRequestId,
    ) -> Result<Option<OvertimeRequest>, InfraError>;

    /// 複数 ID で一括取得
    ///
    /// 存在しない ID は結果に含まれない。順序は保証しない。
    async fn find_by_ids(
        &self,
        ids: &[OvertimeRequestId],
    ) -> Result<Vec<OvertimeRequest>, InfraError>;

    /// 条件で一覧取得（新しい順）
    async fn find_by_filter(
        &self,
        filter: &OvertimeRequestFilter,
    ) -> Result<Vec<OvertimeRequest>, InfraError>;
}

/// `overtime_requests` テーブルの 1 行
#[derive(Debug, FromRow)]
struct OvertimeRequestRow {
    id: Uuid,
    department: String,
    requested_by: Uuid,
    responsible_employee: Uuid,
    work_from: DateTime<Utc>,
    work_to: DateTime<Utc>,
    number_of_employees: i32,
    number_of_shifts: i32,
    reason: Option<String>,
    status: String,
    version: i32,
    pre_approved_at: Option<DateTime<Utc>>,
    pre_approved_by: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<Uuid>,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<Uuid>,
    accounted_at: Option<DateTime<Utc>>,
    accounted_by: Option<Uuid>,
    canceled_at: Option<DateTime<Utc>>,
    canceled_by: Option<Uuid>,
    reactivated_at: Option<DateTime<Utc>>,
    reactivated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn stamp(
    column: &str,
    at: Option<DateTime<Utc>>,
    by: Option<Uuid>,
) -> Result<Option<Stamp>, DomainError> {
    Stamp::from_columns(column, at, by.map(UserId::from_uuid))
}

impl TryFrom<OvertimeRequestRow> for OvertimeRequest {
    type Error = InfraError;

    fn try_from(row: OvertimeRequestRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupted = |e: DomainError| InfraError::corrupted(id, e);

        let record = OvertimeRequestRecord {
            id: OvertimeRequestId::from_uuid(row.id),
            department: Department::new(row.department.as_str()).map_err(corrupted)?,
            requested_by: UserId::from_uuid(row.requested_by),
            responsible_employee: UserId::from_uuid(row.responsible_employee),
            window: WorkWindow::new(row.work_from, row.work_to).map_err(corrupted)?,
            number_of_employees: Headcount::new(row.number_of_employees.into(), "人数")
                .map_err(corrupted)?,
            number_of_shifts: Headcount::new(row.number_of_shifts.into(), "シフト数")
                .map_err(corrupted)?,
            reason: match row.reason.as_deref() {
                Some(reason) => Reason::parse(reason).map_err(corrupted)?,
                None => None,
            },
            status: row.status.parse().map_err(corrupted)?,
            version: Version::try_from(row.version).map_err(corrupted)?,
            pre_approved: stamp("pre_approved", row.pre_approved_at, row.pre_approved_by).map_err(corrupted)?,
            approved: stamp("approved", row.approved_at, row.approved_by).map_err(corrupted)?,
            completed: stamp("completed", row.completed_at, row.completed_by).map_err(corrupted)?,
            accounted: stamp("accounted", row.accounted_at, row.accounted_by).map_err(corrupted)?,
            canceled: stamp("canceled", row.canceled_at, row.canceled_by).map_err(corrupted)?,
            reactivated: stamp("reactivated", row.reactivated_at, row.reactivated_by).map_err(corrupted)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        OvertimeRequest::from_db(record).map_err(corrupted)
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, department, requested_by, responsible_employee,
        work_from, work_to, number_of_employees, number_of_shifts, reason,
        status, version,
        pre_approved_at, pre_approved_by,
        approved_at, approved_by,
        completed_at, completed_by,
        accounted_at, accounted_by,
        canceled_at, canceled_by,
        reactivated_at, reactivated_by,
        created_at, updated_at
    FROM overtime_requests
"#;

fn stamp_at(stamp: &Option<Stamp>) -> Option<DateTime<Utc>> {
    stamp.as_ref().map(|s| s.at)
}

fn stamp_by(stamp: &Option<Stamp>) -> Option<Uuid> {
    stamp.as_ref().map(|s| *s.by.as_uuid())
}

/// PostgreSQL 実装の OvertimeRequestRepository
#[derive(Debug, Clone)]
pub struct PostgresOvertimeRequestRepository {
    pool: PgPool,
}

impl PostgresOvertimeRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OvertimeRequestRepository for PostgresOvertimeRequestRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(request_id = %request.id()))]
    async fn insert(&self, request: &OvertimeRequest) -> Result<(), InfraError> {
        let r = request.to_record();

        sqlx::query(
            r#"
            INSERT INTO overtime_requests (
                id, department, requested_by, responsible_employee,
                work_from, work_to, number_of_employees, number_of_shifts, reason,
                status, version,
                pre_approved_at, pre_approved_by,
                approved_at, approved_by,
                completed_at, completed_by,
                accounted_at, accounted_by,
                canceled_at, canceled_by,
                reactivated_at, reactivated_by,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.department.as_str())
        .bind(r.requested_by.as_uuid())
        .bind(r.responsible_employee.as_uuid())
        .bind(r.window.from())
        .bind(r.window.to())
        .bind(r.number_of_employees.as_i32())
        .bind(r.number_of_shifts.as_i32())
        .bind(r.reason.as_ref().map(|reason| reason.as_str()))
        .bind(r.status.as_str())
        .bind(r.version.as_i32())
        .bind(stamp_at(&r.pre_approved))
        .bind(stamp_by(&r.pre_approved))
        .bind(stamp_at(&r.approved))
        .bind(stamp_by(&r.approved))
        .bind(stamp_at(&r.completed))
        .bind(stamp_by(&r.completed))
        .bind(stamp_at(&r.accounted))
        .bind(stamp_by(&r.accounted))
        .bind(stamp_at(&r.canceled))
        .bind(stamp_by(&r.canceled))
        .bind(stamp_at(&r.reactivated))
        .bind(stamp_by(&r.reactivated))
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(request_id = %request.id(), %expected_version)
    )]
    async fn update_with_version_check(
        &self,
        request: &OvertimeRequest,
        expected_version: Version,
    ) -> Result<(), InfraError> {
        let r = request.to_record();

        let result = sqlx::query(
            r#"
            UPDATE overtime_requests SET
                responsible_employee = $2,
                work_from = $3,
                work_to = $4,
                number_of_employees = $5,
                number_of_shifts = $6,
                reason = $7,
                status = $8,
                version = $9,
                pre_approved_at = $10,
                pre_approved_by = $11,
                approved_at = $12,
                approved_by = $13,
                completed_at = $14,
                completed_by = $15,
                accounted_at = $16,
                accounted_by = $17,
                canceled_at = $18,
                canceled_by = $19,
                reactivated_at = $20,
                reactivated_by = $21,
                updated_at = $22
            WHERE id = $1 AND version = $23
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.responsible_employee.as_uuid())
        .bind(r.window.from())
        .bind(r.window.to())
        .bind(r.number_of_employees.as_i32())
        .bind(r.number_of_shifts.as_i32())
        .bind(r.reason.as_ref().map(|reason| reason.as_str()))
        .bind(r.status.as_str())
        .bind(r.version.as_i32())
        .bind(stamp_at(&r.pre_approved))
        .bind(stamp_by(&r.pre_approved))
        .bind(stamp_at(&r.approved))
        .bind(stamp_by(&r.approved))
        .bind(stamp_at(&r.completed))
        .bind(stamp_by(&r.completed))
        .bind(stamp_at(&r.accounted))
        .bind(stamp_by(&r.accounted))
        .bind(stamp_at(&r.canceled))
        .bind(stamp_by(&r.canceled))
        .bind(stamp_at(&r.reactivated))
        .bind(stamp_by(&r.reactivated))
        .bind(r.updated_at)
        .bind(expected_version.as_i32())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict(
                request.id(),
                expected_version.as_u32(),
            ));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(
        &self,
        id: &OvertimeRequestId,
    ) -> Result<Option<OvertimeRequest>, InfraError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");

        let row = sqlx::query_as::<_, OvertimeRequestRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(OvertimeRequest::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(count = ids.len()))]
    async fn find_by_ids(
        &self,
        ids: &[OvertimeRequestId],
    ) -> Result<Vec<OvertimeRequest>, InfraError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{SELECT_COLUMNS} WHERE id = ANY($1)");
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query_as::<_, OvertimeRequestRow>(&sql)
            .bind(uuids)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(OvertimeRequest::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_filter(
        &self,
        filter: &OvertimeRequestFilter,
    ) -> Result<Vec<OvertimeRequest>, InfraError> {
        let sql = format!(
            r#"{SELECT_COLUMNS}
            WHERE ($1::text[] IS NULL OR status = ANY($1))
              AND ($2::text IS NULL OR department = $2)
              AND ($3::uuid IS NULL OR requested_by = $3)
              AND ($4::uuid IS NULL OR responsible_employee = $4)
              AND ($5::timestamptz IS NULL OR work_from >= $5)
              AND ($6::timestamptz IS NULL OR work_from < $6)
            ORDER BY created_at DESC, id DESC
            "#
        );
        let statuses: Option<Vec<String>> = (!filter.statuses.is_empty()).then(|| {
            filter
                .statuses
                .iter()
                .map(|s| s.as_str().to_string())
                .collect()
        });

        let rows = sqlx::query_as::<_, OvertimeRequestRow>(&sql)
            .bind(statuses)
            .bind(filter.department.as_ref().map(|d| d.as_str()))
            .bind(filter.requested_by.as_ref().map(|u| *u.as_uuid()))
            .bind(filter.responsible_employee.as_ref().map(|u| *u.as_uuid()))
            .bind(filter.from_since)
            .bind(filter.from_until)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(OvertimeRequest::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use overtimeflow_domain::{
        overtime::{NewOvertimeRequest, OvertimeAction},
        role::{Role, RoleSet},
        session::Actor,
    };
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn request(department: &str, now: DateTime<Utc>) -> OvertimeRequest {
        OvertimeRequest::new(NewOvertimeRequest {
            id: OvertimeRequestId::new(),
            department: Department::new(department).unwrap(),
            requested_by: UserId::new(),
            responsible_employee: UserId::new(),
            window: WorkWindow::new(now, now + Duration::hours(2)).unwrap(),
            number_of_employees: Headcount::new(2, "人数").unwrap(),
            number_of_shifts: Headcount::new(1, "シフト数").unwrap(),
            reason: None,
            now,
        })
    }

    fn row_from(request: &OvertimeRequest) -> OvertimeRequestRow {
        let r = request.to_record();
        OvertimeRequestRow {
            id: *r.id.as_uuid(),
            department: r.department.as_str().to_string(),
            requested_by: *r.requested_by.as_uuid(),
            responsible_employee: *r.responsible_employee.as_uuid(),
            work_from: r.window.from(),
            work_to: r.window.to(),
            number_of_employees: r.number_of_employees.as_i32(),
            number_of_shifts: r.number_of_shifts.as_i32(),
            reason: r.reason.map(|reason| reason.to_string()),
            status: r.status.as_str().to_string(),
            version: r.version.as_i32(),
            pre_approved_at: stamp_at(&r.pre_approved),
            pre_approved_by: stamp_by(&r.pre_approved),
            approved_at: stamp_at(&r.approved),
            approved_by: stamp_by(&r.approved),
            completed_at: stamp_at(&r.completed),
            completed_by: stamp_by(&r.completed),
            accounted_at: stamp_at(&r.accounted),
            accounted_by: stamp_by(&r.accounted),
            canceled_at: stamp_at(&r.canceled),
            canceled_by: stamp_by(&r.canceled),
            reactivated_at: stamp_at(&r.reactivated),
            reactivated_by: stamp_by(&r.reactivated),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }

    mod row_conversion {
        use pretty_assertions::assert_eq;

        use super::*;

        #[rstest]
        fn test_行からエンティティに復元できる(now: DateTime<Utc>) {
            let admin = Actor::new(UserId::new(), RoleSet::from_iter([Role::Admin]));
            let original = request("production", now)
                .apply(OvertimeAction::PreApprove, &admin, now)
                .unwrap();

            let restored = OvertimeRequest::try_from(row_from(&original)).unwrap();

            assert_eq!(restored, original);
        }

        #[rstest]
        fn test_不正なステータスは破損エラー(now: DateTime<Utc>) {
            let row = OvertimeRequestRow {
                status: "archived".to_string(),
                ..row_from(&request("production", now))
            };

            let err = OvertimeRequest::try_from(row).unwrap_err();

            assert!(matches!(err.kind(), crate::InfraErrorKind::Corrupted { .. }));
        }

        #[rstest]
        fn test_片方だけのスタンプは破損エラー(now: DateTime<Utc>) {
            let row = OvertimeRequestRow {
                canceled_at: Some(now),
                ..row_from(&request("production", now))
            };

            assert!(OvertimeRequest::try_from(row).is_err());
        }

        #[rstest]
        fn test_不変条件違反は破損エラー(now: DateTime<Utc>) {
            // 承認スタンプのない approved
            let row = OvertimeRequestRow {
                status: "approved".to_string(),
                ..row_from(&request("logistics", now))
            };

            assert!(OvertimeRequest::try_from(row).is_err());
        }
    }

    mod filter {
        use super::*;

        #[rstest]
        fn test_空のフィルタはすべてに一致する(now: DateTime<Utc>) {
            assert!(OvertimeRequestFilter::default().matches(&request("production", now)));
        }

        #[rstest]
        fn test_ステータスはいずれかに一致すればよい(now: DateTime<Utc>) {
            let filter = OvertimeRequestFilter {
                statuses: vec![OvertimeStatus::Approved, OvertimeStatus::Pending],
                ..Default::default()
            };
            let canceled_only = OvertimeRequestFilter {
                statuses: vec![OvertimeStatus::Canceled],
                ..Default::default()
            };

            assert!(filter.matches(&request("production", now)));
            assert!(!canceled_only.matches(&request("production", now)));
        }

        #[rstest]
        fn test_部署で絞り込む(now: DateTime<Utc>) {
            let filter = OvertimeRequestFilter {
                department: Some(Department::new("logistics").unwrap()),
                ..Default::default()
            };

            assert!(filter.matches(&request("logistics", now)));
            assert!(!filter.matches(&request("production", now)));
        }

        #[rstest]
        fn test_作業開始日時の範囲は下限を含み上限を含まない(now: DateTime<Utc>) {
            let target = request("production", now);
            let including = OvertimeRequestFilter {
                from_since: Some(now),
                from_until: Some(now + Duration::seconds(1)),
                ..Default::default()
            };
            let excluding = OvertimeRequestFilter {
                from_until: Some(now),
                ..Default::default()
            };

            assert!(including.matches(&target));
            assert!(!excluding.matches(&target));
        }

        #[rstest]
        fn test_申請者と責任者で絞り込む(now: DateTime<Utc>) {
            let target = request("production", now);
            let by_requester = OvertimeRequestFilter {
                requested_by: Some(target.requested_by().clone()),
                ..Default::default()
            };
            let by_other = OvertimeRequestFilter {
                responsible_employee: Some(UserId::new()),
                ..Default::default()
            };

            assert!(by_requester.matches(&target));
            assert!(!by_other.matches(&target));
        }
    }
}

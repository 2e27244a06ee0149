//! # テスト用モックリポジトリ
//!
//! ユースケーステストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! overtimeflow-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{
    Arc,
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use overtimeflow_domain::{
    overtime::{OvertimeRequest, OvertimeRequestId},
    value_objects::Version,
};

use crate::{
    db::DatabaseProbe,
    error::InfraError,
    repository::{OvertimeRequestFilter, OvertimeRequestRepository},
};

// ===== MockOvertimeRequestRepository =====

#[derive(Clone, Default)]
pub struct MockOvertimeRequestRepository {
    requests: Arc<Mutex<Vec<OvertimeRequest>>>,
}

impl MockOvertimeRequestRepository {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 事前に申請を登録する
    pub fn add_request(&self, request: OvertimeRequest) {
        self.requests.lock().unwrap().push(request);
    }

    /// 保存されている申請のスナップショット
    pub fn requests(&self) -> Vec<OvertimeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OvertimeRequestRepository for MockOvertimeRequestRepository {
    async fn insert(&self, request: &OvertimeRequest) -> Result<(), InfraError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn update_with_version_check(
        &self,
        request: &OvertimeRequest,
        expected_version: Version,
    ) -> Result<(), InfraError> {
        let mut requests = self.requests.lock().unwrap();
        match requests.iter().position(|r| r.id() == request.id()) {
            Some(pos) if requests[pos].version() == expected_version => {
                requests[pos] = request.clone();
                Ok(())
            }
            _ => Err(InfraError::conflict(
                request.id(),
                expected_version.as_u32(),
            )),
        }
    }

    async fn find_by_id(
        &self,
        id: &OvertimeRequestId,
    ) -> Result<Option<OvertimeRequest>, InfraError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[OvertimeRequestId],
    ) -> Result<Vec<OvertimeRequest>, InfraError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| ids.contains(r.id()))
            .cloned()
            .collect())
    }

    async fn find_by_filter(
        &self,
        filter: &OvertimeRequestFilter,
    ) -> Result<Vec<OvertimeRequest>, InfraError> {
        let mut found: Vec<OvertimeRequest> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        Ok(found)
    }
}

// ===== MockDatabaseProbe =====

/// 疎通結果を切り替えられるモック（初期状態は成功）
#[derive(Clone)]
pub struct MockDatabaseProbe {
    healthy: Arc<AtomicBool>,
}

impl MockDatabaseProbe {
    pub fn new() -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

impl Default for MockDatabaseProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseProbe for MockDatabaseProbe {
    async fn ping(&self) -> Result<(), InfraError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(InfraError::from(sqlx::Error::PoolTimedOut))
        }
    }
}

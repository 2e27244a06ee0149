//! # ヘルスチェック共通型
//!
//! - Liveness: [`HealthResponse`]（プロセスが応答できるか）
//! - Readiness: [`ReadinessResponse`]（依存先に接続できるか）

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Liveness レスポンス
///
/// ```
/// use overtimeflow_shared::HealthResponse;
///
/// let response = HealthResponse::healthy("0.1.0");
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status:  String,
    /// Cargo.toml のバージョン
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status:  "healthy".to_string(),
            version: version.into(),
        }
    }
}

/// 個別チェックの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Error,
}

/// Readiness 全体の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// Readiness レスポンス
///
/// `checks` のキーはチェック名（`"database"` など）。出力順を安定させるため `BTreeMap`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: BTreeMap<String, CheckStatus>,
}

impl ReadinessResponse {
    /// 個別チェックの結果から全体の状態を決める（1 つでも失敗なら `NotReady`）
    pub fn from_checks<K: Into<String>>(checks: impl IntoIterator<Item = (K, CheckStatus)>) -> Self {
        let checks: BTreeMap<String, CheckStatus> =
            checks.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let status = if checks.values().all(|s| *s == CheckStatus::Ok) {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_health_responseのjson形状() {
        let json = serde_json::to_value(HealthResponse::healthy("0.1.0")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "healthy",
                "version": "0.1.0"
            })
        );
    }

    #[test]
    fn test_全チェック成功ならready() {
        let response = ReadinessResponse::from_checks([("database", CheckStatus::Ok)]);

        assert!(response.is_ready());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "status": "ready",
                "checks": { "database": "ok" }
            })
        );
    }

    #[test]
    fn test_1つでも失敗ならnot_ready() {
        let response = ReadinessResponse::from_checks([
            ("database", CheckStatus::Error),
            ("migrations", CheckStatus::Ok),
        ]);

        assert_eq!(response.status, ReadinessStatus::NotReady);
        assert_eq!(
            serde_json::to_value(&response).unwrap()["status"],
            "not_ready"
        );
    }
}

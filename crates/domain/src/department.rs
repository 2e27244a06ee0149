//! # 部署
//!
//! 申請を出した部署。承認経路の分岐に使う。
//!
//! - 物流（`logistics`）: 事前承認を経ずに工場長が直接承認する
//! - それ以外: 製造部長の事前承認 → 工場長の承認

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// 物流部署の識別子
pub const LOGISTICS: &str = "logistics";

const MAX_LENGTH: usize = 100;

/// 部署（値オブジェクト）
///
/// 前後の空白を除去して小文字に正規化する。比較は正規化後の文字列で行う。
///
/// ```rust
/// use overtimeflow_domain::department::Department;
///
/// let dept = Department::new("  Logistics ").unwrap();
/// assert_eq!(dept.as_str(), "logistics");
/// assert!(dept.is_logistics());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Department(String);

impl Department {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_lowercase();

        if value.is_empty() {
            return Err(DomainError::Validation("部署は必須です".to_string()));
        }

        if value.chars().count() > MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "部署は {} 文字以内である必要があります",
                MAX_LENGTH
            )));
        }

        Ok(Self(value))
    }

    pub fn is_logistics(&self) -> bool {
        self.0 == LOGISTICS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

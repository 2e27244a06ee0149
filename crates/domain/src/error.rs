//! # ドメイン層エラー定義
//!
//! | 種別 | 発生箇所 | HTTP |
//! |------|---------|------|
//! | `Validation` | 値オブジェクトの生成、DB 行からの復元 | 400 |
//! | `InvalidStatus` | 申請中以外の変更、遷移元でない遷移 | 409 |
//! | `Forbidden` | ロール不足、本人以外の変更 | 403 |
//!
//! 存在確認と楽観的ロックはリポジトリの責務のため、ここには含めない。

use thiserror::Error;

use crate::overtime::TransitionError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 既に遷移済みの申請に同じ操作を再適用した場合もここに分類される
    #[error("無効なステータスです: {0}")]
    InvalidStatus(String),

    /// 認可（何ができるか）の失敗
    #[error("権限がありません: {0}")]
    Forbidden(String),
}

impl From<TransitionError> for DomainError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            TransitionError::InvalidStatus { .. } => Self::InvalidStatus(err.to_string()),
        }
    }
}

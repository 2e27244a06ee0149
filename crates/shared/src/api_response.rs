//! # API レスポンスエンベロープ
//!
//! 内部 API の統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 統一レスポンス型
///
/// Core Service のすべての成功レスポンスは `{ "data": T }` 形式で返す。
/// 呼び出し側（ポータルのサーバー処理）は `Deserialize` で受け取る。
///
/// ```
/// use overtimeflow_shared::ApiResponse;
///
/// let response = ApiResponse::new(3);
/// assert_eq!(response.data, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

//! # 構造化ログのフィールド規約
//!
//! 残業申請の操作はすべて「ビジネスイベント」として 1 行ずつ記録する。
//! JSON 出力ではドット区切りのキーがそのままフラットなフィールドになるため、
//! 監査時は次のように絞り込める。
//!
//! ```text
//! jq 'select(.["event.kind"] == "business_event" and .["event.entity_id"] == "<id>")'
//! ```
//!
//! | フィールド | 値 |
//! |-----------|----|
//! | `event.category` | [`event::category`] |
//! | `event.action` | [`event::action`] |
//! | `event.result` | [`event::result`] |
//! | `event.reason` | 失敗時のみ。[`event::reason`] |
//! | `event.entity_type` / `event.entity_id` | 対象の申請 |
//! | `event.actor_id` | 操作したユーザー |
//!
//! 障害ログ（`tracing::error!`）には [`error`] の `error.category` / `error.kind` を付ける。

/// ビジネスイベントを `info` レベルで出力する
///
/// `event.kind = "business_event"` を先頭に付与する。残りの引数は `tracing::info!` と同じ。
///
/// ```ignore
/// log_business_event!(
///     event.category = event::category::OVERTIME,
///     event.action = event::action::OVERTIME_APPROVED,
///     event.entity_id = %request.id(),
///     event.result = event::result::SUCCESS,
///     "残業申請を承認"
/// );
/// ```
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = $crate::event_log::BUSINESS_EVENT,
            $($args)*
        )
    };
}

/// `event.kind` の値
pub const BUSINESS_EVENT: &str = "business_event";

pub mod event {
    pub mod category {
        pub const OVERTIME: &str = "overtime";
    }

    /// `overtime.<過去分詞>` の形式
    pub mod action {
        pub const OVERTIME_CREATED: &str = "overtime.created";
        pub const OVERTIME_UPDATED: &str = "overtime.updated";
        pub const OVERTIME_PRE_APPROVED: &str = "overtime.pre_approved";
        pub const OVERTIME_APPROVED: &str = "overtime.approved";
        pub const OVERTIME_COMPLETED: &str = "overtime.completed";
        pub const OVERTIME_ACCOUNTED: &str = "overtime.accounted";
        pub const OVERTIME_CANCELED: &str = "overtime.canceled";
        pub const OVERTIME_REACTIVATED: &str = "overtime.reactivated";
        pub const OVERTIME_BULK_TRANSITIONED: &str = "overtime.bulk_transitioned";
    }

    pub mod entity_type {
        pub const OVERTIME_REQUEST: &str = "overtime_request";
    }

    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }

    /// 拒否理由（`event.result = failure` のとき）
    pub mod reason {
        /// ロールも当事者性も満たさない
        pub const FORBIDDEN: &str = "forbidden";
        /// 遷移元のステータスではない
        pub const INVALID_STATUS: &str = "invalid_status";
    }
}

pub mod error {
    pub mod category {
        pub const INFRASTRUCTURE: &str = "infrastructure";
    }

    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const INTERNAL: &str = "internal";
    }
}

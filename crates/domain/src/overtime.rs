//! # 残業申請
//!
//! 残業（作業）申請のライフサイクルを管理する。
//!
//! ## 概念モデル
//!
//! - **OvertimeRequest**: 申請本体。状態は ADT で保持する
//! - **OvertimeStatus**: 永続化・API 用のフラットなステータス
//! - **OvertimeAction**: 状態を変える操作（事前承認、承認、完了、計上、取消、再開）
//! - **policy**: ロール集合をキーにした遷移表と、その評価関数
//!
//! ## 状態遷移
//!
//! ```text
//!             pre_approve            approve
//! pending ─────────────────▶ pre_approved ─────▶ approved ──▶ completed ──▶ accounted
//!    │   (物流以外)                               ▲   complete     mark_accounted
//!    └────────────────────────────────────────────┘
//!                  approve (物流のみ)
//!
//! pending / pre_approved / approved ── cancel ──▶ canceled ── reactivate ──▶ pending
//! ```
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use overtimeflow_domain::{
//!     department::Department,
//!     overtime::{NewOvertimeRequest, OvertimeAction, OvertimeRequest, OvertimeRequestId, OvertimeStatus},
//!     role::{Role, RoleSet},
//!     session::Actor,
//!     user::UserId,
//!     value_objects::{Headcount, WorkWindow},
//! };
//!
//! let now = chrono::Utc::now();
//! let request = OvertimeRequest::new(NewOvertimeRequest {
//!     id: OvertimeRequestId::new(),
//!     department: Department::new("logistics")?,
//!     requested_by: UserId::new(),
//!     responsible_employee: UserId::new(),
//!     window: WorkWindow::new(now, now + chrono::Duration::hours(2))?,
//!     number_of_employees: Headcount::new(3, "人数")?,
//!     number_of_shifts: Headcount::new(1, "シフト数")?,
//!     reason: None,
//!     now,
//! });
//!
//! let plant_manager = Actor::new(UserId::new(), RoleSet::from_iter([Role::PlantManager]));
//! let approved = request.apply(OvertimeAction::Approve, &plant_manager, now)?;
//! assert_eq!(approved.status(), OvertimeStatus::Approved);
//! # Ok(())
//! # }
//! ```

pub mod policy;
mod request;
mod status;

pub use policy::{OvertimeAction, TransitionError};
pub use request::*;
pub use status::*;

//! # OvertimeFlow ドメイン層
//!
//! 残業申請（Overtime/Work Request）の承認ワークフローを表現するドメインモデル。
//!
//! ## 設計方針
//!
//! 各部署・各画面で重複していた「申請 → 事前承認/承認 → 完了 → 計上」の
//! ライフサイクルを 1 つのステートマシンに集約する。
//!
//! - **エンティティ**: [`overtime::OvertimeRequest`]（状態は ADT で保持）
//! - **遷移ポリシー**: [`overtime::policy`]（ロール集合をキーにした遷移表）
//! - **値オブジェクト**: 部署、作業時間帯、人数などの検証済み型
//! - **ドメインエラー**: [`DomainError`] と [`overtime::TransitionError`]
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use overtimeflow_domain::{
//!     role::{Role, RoleSet},
//!     session::Actor,
//!     user::UserId,
//! };
//!
//! let actor = Actor::new(UserId::new(), RoleSet::from_iter([Role::PlantManager]));
//! assert!(actor.has_any(&[Role::PlantManager, Role::Admin]));
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod department;
pub mod error;
pub mod overtime;
pub mod role;
pub mod session;
pub mod user;
pub mod value_objects;

pub use error::DomainError;

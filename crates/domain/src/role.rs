//! # ロール（権限管理）
//!
//! 遷移ガードが参照するロールと、アクターが保持するロール集合を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Role`] | ロール | 組織上の役割。LDAP グループから認証側で解決済みのものを受け取る |
//! | [`RoleSet`] | ロール集合（能力集合） | 1 人のアクターが持つロールの集合。遷移表のキー |
//!
//! ## 設計方針
//!
//! - ロールは閉じた列挙型とする。未知のロール名は `FromStr` でエラーにし、
//!   ガード評価時に「知らないロールだから許可」という事故を防ぐ
//! - ワイヤ表現はケバブケース（`plant-manager` など）
//!
//! ## 使用例
//!
//! ```rust
//! use overtimeflow_domain::role::{Role, RoleSet};
//!
//! let roles: RoleSet = ["group-leader", "hr"]
//!     .iter()
//!     .map(|s| s.parse::<Role>())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert!(roles.contains(Role::Hr));
//! assert!(!roles.has_any(&[Role::Admin, Role::PlantManager]));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// ロール
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(
    serialize_all = "kebab-case",
    parse_err_ty = DomainError,
    parse_err_fn = invalid_role
)]
pub enum Role {
    /// システム管理者
    Admin,
    /// 人事（計上・再開を担当）
    Hr,
    /// 工場長（最終承認）
    PlantManager,
    /// 製造部長（事前承認）
    ProductionManager,
    /// 班長
    GroupLeader,
    /// 一般従業員
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

fn invalid_role(s: &str) -> DomainError {
    DomainError::Validation(format!("不正なロール: {}", s))
}

/// ロール集合（値オブジェクト）
///
/// 重複を持たず、順序は `Role` の宣言順で安定する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// いずれか 1 つでも保持していれば true
    ///
    /// 空のスライスに対しては常に false を返す。
    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.0.contains(role))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

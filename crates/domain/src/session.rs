//! # アクター（操作中のセッション）
//!
//! 認証・LDAP 連携は外部の責務。ワークフローは「ロール解決済みの現在のセッション」
//! だけを受け取り、遷移ガードの評価に使う。

use crate::{
    role::{Role, RoleSet},
    user::UserId,
};

/// 遷移を実行しようとしている主体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    roles:   RoleSet,
}

impl Actor {
    pub fn new(user_id: UserId, roles: RoleSet) -> Self {
        Self { user_id, roles }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn has_any(&self, roles: &[Role]) -> bool {
        self.roles.has_any(roles)
    }

    pub fn is(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

//! # ユーザー識別子
//!
//! 申請者・責任者・承認者を指す ID。ユーザーの属性（氏名、メール、LDAP 情報）は
//! 認証側の責務であり、このクレートでは扱わない。

define_uuid_id! {
    /// ユーザー ID
    pub struct UserId;
}

//! # 共通値オブジェクト
//!
//! 残業申請で使う値オブジェクトを定義する。
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`Version`] | `u32` | 楽観的ロック用のバージョン番号 |
//! | [`WorkWindow`] | `from` / `to` | 残業の作業時間帯 |
//! | [`Headcount`] | `u32` | 人数・シフト数（1 以上） |
//! | [`Reason`] | `String` | 申請理由（任意） |
//! | [`Stamp`] | 日時 + ユーザー | 遷移ごとの監査記録（`<action>_at` / `<action>_by`） |

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, user::UserId};

// =========================================================================
// Version（バージョン番号）
// =========================================================================

/// バージョン番号（値オブジェクト）
///
/// 1 から始まり、状態を変える操作のたびにインクリメントされる。
///
/// ```rust
/// use overtimeflow_domain::value_objects::Version;
///
/// let v1 = Version::initial();
/// assert_eq!(v1.next().as_u32(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u32);

impl Version {
    pub fn initial() -> Self {
        Self(1)
    }

    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::Validation(
                "バージョン番号は 1 以上である必要があります".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// 次のバージョンを返す
    ///
    /// # パニック
    ///
    /// u32 の最大値を超える場合。実運用では到達しない。
    pub fn next(&self) -> Self {
        Self(
            self.0
                .checked_add(1)
                .expect("バージョン番号がオーバーフローしました"),
        )
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// i32 に変換する（DB 互換用）
    ///
    /// # パニック
    ///
    /// i32 の範囲を超える場合。
    pub fn as_i32(&self) -> i32 {
        i32::try_from(self.0).expect("バージョン番号が i32 の範囲を超えています")
    }
}

impl TryFrom<i32> for Version {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let value = u32::try_from(value).map_err(|_| {
            DomainError::Validation("バージョン番号は 1 以上である必要があります".to_string())
        })?;
        Self::new(value)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

// =========================================================================
// WorkWindow（作業時間帯）
// =========================================================================

/// 残業の作業時間帯（値オブジェクト）
///
/// # 不変条件
///
/// - `from < to`
/// - 長さは [`WorkWindow::MAX_HOURS`] 時間以内
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkWindow {
    from: DateTime<Utc>,
    to:   DateTime<Utc>,
}

impl WorkWindow {
    pub const MAX_HOURS: i64 = 24;

    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, DomainError> {
        if from >= to {
            return Err(DomainError::Validation(
                "終了日時は開始日時より後である必要があります".to_string(),
            ));
        }
        if to - from > Duration::hours(Self::MAX_HOURS) {
            return Err(DomainError::Validation(format!(
                "作業時間帯は {} 時間以内である必要があります",
                Self::MAX_HOURS
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}

// =========================================================================
// Headcount（人数・シフト数）
// =========================================================================

/// 1 以上の人数・シフト数（上限は i32::MAX）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Headcount(u32);

impl Headcount {
    /// `label` はエラーメッセージに使う項目名
    pub fn new(value: i64, label: &str) -> Result<Self, DomainError> {
        match i32::try_from(value) {
            Ok(v) if v >= 1 => Ok(Self(v.unsigned_abs())),
            _ => Err(DomainError::Validation(format!(
                "{}は 1 以上である必要があります",
                label
            ))),
        }
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// i32 に変換する（DB 互換用）。生成時に i32 の範囲に収めている。
    pub fn as_i32(&self) -> i32 {
        self.0 as i32
    }
}

// =========================================================================
// Reason（申請理由）
// =========================================================================

/// 申請理由（任意、最大 [`Reason::MAX_LENGTH`] 文字）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason(String);

impl Reason {
    pub const MAX_LENGTH: usize = 1000;

    /// 前後の空白を除去して生成する。空白のみの入力は `Ok(None)`
    pub fn parse(value: impl AsRef<str>) -> Result<Option<Self>, DomainError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Ok(None);
        }
        if value.chars().count() > Self::MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "申請理由は {} 文字以内である必要があります",
                Self::MAX_LENGTH
            )));
        }
        Ok(Some(Self(value.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =========================================================================
// Stamp（監査スタンプ）
// =========================================================================

/// 遷移の監査記録
///
/// DB 上は `<action>_at` / `<action>_by` の 2 カラムに対応する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub by: UserId,
}

impl Stamp {
    pub fn new(at: DateTime<Utc>, by: UserId) -> Self {
        Self { at, by }
    }

    /// DB の 2 カラムから復元する
    ///
    /// 片方だけが設定されている場合は不整合としてエラーにする。
    pub fn from_columns(
        column: &str,
        at: Option<DateTime<Utc>>,
        by: Option<UserId>,
    ) -> Result<Option<Self>, DomainError> {
        match (at, by) {
            (Some(at), Some(by)) => Ok(Some(Self { at, by })),
            (None, None) => Ok(None),
            _ => Err(DomainError::Validation(format!(
                "{}_at と {}_by は同時に設定される必要があります",
                column, column
            ))),
        }
    }
}

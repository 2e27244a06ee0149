/// `Uuid` をラップする ID 型を定義する
///
/// 採番は UUID v7 のため、生成順と `as_uuid()` の順序が一致する。
/// 一覧の並び替え（作成日時が同じ場合の第 2 キー）はこの性質に依存する。
///
/// ```rust
/// use overtimeflow_domain::overtime::OvertimeRequestId;
///
/// let id = OvertimeRequestId::new();
/// let restored = OvertimeRequestId::from_uuid(*id.as_uuid());
/// assert_eq!(id, restored);
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// DB・リクエストの UUID から復元する
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

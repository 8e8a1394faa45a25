/// UUID v7 ベースの ID 型を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`Uuid` をラップ）
/// - `derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)`
/// - `new()`: UUID v7 を生成
/// - `Default` impl（`new()` に委譲）
///
/// # 使用例
///
/// ```rust
/// use pubnotify_domain::notification::NotificationId;
///
/// let id = NotificationId::new();
/// assert_ne!(id, NotificationId::new());
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
            /// 新しい ID を生成する（UUID v7）
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// プラットフォーム採番の整数 ID 型を定義する宣言型マクロ
///
/// 投稿やユーザーの ID はプラットフォーム側で採番される正の整数であり、
/// このシステムでは生成しない。そのため `new()` は持たず、`from_raw()` のみ提供する。
///
/// # 使用例
///
/// ```rust
/// use pubnotify_domain::post::PostId;
///
/// let id = PostId::from_raw(42);
/// assert_eq!(id.as_u64(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
macro_rules! define_platform_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[serde(transparent)]
        #[display("{_0}")]
        $vis struct $Name(u64);

        impl $Name {
            /// プラットフォームの ID 値から作成する
            pub fn from_raw(value: u64) -> Self {
                Self(value)
            }

            /// 内部の u64 値を取得する
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }
    };
}

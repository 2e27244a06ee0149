//! # Observability 基盤
//!
//! トレーシングの初期化設定を環境変数から組み立てる。
//!
//! | 変数名 | 既定値 | 説明 |
//! |--------|--------|------|
//! | `LOG_FORMAT` | `pretty` | `json` / `pretty`（大文字小文字は区別しない） |
//! | `RUST_LOG` | [`DEFAULT_DIRECTIVES`] | `EnvFilter` のディレクティブ |

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_DIRECTIVES: &str = "info,overtimeflow=debug,tower_http=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 イベントの JSON（本番向け）
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// 未知の値は [`Pretty`](LogFormat::Pretty) として扱う
    ///
    /// トレーシング初期化前に呼ばれるため、警告は stderr に直接書く。
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "" => Self::Pretty,
            other => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// 起動ログの `service` フィールドに出す名前
    pub service_name: String,
    pub log_format:   LogFormat,
    /// `EnvFilter` のディレクティブ
    pub directives:   String,
}

impl TracingConfig {
    /// プロセス環境変数から読み取る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み取る（テスト用に環境変数を差し替えられる）
    pub fn from_lookup(
        service_name: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let log_format = lookup("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();
        let directives = lookup("RUST_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string());

        Self {
            service_name: service_name.into(),
            log_format,
            directives,
        }
    }
}

/// グローバルサブスクライバを登録する
///
/// `tracing-error` の `ErrorLayer` も登録し、インフラ層のエラーが
/// 発生時点の `SpanTrace` を捕捉できるようにする。
///
/// # Errors
///
/// ディレクティブが不正、またはサブスクライバが登録済みの場合。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_new(&config.directives)?;

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;

    tracing::debug!(
        service = %config.service_name,
        log_format = ?config.log_format,
        directives = %config.directives,
        "トレーシングを初期化しました"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case(" JSON ", LogFormat::Json)]
    #[case("pretty", LogFormat::Pretty)]
    #[case("", LogFormat::Pretty)]
    #[case("yaml", LogFormat::Pretty)]
    fn test_log_formatのパース(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::parse(input), expected);
    }

    #[test]
    fn test_未設定なら既定値を使う() {
        let config = TracingConfig::from_lookup("core-service", lookup_from(&[]));

        assert_eq!(
            config,
            TracingConfig {
                service_name: "core-service".to_string(),
                log_format:   LogFormat::Pretty,
                directives:   DEFAULT_DIRECTIVES.to_string(),
            }
        );
    }

    #[test]
    fn test_環境変数の値を反映する() {
        let config = TracingConfig::from_lookup(
            "core-service",
            lookup_from(&[("LOG_FORMAT", "json"), ("RUST_LOG", "warn")]),
        );

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.directives, "warn");
    }

    #[test]
    fn test_空のrust_logは既定値にフォールバックする() {
        let config =
            TracingConfig::from_lookup("core-service", lookup_from(&[("RUST_LOG", "  ")]));

        assert_eq!(config.directives, DEFAULT_DIRECTIVES);
    }
}

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    /// 每行一筆 JSON，方便集中收集日誌
    Json,
}

/// `RUST_LOG` 有設定時優先使用，否則套用預設層級
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("higher_lower={},warn", level)))
}

/// 日誌一律寫到 stderr，stdout 留給遊戲畫面
pub fn init_logger(format: LogFormat, level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter_for(level));
    // 重複初始化 (例如設定錯誤後再初始化一次) 時保留第一個 subscriber
    let _ = match format {
        LogFormat::Compact => registry.with(fmt_layer.compact()).try_init(),
        LogFormat::Json => registry.with(fmt_layer.json()).try_init(),
    };
}

/// `--verbose` 優先於設定檔的 `logging.level`
pub fn effective_level(verbose: bool, configured: Option<&str>) -> &str {
    if verbose {
        "debug"
    } else {
        configured.unwrap_or("info")
    }
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    init_logger(LogFormat::Compact, effective_level(verbose, level));
}

pub fn init_json_logger(verbose: bool, level: Option<&str>) {
    init_logger(LogFormat::Json, effective_level(verbose, level));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_applies_without_verbose() {
        assert_eq!(effective_level(false, Some("warn")), "warn");
        assert_eq!(effective_level(false, None), "info");
    }

    #[test]
    fn test_verbose_overrides_configured_level() {
        assert_eq!(effective_level(true, Some("warn")), "debug");
        assert_eq!(effective_level(true, None), "debug");
    }
}

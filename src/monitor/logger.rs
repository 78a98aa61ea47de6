// monitor/logger.rs - 日誌初始化

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LogConfig;
use crate::monitor::{MonitorError, MonitorResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 初始化全域日誌
///
/// `RUST_LOG` 優先於 `log.level`。設定 `log.file_dir` 時另外寫入每日輪替的日誌檔，
/// 回傳的 guard 必須存活到程式結束，否則緩衝中的日誌會遺失。
pub fn init_logging(config: &LogConfig) -> MonitorResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_lowercase()))
        .map_err(|e| MonitorError::LoggerError(format!("無效的日誌級別 {}: {}", config.level, e)))?;

    let console: BoxedLayer = match config.format.to_lowercase().as_str() {
        "json" => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        "compact" => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
        _ => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
    };
    let mut layers = vec![console];

    let guard = match &config.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(fmt::layer().with_ansi(false).with_writer(writer).boxed());
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| MonitorError::InitializationError(format!("設置日誌系統失敗: {}", e)))?;

    info!(level = %config.level, format = %config.format, "日誌系統初始化完成");
    Ok(guard)
}

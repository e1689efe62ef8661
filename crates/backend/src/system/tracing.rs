use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Фильтр по умолчанию: SQL-запросы скрыты, логи приложения видны
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm=warn";

pub const LOG_FILE_NAME: &str = "backend.log";

/// Директория логов: рядом с исполняемым файлом, иначе target/logs
pub fn log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| PathBuf::from("target").join("logs"))
}

fn filter_directive(from_env: Option<String>) -> String {
    from_env
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Инициализация tracing
///
/// Два слоя:
/// - stdout (с цветами)
/// - logs/backend.log (без цветов, дописывается)
pub fn initialize() -> anyhow::Result<()> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow::anyhow!("Cannot create log directory {}: {}", dir.display(), e))?;

    let path = dir.join(LOG_FILE_NAME);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| anyhow::anyhow!("Cannot open log file {}: {}", path.display(), e))?;

    let directive = filter_directive(std::env::var("RUST_LOG").ok());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&directive))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    tracing::info!("Logging to {} (filter: {})", path.display(), directive);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_fallback() {
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
        assert_eq!(filter_directive(Some("  ".into())), DEFAULT_FILTER);
        assert_eq!(filter_directive(Some("debug".into())), "debug");
    }

    #[test]
    fn test_log_dir_ends_with_logs() {
        assert!(log_dir().ends_with("logs"));
    }
}

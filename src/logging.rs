//! Logging configuration for taxrag

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

/// Initialize logging with configuration
///
/// When file output is on, the returned guard flushes the file writer on
/// drop; keep it alive until the process is done logging.
pub fn init_logging_with_config(config: Option<&LoggingConfig>) -> Result<Option<WorkerGuard>> {
    let default_config = LoggingConfig::default();
    let config = config.unwrap_or(&default_config);

    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,taxrag={}", config.level)));

    let guard = init_registry(env_filter, config)?;

    tracing::info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

fn init_registry(env_filter: EnvFilter, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    // Console layer stays compact so it doesn't drown the chat output
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .boxed();

    let mut guard = None;
    let file_layer = if config.file_output {
        let logs_dir = Path::new(&config.log_dir);
        if !logs_dir.exists() {
            std::fs::create_dir_all(logs_dir)?;
        }

        let file_appender = tracing_appender::rolling::daily(logs_dir, "taxrag.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed(),
        )
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::TaxRagError::Custom(format!("Failed to initialize logging: {e}")))?;

    if config.file_output {
        tracing::info!(
            "Log files will be saved to: {}/taxrag.log.YYYY-MM-DD",
            config.log_dir
        );
    }

    Ok(guard)
}

/// Initialize simple logging for testing
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .map_err(|e| crate::TaxRagError::Custom(format!("Failed to initialize logging: {e}")))?;

    tracing::info!("Simple logging initialized");
    Ok(())
}

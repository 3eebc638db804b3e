// Tracing subscriber setup shared by streamchat front ends.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{ConfigError, LoggingSettings};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured filter. Output goes through a
/// non-blocking writer, so the returned guard must be held until exit
/// or buffered lines are lost.
pub fn init_tracing(settings: &LoggingSettings) -> Result<WorkerGuard, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .map_err(|e| ConfigError::Validation {
            field: "logging.filter".into(),
            reason: e.to_string(),
        })?;

    let (writer, guard) = match &settings.file {
        Some(path) => {
            let file_name = path.file_name().ok_or_else(|| ConfigError::Validation {
                field: "logging.file".into(),
                reason: format!("not a file path: {}", path.display()),
            })?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };
    let ansi = settings.file.is_none();

    let json = settings.json.then(|| {
        fmt::layer()
            .json()
            .with_writer(writer.clone())
            .with_target(true)
            .with_current_span(false)
    });
    let text = (!settings.json).then(|| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_ids(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
        .map_err(|e| ConfigError::Telemetry(e.to_string()))?;

    Ok(guard)
}

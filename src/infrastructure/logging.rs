use crate::core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder as RollingBuilder, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_LEVEL_ENV_VAR: &str = "GPU_SELECTOR_LOG";
const LOG_FILE_PREFIX: &str = "gpu-selector";
const LOG_KEEP_DAYS: u64 = 7;

#[derive(Debug, Clone)]
pub struct LoggingGuard {
    log_dir: PathBuf,
    level: String,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn level(&self) -> &str {
        &self.level
    }
}

fn worker_guard_slot() -> &'static Mutex<Option<WorkerGuard>> {
    static SLOT: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();
    SLOT.get_or_init(|| Mutex::new(None))
}

pub fn resolve_log_level() -> String {
    let env_level = std::env::var(LOG_LEVEL_ENV_VAR)
        .ok()
        .map(|value| value.to_ascii_lowercase());
    if let Some(level) = env_level
        && matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        )
    {
        return level;
    }

    if cfg!(debug_assertions) {
        "debug".to_string()
    } else {
        "info".to_string()
    }
}

fn cleanup_expired_logs(log_dir: &Path, keep_days: u64) {
    let keep_duration = Duration::from_secs(keep_days.saturating_mul(24 * 60 * 60));
    let _ = cleanup_expired_logs_with_duration(log_dir, keep_duration, SystemTime::now());
}

fn cleanup_expired_logs_with_duration(
    log_dir: &Path,
    keep_duration: Duration,
    now: SystemTime,
) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(log_dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified_at) = metadata.modified() else {
            continue;
        };
        if now.duration_since(modified_at).unwrap_or_default() <= keep_duration {
            continue;
        }
        if fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

// Everything goes to a daily-rolling JSON file; stdout and stderr stay free
// for command output and the interactive view.
pub fn init_logging(log_dir: &Path) -> AppResult<LoggingGuard> {
    fs::create_dir_all(log_dir).map_err(|error| {
        AppError::new("log_dir_create_failed", "failed to create the log directory")
            .with_detail(format!("{}: {error}", log_dir.display()))
    })?;
    cleanup_expired_logs(log_dir, LOG_KEEP_DAYS);

    let file_appender = RollingBuilder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|error| {
            AppError::new("log_appender_create_failed", "failed to create the log writer")
                .with_detail(format!("{}: {error}", log_dir.display()))
        })?;
    let (file_writer, worker_guard) = tracing_appender::non_blocking(file_appender);

    if let Ok(mut slot) = worker_guard_slot().lock() {
        *slot = Some(worker_guard);
    }

    let level = resolve_log_level();
    if !tracing::dispatcher::has_been_set() {
        let env_filter = EnvFilter::new(level.clone());
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(file_writer)
            .with_current_span(false)
            .with_span_list(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .try_init()
            .map_err(|error| {
                AppError::new(
                    "log_subscriber_init_failed",
                    "failed to initialize the log subscriber",
                )
                .with_detail(error.to_string())
            })?;
    }

    Ok(LoggingGuard {
        log_dir: log_dir.to_path_buf(),
        level,
    })
}

#[cfg(test)]
#[path = "../../tests/infrastructure/logging_tests.rs"]
mod tests;

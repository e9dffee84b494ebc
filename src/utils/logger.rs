use crate::common::model::LogConfig;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::Rotation;
use tracing_log::LogTracer;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// Keeps the non-blocking file writer alive for the life of the process
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Logger configuration structure
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use sunset_pipeline::utils::logger::LoggerConfig;
///
/// let config = LoggerConfig::new()
///     .with_level("debug")
///     .with_file_path(PathBuf::from("./logs/sunset.log"))
///     .with_console(true);
/// ```
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Optional file path for log output, rotated daily
    pub file_path: Option<PathBuf>,
    /// Whether to enable console output (stderr)
    pub enable_console: bool,
    /// Whether to use JSON format for logs
    pub json_format: bool,
}

impl LoggerConfig {
    pub fn init(self) -> Result<(), Box<dyn std::error::Error>> {
        init_logger(self)
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl AsRef<str>) -> Self {
        self.level = level.as_ref().into();
        self
    }

    pub fn with_file_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    pub fn with_json(mut self, enable: bool) -> Self {
        self.json_format = enable;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let log = LogConfig::default();
        Self {
            level: log.level,
            file_path: log.file_path,
            enable_console: log.console,
            json_format: log.json,
        }
    }
}

impl From<&LogConfig> for LoggerConfig {
    fn from(config: &LogConfig) -> Self {
        Self {
            level: config.level.clone(),
            file_path: config.file_path.clone(),
            enable_console: config.console,
            json_format: config.json,
        }
    }
}

/// Installs the global subscriber. `log` records are bridged into `tracing`.
///
/// Only the first call takes effect; later calls return `Ok(())`.
pub fn init_logger(config: LoggerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if LOGGER_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("Logger already initialized, skipping re-initialization");
        return Ok(());
    }

    let _ = LogTracer::builder()
        .with_max_level(log::LevelFilter::Trace)
        .init();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(local_offset, Rfc3339);

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.enable_console {
        if config.json_format {
            layers.push(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_timer(timer.clone())
                    .boxed(),
            );
        } else {
            layers.push(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_timer(timer.clone())
                    .boxed(),
            );
        }
    }

    if let Some(file_path) = config.file_path {
        let directory = file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."))
            .to_path_buf();
        std::fs::create_dir_all(&directory)?;
        let prefix = file_path
            .file_stem()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "sunset_pipeline".to_string());

        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(Rotation::DAILY)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .build(directory)?;
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        let _ = FILE_GUARD.set(guard);

        let layer = if config.json_format {
            fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_timer(timer.clone())
                .boxed()
        } else {
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_timer(timer.clone())
                .boxed()
        };
        layers.push(layer);
    }

    // try_init also attempts to install the log bridge, which is already set above
    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();

    Ok(())
}

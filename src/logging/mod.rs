//! Logging infrastructure - structured tracing for the bridge
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log level, overridable with `RUST_LOG`
//! - Events below the active level skip formatting; perf guards borrow their name
//! - Console or daily-rotated file output, human-readable or JSON

use std::path::Path;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

// Re-export tracing macros for use throughout the crate
pub use tracing::{debug, error, info, trace, warn, Level};

use crate::errors::BridgeError;
use crate::interop::{CallbackHandle, NativeType};

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Keeps the non-blocking file writer flushing for the life of the process
static FILE_GUARD: Mutex<Option<WorkerGuard>> = parking_lot::const_mutex(None);

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Log file path; console output when unset
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // PROXY_BRIDGE_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("PROXY_BRIDGE_LOG_LEVEL") {
            config.level = parse_level(&level_str);
        }

        // PROXY_BRIDGE_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("PROXY_BRIDGE_LOG_FILE") {
            config.log_path = Some(path);
        }

        config.json_format = std::env::var("PROXY_BRIDGE_LOG_JSON").is_ok();
        config.show_spans = std::env::var("PROXY_BRIDGE_LOG_SPANS").is_ok();

        config
    }

    /// Verbose config for debugging a host integration
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            log_path: None,
            json_format: false,
            show_spans: true,
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging with configuration from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration.
///
/// Only the first call has an effect. An already-installed global
/// subscriber (e.g. the host's own) is left in place.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let layer = match config.log_path.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                let directory = path.parent().unwrap_or_else(|| Path::new("."));
                let prefix = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "proxy_bridge.log".to_string());

                let appender = tracing_appender::rolling::daily(directory, prefix);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                *FILE_GUARD.lock() = Some(guard);
                fmt_layer(writer, &config)
            }
            None => fmt_layer(std::io::stderr, &config),
        };

        let _ = tracing_subscriber::registry().with(layer).try_init();
    });
}

fn fmt_layer<W>(writer: W, config: &LogConfig) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("proxy_bridge={}", config.level.as_str().to_lowercase()))
    });

    let span_events = if config.show_spans {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_span_events(span_events)
        .with_target(true)
        .with_line_number(cfg!(debug_assertions));

    if config.json_format {
        layer.json().with_filter(filter).boxed()
    } else {
        layer.compact().with_filter(filter).boxed()
    }
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

// ============================================================================
// Bridge events
// ============================================================================

/// Log a call forwarded to a host callback
#[inline]
pub fn log_dispatch(method: &str, callback: CallbackHandle, arg_count: usize) {
    debug!(
        event = "dispatch",
        method,
        callback = %callback,
        args = arg_count,
        "forwarding call to host callback"
    );
}

/// Log a call that resolved to the default result
#[inline]
pub fn log_unintercepted(method: &str, reason: &'static str) {
    trace!(event = "unintercepted", method, reason, "call not intercepted");
}

/// Log a late proxy binding
pub fn log_bind(class_name: &str, replaced: bool) {
    debug!(event = "bind", class = class_name, replaced, "proxy bound to invocation handler");
}

/// Log a failure propagating back to the native caller
pub fn log_failure(method: &str, error: &BridgeError) {
    warn!(
        event = "failure",
        method,
        kind = error.kind(),
        error = %error,
        "intercepted call failed"
    );
}

/// Log return value coercion
#[inline]
pub fn log_type_conversion(from_kind: &str, to_type: &NativeType) {
    trace!(
        event = "type_conversion",
        from = from_kind,
        to = %to_type,
        "coercing return value"
    );
}

/// Performance tracking utilities
pub mod perf {
    use std::time::Instant;
    use tracing::debug;

    /// Track operation duration (returns guard that logs on drop)
    #[must_use]
    pub fn track(operation: &str) -> PerformanceGuard<'_> {
        PerformanceGuard {
            operation,
            start: Instant::now(),
        }
    }

    pub struct PerformanceGuard<'a> {
        operation: &'a str,
        start: Instant,
    }

    impl Drop for PerformanceGuard<'_> {
        fn drop(&mut self) {
            let elapsed = self.start.elapsed();
            debug!(
                operation = self.operation,
                duration_us = elapsed.as_micros() as u64,
                "operation completed"
            );
        }
    }
}

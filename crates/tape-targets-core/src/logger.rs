//! Stderr logger for the vision worker.
//!
//! Lines look like `[  12.345s  INFO detect] message`: seconds since the
//! logger was installed, the level, and the last segment of the module path.
//! Use `init_with_level` (or `init_from_str` for CLI flags) once at startup.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct WorkerLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for WorkerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let module = record
            .module_path()
            .and_then(|m| m.rsplit("::").next())
            .unwrap_or_else(|| record.target());
        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            module,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<WorkerLogger> = OnceLock::new();

/// Install the logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| WorkerLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Parse a level name (`off`, `error`, ... `trace`, case-insensitive) and
/// install the logger. Unknown names fall back to `info`.
pub fn init_from_str(level: &str) -> Result<(), log::SetLoggerError> {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    init_with_level(level)
}

/// Install a `tracing` subscriber for stage spans.
///
/// `RUST_LOG` wins over `level` when set. Records from the `log` macros are
/// not bridged here; install `tracing_log::LogTracer` first for that.
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        let subscriber = builder.json().flatten_event(true).finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = builder.with_timer(fmt::time::Uptime::default()).finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    }
}

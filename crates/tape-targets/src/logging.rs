//! Logger installation for binaries.

/// Install the process-wide logger at `level` (`off`, `error`, ... `trace`).
///
/// With the `tracing` feature, `log` records from every crate are bridged
/// into a `tracing` subscriber so they interleave with the stage spans;
/// `json` selects machine-readable output. Without it, the plain stderr
/// logger from `tape-targets-core` is used and `json` is ignored.
pub fn init_logging(level: &str, json: bool) {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        if !tape_targets_core::init_tracing(level, json) {
            log::debug!("tracing subscriber already installed");
        }
    }

    #[cfg(not(feature = "tracing"))]
    {
        let _ = json;
        if tape_targets_core::init_from_str(level).is_err() {
            log::debug!("logger already installed");
        }
    }
}

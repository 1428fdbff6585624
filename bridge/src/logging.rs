use log::{Level, LevelFilter, Log, Metadata, Record};

/// Reads `WOWBRIDGE_LOG` the way the offsets file reads addresses: a small,
/// explicit parse with an explicit default, kept separate from `init` so it
/// can be tested without touching the process environment.
pub fn resolve_log_level(value: Option<&str>) -> LevelFilter {
    match value.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("trace") => LevelFilter::Trace,
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        _ => LevelFilter::Off,
    }
}

/// Routes the `log` facade (used by the Offsets, Scripting Adapter,
/// Dispatcher, and Frame Hook crates) to `OutputDebugStringA`, since the
/// bridge is a DLL with no console of its own.
struct DebugViewLogger {
    level: LevelFilter,
}

impl Log for DebugViewLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[wowbridge] {} {}: {}\n",
            level_tag(record.level()),
            record.target(),
            record.args()
        );
        write_debug_string(&line);
    }

    fn flush(&self) {}
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

#[cfg(windows)]
fn write_debug_string(line: &str) {
    use std::ffi::CString;
    use winapi::um::debugapi::OutputDebugStringA;

    let c_line = CString::new(line.replace('\0', "")).unwrap_or_default();
    unsafe { OutputDebugStringA(c_line.as_ptr()) };
}

#[cfg(not(windows))]
fn write_debug_string(line: &str) {
    eprint!("{line}");
}

/// Installs the `log` backend and the `tracing-subscriber` fmt layer (for
/// the IPC server and this module) at the level named by `WOWBRIDGE_LOG`.
/// `off`/unset disables both; idempotent beyond the first call per process,
/// matching the "set once at DLL attach" lifecycle.
pub fn init() {
    let level = resolve_log_level(std::env::var("WOWBRIDGE_LOG").ok().as_deref());

    let _ = log::set_boxed_logger(Box::new(DebugViewLogger { level }));
    log::set_max_level(level);

    let filter = match level {
        LevelFilter::Off => tracing_subscriber::filter::LevelFilter::OFF,
        LevelFilter::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        LevelFilter::Warn => tracing_subscriber::filter::LevelFilter::WARN,
        LevelFilter::Info => tracing_subscriber::filter::LevelFilter::INFO,
        LevelFilter::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
        LevelFilter::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_defaults_to_off() {
        assert_eq!(resolve_log_level(None), LevelFilter::Off);
    }

    #[test]
    fn recognizes_each_named_level_case_insensitively() {
        assert_eq!(resolve_log_level(Some("INFO")), LevelFilter::Info);
        assert_eq!(resolve_log_level(Some("Debug")), LevelFilter::Debug);
        assert_eq!(resolve_log_level(Some("trace")), LevelFilter::Trace);
        assert_eq!(resolve_log_level(Some("warn")), LevelFilter::Warn);
        assert_eq!(resolve_log_level(Some("error")), LevelFilter::Error);
    }

    #[test]
    fn unrecognized_value_is_off() {
        assert_eq!(resolve_log_level(Some("verbose")), LevelFilter::Off);
    }
}

//! Diagnostic events raised by the snapshot buffer.
//!
//! The buffer never logs on its own: every event goes through a [`DiagnosticSink`]
//! handed to it at construction. [`LogSink`] forwards to the `log` facade and is the default.

use std::fmt::{self, Arguments, Display, Formatter};
use std::sync::{Arc, Mutex};

/// Log target used by [`LogSink`].
pub const LOG_TARGET: &str = "snapshot_buffer";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

/// Receiver for diagnostic events.
///
/// `enabled` is always checked before the message is built, so a disabled
/// severity costs a single call.
pub trait DiagnosticSink {
    fn enabled(&self, severity: Severity) -> bool;
    fn emit(&self, severity: Severity, message: Arguments<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn enabled(&self, severity: Severity) -> bool {
        (**self).enabled(severity)
    }

    fn emit(&self, severity: Severity, message: Arguments<'_>) {
        (**self).emit(severity, message)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn enabled(&self, severity: Severity) -> bool {
        (**self).enabled(severity)
    }

    fn emit(&self, severity: Severity, message: Arguments<'_>) {
        (**self).emit(severity, message)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn enabled(&self, severity: Severity) -> bool {
        (**self).enabled(severity)
    }

    fn emit(&self, severity: Severity, message: Arguments<'_>) {
        (**self).emit(severity, message)
    }
}

/// Emits a diagnostic only when the sink accepts the severity.
macro_rules! diag {
    ($sink:expr, $severity:expr, $($arg:tt)+) => {{
        let sink = &$sink;
        let severity = $severity;
        if $crate::diagnostics::DiagnosticSink::enabled(sink, severity) {
            $crate::diagnostics::DiagnosticSink::emit(sink, severity, format_args!($($arg)+));
        }
    }};
}
pub(crate) use diag;

/// Forwards diagnostics to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn enabled(&self, severity: Severity) -> bool {
        log::log_enabled!(target: LOG_TARGET, log::Level::from(severity))
    }

    fn emit(&self, severity: Severity, message: Arguments<'_>) {
        log::log!(target: LOG_TARGET, log::Level::from(severity), "{message}");
    }
}

/// Drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn enabled(&self, _severity: Severity) -> bool {
        false
    }

    fn emit(&self, _severity: Severity, _message: Arguments<'_>) {}
}

/// A recorded diagnostic event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Keeps every event at or above a minimum severity in memory.
#[derive(Debug)]
pub struct MemorySink {
    min_severity: Severity,
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_min_severity(Severity::Info)
    }

    pub fn with_min_severity(min_severity: Severity) -> Self {
        Self {
            min_severity,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Number of recorded events with exactly this severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.lock().iter().filter(|e| e.severity == severity).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A poisoned sink still holds valid events.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for MemorySink {
    fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    fn emit(&self, severity: Severity, message: Arguments<'_>) {
        self.lock().push(Diagnostic {
            severity,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counts how many times a message was actually formatted.
    struct Probe<'a>(&'a Cell<usize>);

    impl Display for Probe<'_> {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            self.0.set(self.0.get() + 1);
            f.write_str("probe")
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(log::Level::from(Severity::Warning), log::Level::Warn);
    }

    #[test]
    fn test_memory_sink_records_above_threshold() {
        let sink = MemorySink::with_min_severity(Severity::Warning);
        diag!(sink, Severity::Info, "ignored {}", 1);
        diag!(sink, Severity::Warning, "kept {}", 2);
        diag!(sink, Severity::Error, "kept {}", 3);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity, Severity::Warning);
        assert_eq!(events[0].message, "kept 2");
        assert_eq!(sink.count(Severity::Error), 1);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_disabled_severity_is_never_formatted() {
        let formatted = Cell::new(0);
        let sink = MemorySink::with_min_severity(Severity::Error);
        diag!(sink, Severity::Warning, "{}", Probe(&formatted));
        assert_eq!(formatted.get(), 0);

        diag!(sink, Severity::Error, "{}", Probe(&formatted));
        assert_eq!(formatted.get(), 1);

        diag!(NullSink, Severity::Error, "{}", Probe(&formatted));
        assert_eq!(formatted.get(), 1);
    }

    #[test]
    fn test_forwarding_impls() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<MemorySink> = Arc::clone(&sink);
        diag!(shared, Severity::Info, "through arc");
        let boxed: Box<dyn DiagnosticSink> = Box::new(MemorySink::new());
        assert!(boxed.enabled(Severity::Info));
        diag!(&*sink, Severity::Info, "through ref");
        assert_eq!(sink.count(Severity::Info), 2);
    }
}

pub mod buffer;
pub mod diagnostics;
pub mod error;
pub mod settings;

pub use buffer::{Sample, SnapshotBuffer, TimeRange};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, MemorySink, NullSink, Severity};
pub use error::{SnapshotError, SnapshotResult};
pub use settings::BufferSettings;

pub use pose_payloads::{Interpolate, Pose};

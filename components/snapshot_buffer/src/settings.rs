use crate::buffer::SnapshotBuffer;
use crate::diagnostics::DiagnosticSink;
use crate::error::{SnapshotError, SnapshotResult};
use pose_payloads::Interpolate;
use serde::{Deserialize, Serialize};

const DEFAULT_HISTORY_SECS: f64 = 1.0;
const DEFAULT_MIN_KEEP_OLDER: usize = 1;
const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Retention parameters for a snapshot buffer, usually loaded from a RON file.
///
/// ```ron
/// (
///     history: 0.5,
///     min_keep_older: 2,
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    /// Seconds of history kept behind the current time.
    pub history: f64,
    /// Samples older than the horizon that survive each prune.
    pub min_keep_older: usize,
    pub initial_capacity: usize,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            history: DEFAULT_HISTORY_SECS,
            min_keep_older: DEFAULT_MIN_KEEP_OLDER,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl BufferSettings {
    pub fn from_ron(text: &str) -> SnapshotResult<Self> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SnapshotResult<()> {
        if !self.history.is_finite() || self.history < 0.0 {
            return Err(SnapshotError::InvalidSettings(format!(
                "history must be a finite, non-negative number of seconds, got {}",
                self.history
            )));
        }
        Ok(())
    }

    /// Prune horizon for a buffer queried at `now`.
    pub fn horizon(&self, now: f64) -> f64 {
        now - self.history
    }
}

impl<P: Interpolate> SnapshotBuffer<P> {
    pub fn from_settings(settings: &BufferSettings) -> Self {
        Self::with_capacity(settings.initial_capacity)
    }
}

impl<P: Interpolate, S: DiagnosticSink> SnapshotBuffer<P, S> {
    pub fn from_settings_with_sink(settings: &BufferSettings, sink: S) -> Self {
        Self::with_capacity_and_sink(settings.initial_capacity, sink)
    }

    /// Drop history beyond `settings.history` seconds before `now`.
    pub fn prune_history(&mut self, now: f64, settings: &BufferSettings) {
        self.prune(settings.horizon(now), settings.min_keep_older);
    }
}

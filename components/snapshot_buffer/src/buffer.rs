use crate::diagnostics::{diag, DiagnosticSink, LogSink, Severity};
use crate::error::{SnapshotError, SnapshotResult};
use pose_payloads::Interpolate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

/// A pose received from the authoritative source, stamped with server time in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample<P> {
    pub time: f64,
    pub pose: P,
}

impl<P> Sample<P> {
    pub fn new(time: f64, pose: P) -> Self {
        Self { time, pose }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Ordered history of samples for one tracked entity.
///
/// Samples are expected to be appended in non-decreasing time order. [`append`](Self::append)
/// does not check this; [`try_append`](Self::try_append) does.
/// Memory is only reclaimed by [`prune`](Self::prune).
#[derive(Clone, Debug)]
pub struct SnapshotBuffer<P, S = LogSink> {
    samples: VecDeque<Sample<P>>,
    sink: S,
}

impl<P: Interpolate> SnapshotBuffer<P> {
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_sink(capacity, LogSink)
    }
}

impl<P: Interpolate, S: Default> Default for SnapshotBuffer<P, S> {
    fn default() -> Self {
        Self {
            samples: VecDeque::new(),
            sink: S::default(),
        }
    }
}

impl<P: Interpolate, S: DiagnosticSink> SnapshotBuffer<P, S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            samples: VecDeque::new(),
            sink,
        }
    }

    pub fn with_capacity_and_sink(capacity: usize, sink: S) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Sample<P>> + '_ {
        self.samples.iter()
    }

    pub fn oldest(&self) -> Option<&Sample<P>> {
        self.samples.front()
    }

    pub fn latest(&self) -> Option<&Sample<P>> {
        self.samples.back()
    }

    /// Time span between the oldest and the newest sample.
    pub fn time_range(&self) -> Option<TimeRange> {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => Some(TimeRange {
                start: first.time,
                end: last.time,
            }),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Append a sample at the end of the history.
    ///
    /// `time` must not be older than the latest sample. This is not checked:
    /// an out-of-order sample is stored as is and interpolation results around
    /// it are unspecified.
    pub fn append(&mut self, pose: P, time: f64) {
        self.samples.push_back(Sample { time, pose });
    }

    /// Append a sample, rejecting it if it is older than the latest one.
    /// Equal timestamps are accepted.
    pub fn try_append(&mut self, pose: P, time: f64) -> SnapshotResult<()> {
        if let Some(last) = self.samples.back() {
            if time < last.time {
                return Err(SnapshotError::OutOfOrder {
                    time,
                    last: last.time,
                });
            }
        }
        self.append(pose, time);
        Ok(())
    }

    /// Pose estimate at `now`.
    ///
    /// Queries outside the buffered range clamp to the oldest or newest pose.
    /// On an empty buffer this reports an error diagnostic and returns the zero pose.
    pub fn interpolate(&self, now: f64) -> P
    where
        P: Default,
    {
        match self.try_interpolate(now) {
            Ok(pose) => pose,
            Err(_) => {
                diag!(
                    self.sink,
                    Severity::Error,
                    "interpolation requested at {now:.4} on an empty snapshot buffer, returning the zero pose"
                );
                P::default()
            }
        }
    }

    /// Same as [`interpolate`](Self::interpolate) but an empty buffer is an error.
    pub fn try_interpolate(&self, now: f64) -> SnapshotResult<P> {
        let (first, last) = match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SnapshotError::Empty),
        };

        if self.samples.len() == 1 {
            return Ok(first.pose.clone());
        }

        if now < first.time {
            diag!(
                self.sink,
                Severity::Info,
                "query at {now:.4} precedes the oldest sample at {:.4}, clamping to it",
                first.time
            );
            return Ok(first.pose.clone());
        }

        if now >= last.time {
            diag!(
                self.sink,
                Severity::Warning,
                "query at {now:.4} is {:.4}s past the newest sample at {:.4}, holding its pose",
                now - last.time,
                last.time
            );
            return Ok(last.pose.clone());
        }

        if let Some((from, to)) = self.bracket(now) {
            let alpha = blend_factor(from.time, to.time, now);
            return Ok(from.pose.interpolate(&to.pose, alpha));
        }

        diag!(
            self.sink,
            Severity::Error,
            "no sample pair brackets {now} in a buffer of {} samples spanning [{:.4}, {:.4}], holding the newest pose",
            self.samples.len(),
            first.time,
            last.time
        );
        Ok(last.pose.clone())
    }

    /// Drop old samples while keeping the `min_keep_older_count` newest samples
    /// strictly older than `older_than`, so a query at `older_than` still has a
    /// sample to interpolate from. Samples at or after `older_than` are never removed.
    pub fn prune(&mut self, older_than: f64, min_keep_older_count: usize) {
        let older = self
            .samples
            .iter()
            .filter(|s| s.time < older_than)
            .count();
        let mut excess = older.saturating_sub(min_keep_older_count);

        // Sorted history: the older samples form a prefix.
        while excess > 0 {
            match self.samples.front() {
                Some(front) if front.time < older_than => {
                    self.samples.pop_front();
                    excess -= 1;
                }
                _ => break,
            }
        }

        if excess > 0 {
            self.samples.retain(|s| {
                if excess > 0 && s.time < older_than {
                    excess -= 1;
                    false
                } else {
                    true
                }
            });
        }
    }

    /// First adjacent pair with `from.time <= now < to.time`; pairs that do not
    /// move forward in time are skipped.
    fn bracket(&self, now: f64) -> Option<(&Sample<P>, &Sample<P>)> {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .find(|(from, to)| from.time < to.time && from.time <= now && now < to.time)
    }
}

/// Normalized position of `now` between `from` and `to`, clamped to `[0, 1]`.
/// `to` must be strictly greater than `from`.
fn blend_factor(from: f64, to: f64, now: f64) -> f32 {
    ((now - from) / (to - from)).clamp(0.0, 1.0) as f32
}

impl<P, S> Display for SnapshotBuffer<P, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.samples.is_empty() {
            return writeln!(f, "SnapshotBuffer: empty");
        }
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), s| {
                (min.min(s.time), max.max(s.time))
            });
        writeln!(
            f,
            "SnapshotBuffer: {} samples, time [{min:.4} .. {max:.4}]",
            self.samples.len()
        )?;
        for (i, sample) in self.samples.iter().enumerate() {
            writeln!(f, "  [{i}] t={:.4}", sample.time)?;
        }
        Ok(())
    }
}

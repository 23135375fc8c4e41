use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot buffer is empty")]
    Empty,

    #[error("Sample at time {time} is older than the latest buffered sample at {last}")]
    OutOfOrder { time: f64, last: f64 },

    #[error("Invalid buffer settings: {0}")]
    InvalidSettings(String),

    #[error("Could not parse buffer settings: {0}")]
    Settings(#[from] ron::error::SpannedError),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

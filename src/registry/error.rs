use ulid::Ulid;

use crate::model::Timestamp;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(Ulid),
    #[error("already exists: {0}")]
    AlreadyExists(Ulid),
    #[error("conflict with reservation: {0}")]
    Conflict(Ulid),
    #[error("invalid range: start {start} is not before end {end}")]
    InvalidRange { start: Timestamp, end: Timestamp },
    #[error("data file is not in the expected format: {0}")]
    Format(#[from] serde_json::Error),
    #[error("data file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Short label for the `reason` metric dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::AlreadyExists(_) => "already_exists",
            StoreError::Conflict(_) => "conflict",
            StoreError::InvalidRange { .. } => "invalid_range",
            StoreError::Format(_) => "format",
            StoreError::Io(_) => "io",
        }
    }
}

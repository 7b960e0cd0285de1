use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("distance must be a positive number of meters")]
    InvalidDistance,

    #[error("duration must be a positive number of seconds")]
    InvalidDuration,

    #[error("malformed duration text '{text}'; expected MM:SS or HH:MM:SS")]
    MalformedDuration { text: String },

    #[error("storage quota exceeded: write needs {needed} bytes but the quota is {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("storage failure while {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StorageError,
    },

    #[error("failed to serialize session collection: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to format current UTC timestamp as RFC3339: {0}")]
    ClockFormat(#[source] time::error::Format),
}

impl StoreError {
    #[must_use]
    pub fn storage(operation: &'static str, source: StorageError) -> Self {
        Self::Storage { operation, source }
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to parse import file as JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid export file format: missing 'sessions' array")]
    InvalidFormat,

    #[error("export file contains invalid session data at index {index}")]
    InvalidSessionData { index: usize },

    #[error("export file contains sessions that do not match the schema: {source}")]
    SessionSchema {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize export document: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to format export timestamp as RFC3339: {0}")]
    ClockFormat(#[source] time::error::Format),
}

//! Session storage and derived-statistics engine for a personal swim tracker.
//!
//! Invariant: the store is the sole owner of the session collection. Every
//! mutation rewrites the full collection through the injected
//! [`StorageBackend`], and in-memory state only advances after a successful
//! write — a quota or I/O failure leaves both memory and storage at the last
//! successfully persisted snapshot.
//!
//! # Public API Overview
//! - Construct a [`SessionStore`] over a [`FileStorage`] or [`MemoryStorage`]
//!   backend and log, delete, and query swim sessions.
//! - Derive statistics with [`SessionStore::statistics`] and [`weekly_totals`].
//! - Move data in and out with [`export_to_json`], [`export_to_csv`], and
//!   [`import_from_json`] combined with [`SessionStore::import_sessions`].

mod duration;
mod error;
mod schema;
mod stats;
mod storage;
mod store;
mod transfer;

pub use duration::{compute_pace, format_pace, parse_duration_text};
pub use error::{StoreError, TransferError};
pub use schema::{ImportMode, NewSession, SwimSession};
pub use stats::{statistics, weekly_totals, Statistics, WeeklyTotal};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageUsage};
pub use store::{
    SessionStore, StorageHealth, SESSION_COUNT_ADVISORY, STORAGE_KEY, STORAGE_WARN_RATIO,
};
pub use transfer::{
    export_file_name, export_to_csv, export_to_json, import_from_json, ExportDocument, Import,
    CSV_HEADER, EXPORT_VERSION,
};

use std::collections::HashSet;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::schema::{generate_session_id, ImportMode, NewSession, SwimSession};
use crate::stats::{statistics, Statistics};
use crate::storage::{StorageBackend, StorageError, StorageUsage};

/// The single storage slot mirroring the in-memory collection.
pub const STORAGE_KEY: &str = "swimSessions";

/// Fraction of the backend quota at which the store recommends exporting.
pub const STORAGE_WARN_RATIO: f64 = 0.8;

/// Advisory session-count threshold; informational only.
pub const SESSION_COUNT_ADVISORY: usize = 500;

/// Advisory capacity diagnostics. Never blocks a save.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageHealth {
    pub near_capacity: bool,
    pub session_count_high: bool,
    pub used_bytes: u64,
    pub quota_bytes: Option<u64>,
    pub session_count: usize,
}

/// Owns the canonical session collection, mirrored 1:1 with [`STORAGE_KEY`]
/// in the injected backend. Every mutation rewrites the whole collection;
/// in-memory state only advances after the write succeeds.
pub struct SessionStore<S> {
    storage: S,
    sessions: Vec<SwimSession>,
}

impl<S: StorageBackend> SessionStore<S> {
    /// Reads the stored collection once. A missing slot starts empty; an
    /// unparseable slot is logged and recovered as empty, not fatal.
    pub fn load(storage: S) -> Result<Self, StoreError> {
        let raw = storage
            .read(STORAGE_KEY)
            .map_err(|source| StoreError::storage("loading stored sessions", source))?;
        let sessions = match raw {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<SwimSession>>(&raw) {
                Ok(sessions) => sessions,
                Err(error) => {
                    warn!(%error, "stored session data is unparseable; starting empty");
                    Vec::new()
                }
            },
        };

        Ok(Self { storage, sessions })
    }

    /// Validates the input, assigns a fresh id, prepends, and persists. On
    /// any persistence failure the new session is discarded entirely.
    pub fn save_session(&mut self, input: NewSession) -> Result<SwimSession, StoreError> {
        if input.distance == 0 {
            return Err(StoreError::InvalidDistance);
        }
        if input.duration == 0 {
            return Err(StoreError::InvalidDuration);
        }

        let session = SwimSession {
            id: generate_session_id(),
            distance: input.distance,
            duration: input.duration,
            pace: input.pace,
            date: input.date,
            notes: input.notes,
        };

        let mut updated = Vec::with_capacity(self.sessions.len() + 1);
        updated.push(session.clone());
        updated.extend(self.sessions.iter().cloned());

        self.persist(&updated, "saving session")?;
        self.sessions = updated;
        Ok(session)
    }

    /// Removes the matching session. A missing id is a successful no-op and
    /// does not rewrite storage.
    pub fn delete_session(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.sessions.iter().any(|session| session.id == id) {
            return Ok(());
        }

        let updated: Vec<SwimSession> = self
            .sessions
            .iter()
            .filter(|session| session.id != id)
            .cloned()
            .collect();

        self.persist(&updated, "deleting session")?;
        self.sessions = updated;
        Ok(())
    }

    /// Live in-memory order: most-recently-saved first.
    #[must_use]
    pub fn sessions(&self) -> &[SwimSession] {
        &self.sessions
    }

    /// First `count` sessions in live order; pure read.
    #[must_use]
    pub fn recent_sessions(&self, count: usize) -> &[SwimSession] {
        &self.sessions[..count.min(self.sessions.len())]
    }

    /// Date-descending presentation view. Sessions whose date fails to parse
    /// sort as oldest.
    #[must_use]
    pub fn sessions_by_date_desc(&self) -> Vec<SwimSession> {
        let mut keyed: Vec<(OffsetDateTime, SwimSession)> = self
            .sessions
            .iter()
            .map(|session| {
                let parsed = OffsetDateTime::parse(&session.date, &Rfc3339)
                    .unwrap_or(OffsetDateTime::UNIX_EPOCH);
                (parsed, session.clone())
            })
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));

        keyed.into_iter().map(|(_, session)| session).collect()
    }

    /// Sessions whose date lies in `[start, end]` inclusive. Unparseable
    /// dates are excluded, not an error.
    #[must_use]
    pub fn sessions_by_date_range(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Vec<SwimSession> {
        self.sessions
            .iter()
            .filter(|session| {
                OffsetDateTime::parse(&session.date, &Rfc3339)
                    .map_or(false, |date| date >= start && date <= end)
            })
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn statistics(&self) -> Statistics {
        statistics(&self.sessions)
    }

    /// Merge drops imported ids that already exist and appends survivors
    /// after the existing collection; replace discards the prior collection.
    /// A persistence failure commits nothing.
    pub fn import_sessions(
        &mut self,
        sessions: Vec<SwimSession>,
        mode: ImportMode,
    ) -> Result<(), StoreError> {
        let updated = match mode {
            ImportMode::Replace => sessions,
            ImportMode::Merge => {
                let existing: HashSet<&str> = self
                    .sessions
                    .iter()
                    .map(|session| session.id.as_str())
                    .collect();
                let mut merged = self.sessions.clone();
                merged.extend(
                    sessions
                        .into_iter()
                        .filter(|session| !existing.contains(session.id.as_str())),
                );
                merged
            }
        };

        self.persist(&updated, "importing sessions")?;
        self.sessions = updated;
        Ok(())
    }

    /// Advisory only: flags storage near its quota and collections past the
    /// recommended size.
    pub fn storage_health(&self) -> Result<StorageHealth, StoreError> {
        let StorageUsage {
            used_bytes,
            quota_bytes,
        } = self
            .storage
            .usage()
            .map_err(|source| StoreError::storage("checking storage usage", source))?;
        // A zero-byte quota can never accept a write, so it is at capacity
        // by definition.
        let near_capacity = quota_bytes.map_or(false, |quota| {
            quota == 0 || used_bytes as f64 >= quota as f64 * STORAGE_WARN_RATIO
        });

        Ok(StorageHealth {
            near_capacity,
            session_count_high: self.sessions.len() > SESSION_COUNT_ADVISORY,
            used_bytes,
            quota_bytes,
            session_count: self.sessions.len(),
        })
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(
        &mut self,
        sessions: &[SwimSession],
        operation: &'static str,
    ) -> Result<(), StoreError> {
        let serialized =
            serde_json::to_string(sessions).map_err(|source| StoreError::Serialize { source })?;

        match self.storage.write(STORAGE_KEY, &serialized) {
            Ok(()) => {
                debug!(
                    bytes = serialized.len(),
                    count = sessions.len(),
                    "persisted session collection"
                );
                Ok(())
            }
            Err(StorageError::QuotaExceeded { needed, quota }) => {
                Err(StoreError::QuotaExceeded { needed, quota })
            }
            Err(source) => Err(StoreError::storage(operation, source)),
        }
    }
}

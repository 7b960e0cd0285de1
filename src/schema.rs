use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::duration::{compute_pace, parse_duration_text};
use crate::error::StoreError;

/// A single logged swim. Never mutated after creation; the `id` is assigned
/// by the store at save time and is unique across the stored collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwimSession {
    pub id: String,
    /// Meters; positive for every persisted session.
    pub distance: u32,
    /// Seconds; positive for every persisted session.
    pub duration: u32,
    /// Seconds per 100 m; zero only when distance or duration is zero.
    pub pace: f64,
    /// RFC 3339 timestamp stamped at logging time.
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Input to [`crate::SessionStore::save_session`]; everything except the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub distance: u32,
    pub duration: u32,
    pub pace: f64,
    pub date: String,
    pub notes: Option<String>,
}

impl NewSession {
    #[must_use]
    pub fn new(
        distance: u32,
        duration: u32,
        pace: f64,
        date: impl Into<String>,
        notes: Option<impl Into<String>>,
    ) -> Self {
        Self {
            distance,
            duration,
            pace,
            date: date.into(),
            notes: notes.map(Into::into),
        }
    }

    /// Builds a session from raw form input: duration arrives as `MM:SS` or
    /// `HH:MM:SS` text, pace is derived, and `date` is stamped with now-UTC.
    pub fn from_form(
        distance: u32,
        duration_text: &str,
        notes: Option<&str>,
    ) -> Result<Self, StoreError> {
        let duration = parse_duration_text(duration_text)?;
        let date = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(StoreError::ClockFormat)?;

        Ok(Self {
            distance,
            duration,
            pace: compute_pace(distance, duration),
            date,
            notes: notes.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Imported sessions with an already-known id are dropped; survivors are
    /// appended after the existing collection.
    Merge,
    /// The collection becomes exactly the imported sessions.
    Replace,
}

/// Time-based prefix for sortability plus a random suffix. Uniqueness is
/// probabilistic: there is exactly one writer and no collision retry.
pub(crate) fn generate_session_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let random = Uuid::new_v4().simple().to_string();
    format!("session-{millis}-{}", &random[..9])
}

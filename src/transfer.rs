//! Export/import transforms for the session collection.
//!
//! JSON export is lossless: re-importing an exported document reproduces the
//! session array field-for-field. CSV export is one-way.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::error::TransferError;
use crate::schema::SwimSession;

pub const EXPORT_VERSION: &str = "1.0";

pub const CSV_HEADER: &str = "Date,Distance (m),Duration (seconds),Pace (sec/100m),Notes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: String,
    pub session_count: usize,
    pub sessions: Vec<SwimSession>,
}

/// Result of [`import_from_json`]: the parsed sessions plus the document
/// version, defaulting to [`EXPORT_VERSION`] when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub sessions: Vec<SwimSession>,
    pub version: String,
}

pub fn export_to_json(sessions: &[SwimSession]) -> Result<String, TransferError> {
    let document = ExportDocument {
        version: EXPORT_VERSION.to_string(),
        export_date: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(TransferError::ClockFormat)?,
        session_count: sessions.len(),
        sessions: sessions.to_vec(),
    };

    serde_json::to_string_pretty(&document).map_err(|source| TransferError::Serialize { source })
}

/// Header plus one row per session; pace with exactly two decimals, notes
/// double-quoted with internal quotes doubled.
#[must_use]
pub fn export_to_csv(sessions: &[SwimSession]) -> String {
    let mut lines = Vec::with_capacity(sessions.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for session in sessions {
        let notes = session.notes.as_deref().unwrap_or("");
        lines.push(format!(
            "{},{},{},{:.2},\"{}\"",
            normalize_date(&session.date),
            session.distance,
            session.duration,
            session.pace,
            notes.replace('"', "\"\""),
        ));
    }

    lines.join("\n")
}

/// Parses an export document. The top-level `sessions` array must exist, and
/// every element must carry truthy `id`, `distance`, `duration`, `pace`, and
/// `date` fields (empty strings and zero numbers are not truthy). Performs no
/// deduplication and no range validation; that is the store's import job.
pub fn import_from_json(content: &str) -> Result<Import, TransferError> {
    let document: Value =
        serde_json::from_str(content).map_err(|source| TransferError::Parse { source })?;
    let raw_sessions = document
        .get("sessions")
        .and_then(Value::as_array)
        .ok_or(TransferError::InvalidFormat)?;

    for (index, raw) in raw_sessions.iter().enumerate() {
        let valid = ["id", "distance", "duration", "pace", "date"]
            .iter()
            .all(|field| is_truthy(raw.get(field)));
        if !valid {
            return Err(TransferError::InvalidSessionData { index });
        }
    }

    let sessions: Vec<SwimSession> = serde_json::from_value(Value::Array(raw_sessions.clone()))
        .map_err(|source| TransferError::SessionSchema { source })?;
    let version = document
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(EXPORT_VERSION)
        .to_string();

    Ok(Import { sessions, version })
}

/// Re-renders a stored date as UTC RFC 3339 so CSV rows are uniform even for
/// imported sessions carrying an offset. Unparseable dates pass through.
fn normalize_date(date: &str) -> String {
    OffsetDateTime::parse(date, &Rfc3339)
        .ok()
        .and_then(|parsed| parsed.to_offset(UtcOffset::UTC).format(&Rfc3339).ok())
        .unwrap_or_else(|| date.to_string())
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64().map_or(false, |number| number != 0.0),
        Some(Value::Bool(flag)) => *flag,
        _ => false,
    }
}

/// Conventional export filename: `swimdash-export-YYYY-MM-DD.<extension>`.
#[must_use]
pub fn export_file_name(extension: &str, date: Date) -> String {
    format!(
        "swimdash-export-{:04}-{:02}-{:02}.{extension}",
        date.year(),
        u8::from(date.month()),
        date.day(),
    )
}

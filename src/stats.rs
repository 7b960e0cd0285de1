//! Aggregate statistics over the session collection.

use std::collections::BTreeMap;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::schema::SwimSession;

/// Simple sums and means over the full collection; all zero when empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_sessions: usize,
    pub total_distance: u64,
    pub total_duration: u64,
    pub average_pace: f64,
    pub average_distance: f64,
    pub average_duration: f64,
}

#[must_use]
pub fn statistics(sessions: &[SwimSession]) -> Statistics {
    if sessions.is_empty() {
        return Statistics::default();
    }

    let total_distance: u64 = sessions.iter().map(|session| u64::from(session.distance)).sum();
    let total_duration: u64 = sessions.iter().map(|session| u64::from(session.duration)).sum();
    let total_pace: f64 = sessions.iter().map(|session| session.pace).sum();
    let count = sessions.len() as f64;

    Statistics {
        total_sessions: sessions.len(),
        total_distance,
        total_duration,
        average_pace: total_pace / count,
        average_distance: total_distance as f64 / count,
        average_duration: total_duration as f64 / count,
    }
}

/// Distance and session count for one ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyTotal {
    pub year: i32,
    pub week: u8,
    pub distance: u64,
    pub sessions: usize,
}

/// Groups sessions into ISO-week buckets, oldest first, keeping the most
/// recent `last_weeks` buckets. Sessions with unparseable dates are skipped.
#[must_use]
pub fn weekly_totals(sessions: &[SwimSession], last_weeks: usize) -> Vec<WeeklyTotal> {
    let mut buckets: BTreeMap<(i32, u8), (u64, usize)> = BTreeMap::new();
    for session in sessions {
        let Ok(date) = OffsetDateTime::parse(&session.date, &Rfc3339) else {
            continue;
        };
        // ISO year, not calendar year: late-December dates can belong to week
        // 1 of the following ISO year and vice versa.
        let (iso_year, iso_week, _) = date.to_iso_week_date();
        let bucket = buckets.entry((iso_year, iso_week)).or_insert((0, 0));
        bucket.0 += u64::from(session.distance);
        bucket.1 += 1;
    }

    let mut totals: Vec<WeeklyTotal> = buckets
        .into_iter()
        .map(|((year, week), (distance, sessions))| WeeklyTotal {
            year,
            week,
            distance,
            sessions,
        })
        .collect();
    if totals.len() > last_weeks {
        totals.drain(..totals.len() - last_weeks);
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::{statistics, weekly_totals};
    use crate::schema::SwimSession;

    fn session(id: &str, distance: u32, date: &str) -> SwimSession {
        SwimSession {
            id: id.to_string(),
            distance,
            duration: 1800,
            pace: 120.0,
            date: date.to_string(),
            notes: None,
        }
    }

    #[test]
    fn empty_collection_yields_all_zero_statistics() {
        let stats = statistics(&[]);

        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_distance, 0);
        assert_eq!(stats.total_duration, 0);
        assert_eq!(stats.average_pace, 0.0);
        assert_eq!(stats.average_distance, 0.0);
        assert_eq!(stats.average_duration, 0.0);
    }

    #[test]
    fn statistics_sum_and_average_over_the_collection() {
        let sessions = vec![
            session("a", 1000, "2026-03-02T08:00:00Z"),
            session("b", 2000, "2026-03-04T08:00:00Z"),
        ];

        let stats = statistics(&sessions);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_distance, 3000);
        assert_eq!(stats.total_duration, 3600);
        assert_eq!(stats.average_pace, 120.0);
        assert_eq!(stats.average_distance, 1500.0);
        assert_eq!(stats.average_duration, 1800.0);
    }

    #[test]
    fn weekly_totals_bucket_by_iso_week_and_keep_recent_weeks() {
        let sessions = vec![
            session("a", 1000, "2026-03-02T08:00:00Z"),
            session("b", 500, "2026-03-04T08:00:00Z"),
            session("c", 2000, "2026-03-09T08:00:00Z"),
            session("d", 1500, "2026-02-02T08:00:00Z"),
            session("bad", 9999, "not-a-date"),
        ];

        let totals = weekly_totals(&sessions, 2);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].distance, 1500);
        assert_eq!(totals[0].sessions, 2);
        assert_eq!(totals[1].distance, 2000);
        assert_eq!(totals[1].sessions, 1);
    }

    #[test]
    fn weekly_totals_keep_year_boundary_weeks_intact() {
        // 2024-12-30 falls in ISO week 1 of ISO year 2025, the same week as
        // 2025-01-02; 2024-12-20 is ISO week 51 of 2024.
        let sessions = vec![
            session("mid-december", 500, "2024-12-20T08:00:00Z"),
            session("late-december", 1000, "2024-12-30T08:00:00Z"),
            session("early-january", 2000, "2025-01-02T08:00:00Z"),
        ];

        let totals = weekly_totals(&sessions, 4);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].year, 2024);
        assert_eq!(totals[0].week, 51);
        assert_eq!(totals[0].distance, 500);
        assert_eq!(totals[1].year, 2025);
        assert_eq!(totals[1].week, 1);
        assert_eq!(totals[1].distance, 3000);
        assert_eq!(totals[1].sessions, 2);
    }
}

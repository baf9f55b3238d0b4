// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance records written by the check-in transaction.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// One check-in of one user at one gym on one day.
///
/// Stored at `attendance/{gym}_{user}_{day}` so that a second check-in on the
/// same day lands on the same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub user_id: String,
    pub gym_id: String,
    /// Local day ("YYYY-MM-DD")
    pub day: String,
    /// When the check-in happened (RFC3339, UTC)
    pub checked_in_at: String,
}

impl AttendanceRecord {
    pub fn new(user_id: &str, gym_id: &str, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            user_id: user_id.to_string(),
            gym_id: gym_id.to_string(),
            day: attendance_day(now, offset),
            checked_in_at: crate::time_utils::format_utc_rfc3339(now),
        }
    }

    /// Document ID; each part is percent-encoded so ids stay path-safe.
    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}_{}",
            urlencoding::encode(&self.gym_id),
            urlencoding::encode(&self.user_id),
            self.day
        )
    }
}

/// The calendar day of `now` at the gym's UTC offset.
pub fn attendance_day(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).format("%Y-%m-%d").to_string()
}

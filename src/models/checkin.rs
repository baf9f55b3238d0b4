// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in invoker contract types.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Input to a check-in: `{ userId, gymId? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym_id: Option<String>,
}

/// Why a check-in was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum CheckInFailure {
    MembershipInactive,
    Unknown,
}

/// Result of a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// Accepted. `duplicate` is true when the user was already checked in
    /// for the current day.
    CheckedIn { duplicate: bool },
    Rejected(CheckInFailure),
}

impl CheckInOutcome {
    /// Only a brand-new attendance record is worth showing on the kiosk.
    pub fn is_new_check_in(&self) -> bool {
        matches!(self, CheckInOutcome::CheckedIn { duplicate: false })
    }
}

/// Wire form: `{ok: true, duplicate}` or `{ok: false, reason}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckInResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<CheckInFailure>,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        match outcome {
            CheckInOutcome::CheckedIn { duplicate } => Self {
                ok: true,
                duplicate: Some(duplicate),
                reason: None,
            },
            CheckInOutcome::Rejected(reason) => Self {
                ok: false,
                duplicate: None,
                reason: Some(reason),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shapes() {
        let ok = CheckInResponse::from(CheckInOutcome::CheckedIn { duplicate: false });
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"ok": true, "duplicate": false})
        );

        let refused =
            CheckInResponse::from(CheckInOutcome::Rejected(CheckInFailure::MembershipInactive));
        assert_eq!(
            serde_json::to_value(&refused).unwrap(),
            json!({"ok": false, "reason": "membership_inactive"})
        );
    }

    #[test]
    fn test_request_omits_missing_gym() {
        let request = CheckInRequest {
            user_id: "u1".to_string(),
            gym_id: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"userId": "u1"})
        );
    }

    #[test]
    fn test_only_new_check_in_counts() {
        assert!(CheckInOutcome::CheckedIn { duplicate: false }.is_new_check_in());
        assert!(!CheckInOutcome::CheckedIn { duplicate: true }.is_new_check_in());
        assert!(!CheckInOutcome::Rejected(CheckInFailure::Unknown).is_new_check_in());
    }
}

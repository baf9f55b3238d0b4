//! Member/staff user documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Membership status value that allows check-in.
pub const MEMBERSHIP_ACTIVE: &str = "active";

/// User document in the `users` collection.
///
/// The dashboard writes these; this service only reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Firestore document ID (filled in on reads, never written)
    #[serde(rename = "_firestore_id", skip_serializing, default)]
    pub id: Option<String>,
    /// External auth provider identifier
    #[serde(default)]
    pub uid: Option<String>,
    /// Short human-assignable code printed on cards
    #[serde(default)]
    pub member_code: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// "member", "coach" or "admin"
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub membership_status: Option<String>,
    /// When the current membership ends (RFC3339)
    #[serde(default)]
    pub membership_expires_at: Option<String>,
}

impl UserRecord {
    /// Whether the membership allows checking in at `now`.
    ///
    /// An unparseable expiry is treated as expired.
    pub fn membership_active(&self, now: DateTime<Utc>) -> bool {
        if self.membership_status.as_deref() != Some(MEMBERSHIP_ACTIVE) {
            return false;
        }

        match self.membership_expires_at.as_deref() {
            None => true,
            Some(raw) => crate::time_utils::parse_utc_rfc3339(raw)
                .is_some_and(|expires| expires > now),
        }
    }
}

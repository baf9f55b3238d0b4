//! Member-code indirection records.

use serde::{Deserialize, Serialize};

/// Document in `member_codes/{code}` pointing at a user document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCodeMapping {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl MemberCodeMapping {
    /// The target user id, if present and non-blank.
    pub fn target(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Indirection table: code -> `{ userId }`
    pub const MEMBER_CODES: &str = "member_codes";
    pub const ATTENDANCE: &str = "attendance";
}

/// Queried field names on user documents.
pub mod fields {
    pub const UID: &str = "uid";
    pub const MEMBER_CODE: &str = "memberCode";
}

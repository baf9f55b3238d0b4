// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (read by id or by an indexed field)
//! - Member codes (indirection table)
//! - Attendance (transactional check-in writes)

use crate::db::{collections, fields};
use crate::error::AppError;
use crate::models::{AttendanceRecord, MemberCodeMapping, UserRecord};
use crate::services::resolver::UserDirectory;
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use serde::Deserialize;

/// Just the document ID of a user, for lookups that must not depend on the
/// rest of the user schema.
#[derive(Debug, Deserialize)]
struct UserRef {
    #[serde(rename = "_firestore_id", default)]
    id: Option<String>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator rejects real credentials, so connect unauthenticated.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user document by its document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        let user: Option<UserRecord> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Fall back to the requested id if the driver did not inject one
        Ok(user.map(|mut u| {
            u.id.get_or_insert_with(|| user_id.to_string());
            u
        }))
    }

    /// Find the document ID of the first user whose `field` equals `value`.
    pub async fn find_user_id_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<String>, AppError> {
        let field = field.to_string();
        let value = value.to_string();

        let users: Vec<UserRef> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field(field.as_str()).eq(value.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next().and_then(|u| u.id))
    }

    /// Whether a user document exists, regardless of its contents.
    pub async fn user_doc_exists(&self, user_id: &str) -> Result<bool, AppError> {
        let user: Option<UserRef> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(user.is_some())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user_id: &str, user: &UserRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Member Code Operations ──────────────────────────────────

    /// Get a member-code mapping by code.
    pub async fn get_member_code(&self, code: &str) -> Result<Option<MemberCodeMapping>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MEMBER_CODES)
            .obj()
            .one(code)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a member-code mapping.
    pub async fn set_member_code(
        &self,
        code: &str,
        mapping: &MemberCodeMapping,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MEMBER_CODES)
            .document_id(code)
            .object(mapping)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Attendance Operations ───────────────────────────────────

    /// Get an attendance record by document ID.
    pub async fn get_attendance(&self, doc_id: &str) -> Result<Option<AttendanceRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ATTENDANCE)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically record a check-in.
    ///
    /// The record is created with a must-not-exist precondition, so of any
    /// number of concurrent check-ins for the same user, gym and day exactly
    /// one creates it. Returns `true` if this call created the record, `false`
    /// if it already existed (duplicate).
    pub async fn record_attendance_atomic(
        &self,
        record: &AttendanceRecord,
    ) -> Result<bool, AppError> {
        let doc_id = record.doc_id();

        let created: Result<AttendanceRecord, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ATTENDANCE)
            .document_id(&doc_id)
            .object(record)
            .execute()
            .await;

        match created {
            Ok(_) => {
                tracing::info!(
                    user_id = %record.user_id,
                    gym_id = %record.gym_id,
                    day = %record.day,
                    "Attendance recorded"
                );
                Ok(true)
            }
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(
                    user_id = %record.user_id,
                    gym_id = %record.gym_id,
                    day = %record.day,
                    "Already checked in today"
                );
                Ok(false)
            }
            Err(e) => Err(AppError::Database(format!(
                "Failed to create attendance record: {}",
                e
            ))),
        }
    }
}

#[async_trait]
impl UserDirectory for FirestoreDb {
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError> {
        self.user_doc_exists(user_id).await
    }

    async fn find_user_by_uid(&self, uid: &str) -> Result<Option<String>, AppError> {
        self.find_user_id_by_field(fields::UID, uid).await
    }

    async fn find_user_by_member_code(&self, code: &str) -> Result<Option<String>, AppError> {
        self.find_user_id_by_field(fields::MEMBER_CODE, code).await
    }

    async fn get_member_code_mapping(
        &self,
        code: &str,
    ) -> Result<Option<MemberCodeMapping>, AppError> {
        self.get_member_code(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_mode_errors() {
        let db = FirestoreDb::new_mock();

        let err = db.get_user("abc").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = db.find_user_by_member_code("MBR-1").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = db
            .record_attendance_atomic(&AttendanceRecord {
                user_id: "abc".to_string(),
                gym_id: "main".to_string(),
                day: "2026-03-01".to_string(),
                checked_in_at: "2026-03-01T08:00:00Z".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_user_ref_ignores_stored_fields() {
        let user: UserRef = serde_json::from_str(
            r#"{"id":"legacy","membershipStatus":{"nested":true},"_firestore_id":"doc-1"}"#,
        )
        .unwrap();

        assert_eq!(user.id.as_deref(), Some("doc-1"));
    }
}

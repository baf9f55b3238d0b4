// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution: scan token -> user document ID.
//!
//! Tokens are tried against a fixed, ordered list of lookup strategies.
//! The first strategy that finds a user wins; later strategies are not
//! queried, which keeps the common direct-id case to a single read.
//!
//! Resolution only reads. Nothing here writes to users or member codes.

use crate::error::AppError;
use crate::models::MemberCodeMapping;
use async_trait::async_trait;
use std::sync::Arc;

/// Firestore rejects document IDs longer than this many bytes.
const MAX_DOC_ID_BYTES: usize = 1500;

/// Auth provider uids are 20 to 40 characters.
const UID_MIN_LEN: usize = 20;
const UID_MAX_LEN: usize = 40;

/// Read-only view of the user store needed for resolution.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether `users/{user_id}` exists.
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError>;

    /// Document ID of the first user whose `uid` equals `uid`.
    async fn find_user_by_uid(&self, uid: &str) -> Result<Option<String>, AppError>;

    /// Document ID of the first user whose `memberCode` equals `code`.
    async fn find_user_by_member_code(&self, code: &str) -> Result<Option<String>, AppError>;

    /// The `member_codes/{code}` document, if any.
    async fn get_member_code_mapping(
        &self,
        code: &str,
    ) -> Result<Option<MemberCodeMapping>, AppError>;
}

/// Whether a token looks like an auth-provider uid:
/// ASCII letters, digits, `_` or `-`, between 20 and 40 characters inclusive.
///
/// Tokens failing this check never trigger the `uid` query.
pub fn is_uid_like(token: &str) -> bool {
    (UID_MIN_LEN..=UID_MAX_LEN).contains(&token.len())
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Whether Firestore would accept the token as a document ID.
pub fn is_valid_doc_id(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_DOC_ID_BYTES
        && !token.contains('/')
        && token != "."
        && token != ".."
        && !(token.len() >= 4 && token.starts_with("__") && token.ends_with("__"))
}

/// One way of turning a token into a user document ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// The token is the user document ID.
    DirectId,
    /// The token is the external auth uid stored on the user.
    AuthUid,
    /// The token is the user's `memberCode`.
    MemberCode,
    /// The token is a key in the `member_codes` table.
    MemberCodeTable,
}

impl LookupStrategy {
    /// Resolution order. Earlier strategies win.
    pub const ORDER: [LookupStrategy; 4] = [
        LookupStrategy::DirectId,
        LookupStrategy::AuthUid,
        LookupStrategy::MemberCode,
        LookupStrategy::MemberCodeTable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LookupStrategy::DirectId => "direct_id",
            LookupStrategy::AuthUid => "auth_uid",
            LookupStrategy::MemberCode => "member_code",
            LookupStrategy::MemberCodeTable => "member_code_table",
        }
    }

    /// Whether this strategy can possibly match `token`. Skipped strategies
    /// cost no reads.
    pub fn applies_to(&self, token: &str) -> bool {
        match self {
            LookupStrategy::DirectId | LookupStrategy::MemberCodeTable => is_valid_doc_id(token),
            LookupStrategy::AuthUid => is_uid_like(token),
            LookupStrategy::MemberCode => true,
        }
    }

    /// Run this lookup.
    pub async fn lookup(
        &self,
        directory: &dyn UserDirectory,
        token: &str,
    ) -> Result<Option<String>, AppError> {
        match self {
            LookupStrategy::DirectId => Ok(directory
                .user_exists(token)
                .await?
                .then(|| token.to_string())),
            LookupStrategy::AuthUid => directory.find_user_by_uid(token).await,
            LookupStrategy::MemberCode => directory.find_user_by_member_code(token).await,
            LookupStrategy::MemberCodeTable => Ok(directory
                .get_member_code_mapping(token)
                .await?
                .and_then(|mapping| mapping.target().map(str::to_string))),
        }
    }
}

/// Run `strategies` in order and return the first hit.
///
/// A failing lookup aborts the whole resolution.
pub async fn first_match(
    strategies: &[LookupStrategy],
    directory: &dyn UserDirectory,
    token: &str,
) -> Result<Option<(LookupStrategy, String)>, AppError> {
    for strategy in strategies {
        if !strategy.applies_to(token) {
            continue;
        }

        if let Some(user_id) = strategy.lookup(directory, token).await? {
            return Ok(Some((*strategy, user_id)));
        }
    }

    Ok(None)
}

/// Resolves scan tokens to user document IDs.
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn UserDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// The underlying directory.
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    /// Resolve a token to a user document ID.
    ///
    /// `Ok(None)` when no strategy matches; blank tokens resolve to nothing
    /// without any reads.
    pub async fn resolve(&self, token: &str) -> Result<Option<String>, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let found = first_match(&LookupStrategy::ORDER, self.directory.as_ref(), token).await?;

        match &found {
            Some((strategy, user_id)) => {
                tracing::debug!(strategy = strategy.name(), user_id = %user_id, "Token resolved");
            }
            None => tracing::debug!("Token did not match any user"),
        }

        Ok(found.map(|(_, user_id)| user_id))
    }
}

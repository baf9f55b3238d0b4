// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in flow: parse -> resolve -> invoke.
//!
//! Kiosk scans fail silently: every failure is logged and the kiosk stays
//! idle. Only a brand-new check-in changes what the kiosk shows. Manual
//! check-ins are a deliberate staff action, so they report their outcome.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{AttendanceRecord, CheckInFailure, CheckInOutcome, CheckInRequest, KioskState};
use crate::services::kiosk::{KioskRegistry, ScanTicket};
use crate::services::resolver::IdentityResolver;
use crate::services::token::parse_scan_token;
use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Instant;

/// Performs the attendance mutation for a resolved user.
///
/// Implementations own duplicate detection and membership validation.
#[async_trait]
pub trait CheckInInvoker: Send + Sync {
    async fn check_in(&self, request: CheckInRequest) -> Result<CheckInOutcome, AppError>;
}

/// Check-in backed by a Firestore transaction on the `attendance` collection.
pub struct FirestoreCheckIn {
    db: FirestoreDb,
    default_gym_id: String,
    utc_offset: FixedOffset,
}

impl FirestoreCheckIn {
    pub fn new(
        db: FirestoreDb,
        default_gym_id: String,
        utc_offset_minutes: i32,
    ) -> Result<Self, AppError> {
        let utc_offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid attendance UTC offset: {} minutes",
                    utc_offset_minutes
                )
            })?;

        Ok(Self {
            db,
            default_gym_id,
            utc_offset,
        })
    }
}

#[async_trait]
impl CheckInInvoker for FirestoreCheckIn {
    async fn check_in(&self, request: CheckInRequest) -> Result<CheckInOutcome, AppError> {
        let now = chrono::Utc::now();
        let gym_id = request.gym_id.as_deref().unwrap_or(&self.default_gym_id);

        let Some(user) = self.db.get_user(&request.user_id).await? else {
            tracing::warn!(user_id = %request.user_id, "Check-in for missing user");
            return Ok(CheckInOutcome::Rejected(CheckInFailure::Unknown));
        };

        if !user.membership_active(now) {
            return Ok(CheckInOutcome::Rejected(
                CheckInFailure::MembershipInactive,
            ));
        }

        let record = AttendanceRecord::new(&request.user_id, gym_id, now, self.utc_offset);
        let created = self.db.record_attendance_atomic(&record).await?;

        Ok(CheckInOutcome::CheckedIn {
            duplicate: !created,
        })
    }
}

/// Ties the token parser, resolver, invoker and kiosk state together.
pub struct CheckInService {
    resolver: IdentityResolver,
    invoker: Arc<dyn CheckInInvoker>,
    kiosks: KioskRegistry,
    app_domains: Vec<String>,
    default_gym_id: String,
}

impl CheckInService {
    pub fn new(
        resolver: IdentityResolver,
        invoker: Arc<dyn CheckInInvoker>,
        kiosks: KioskRegistry,
        app_domains: Vec<String>,
        default_gym_id: String,
    ) -> Self {
        Self {
            resolver,
            invoker,
            kiosks,
            app_domains,
            default_gym_id,
        }
    }

    pub fn kiosks(&self) -> &KioskRegistry {
        &self.kiosks
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Handle one raw read from a kiosk camera and return the kiosk state
    /// afterwards.
    ///
    /// Accepted reads run on their own task so that a client hanging up
    /// mid-request cannot leave the kiosk stuck in the resolving state.
    pub async fn handle_scan(self: &Arc<Self>, kiosk_id: &str, raw: &str) -> KioskState {
        let raw = raw.trim();
        if raw.is_empty() {
            return self.kiosks.state_at(kiosk_id, Instant::now());
        }

        let Some(ticket) = self.kiosks.begin_scan(kiosk_id, raw, Instant::now()) else {
            tracing::trace!(kiosk_id, "Scan ignored");
            return self.kiosks.state_at(kiosk_id, Instant::now());
        };

        let service = Arc::clone(self);
        let raw = raw.to_string();
        let task_ticket = ticket.clone();
        let task = tokio::spawn(async move {
            let new_check_in = service.process_scan(&task_ticket, &raw).await;
            service
                .kiosks
                .finish_scan(task_ticket, Instant::now(), new_check_in);
        });

        if let Err(e) = task.await {
            tracing::error!(kiosk_id, error = %e, "Scan task failed");
            // Release the kiosk; the task never handed its ticket back
            self.kiosks.finish_scan(ticket, Instant::now(), false);
        }

        self.kiosks.state_at(kiosk_id, Instant::now())
    }

    /// Parse, resolve and check in. Returns whether a new check-in happened.
    async fn process_scan(&self, ticket: &ScanTicket, raw: &str) -> bool {
        let kiosk_id = ticket.kiosk_id.as_str();

        let Some(token) = parse_scan_token(raw, &self.app_domains) else {
            return false;
        };

        let user_id = match self.resolver.resolve(token.as_str()).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                tracing::debug!(kiosk_id, token = %token, "Scanned token matched no user");
                return false;
            }
            Err(e) => {
                tracing::warn!(kiosk_id, error = %e, "Token resolution failed");
                return false;
            }
        };

        let request = CheckInRequest {
            user_id,
            gym_id: Some(
                ticket
                    .gym_id
                    .clone()
                    .unwrap_or_else(|| self.default_gym_id.clone()),
            ),
        };

        match self.invoker.check_in(request.clone()).await {
            Ok(outcome) => {
                log_outcome(kiosk_id, &request, outcome);
                outcome.is_new_check_in()
            }
            Err(e) => {
                tracing::warn!(
                    kiosk_id,
                    user_id = %request.user_id,
                    error = %e,
                    "Check-in call failed"
                );
                false
            }
        }
    }

    /// Check in from a typed identifier (document id, uid or member code).
    pub async fn manual_check_in(
        &self,
        input: &str,
        gym_id: Option<String>,
    ) -> Result<CheckInOutcome, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::BadRequest("Member identifier is required".to_string()));
        }

        let user_id = self
            .resolver
            .resolve(input)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No member matches '{}'", input)))?;

        let request = CheckInRequest {
            user_id,
            gym_id: Some(gym_id.unwrap_or_else(|| self.default_gym_id.clone())),
        };

        let outcome = self.invoker.check_in(request.clone()).await?;
        log_outcome("manual", &request, outcome);
        Ok(outcome)
    }
}

fn log_outcome(source: &str, request: &CheckInRequest, outcome: CheckInOutcome) {
    match outcome {
        CheckInOutcome::CheckedIn { duplicate: false } => tracing::info!(
            source,
            user_id = %request.user_id,
            gym_id = ?request.gym_id,
            "Checked in"
        ),
        CheckInOutcome::CheckedIn { duplicate: true } => tracing::debug!(
            source,
            user_id = %request.user_id,
            "Already checked in"
        ),
        CheckInOutcome::Rejected(reason) => tracing::warn!(
            source,
            user_id = %request.user_id,
            reason = ?reason,
            "Check-in refused"
        ),
    }
}

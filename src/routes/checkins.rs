// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Manual check-in route (front desk fallback when no camera is available).

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::CheckInResponse;
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/checkins/manual", post(manual_check_in))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ManualCheckInRequest {
    /// Document id, auth uid or member code as typed by staff
    #[validate(length(min = 1, max = 256))]
    input: String,
    #[validate(length(min = 1, max = 128))]
    gym_id: Option<String>,
}

/// Check a member in by identifier and report the outcome.
async fn manual_check_in(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ManualCheckInRequest>,
) -> Result<Json<CheckInResponse>> {
    body.validate()?;

    tracing::info!(subject = %user.subject, "Manual check-in");

    let outcome = state
        .checkin
        .manual_check_in(&body.input, body.gym_id)
        .await?;

    Ok(Json(outcome.into()))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Kiosk routes: camera toggle, status and scan ingestion.
//!
//! Scan responses never reveal why a read was ignored or failed; the kiosk
//! only learns its display state.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::KioskState;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest accepted kiosk ID.
const MAX_KIOSK_ID_LEN: usize = 64;

/// Kiosk routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/kiosk/{kiosk_id}", get(get_status))
        .route("/api/kiosk/{kiosk_id}/camera", post(set_camera))
        .route("/api/kiosk/{kiosk_id}/scan", post(scan))
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct KioskStatusResponse {
    pub kiosk_id: String,
    pub state: KioskState,
    pub gym_id: Option<String>,
}

fn validate_kiosk_id(kiosk_id: &str) -> Result<()> {
    let valid = !kiosk_id.is_empty()
        && kiosk_id.len() <= MAX_KIOSK_ID_LEN
        && kiosk_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(crate::error::AppError::BadRequest(
            "Invalid kiosk id".to_string(),
        ))
    }
}

fn status(state: &AppState, kiosk_id: String) -> KioskStatusResponse {
    let session = state.checkin.kiosks().session(&kiosk_id);
    KioskStatusResponse {
        state: session.state_at(Instant::now()),
        gym_id: session.gym_id().map(str::to_string),
        kiosk_id,
    }
}

/// Current kiosk display state.
async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(kiosk_id): Path<String>,
) -> Result<Json<KioskStatusResponse>> {
    validate_kiosk_id(&kiosk_id)?;
    Ok(Json(status(&state, kiosk_id)))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CameraRequest {
    enabled: bool,
    /// Location this kiosk checks members into
    #[validate(length(min = 1, max = 128))]
    gym_id: Option<String>,
}

/// Turn a kiosk camera on or off.
async fn set_camera(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(kiosk_id): Path<String>,
    Json(body): Json<CameraRequest>,
) -> Result<Json<KioskStatusResponse>> {
    validate_kiosk_id(&kiosk_id)?;
    body.validate()?;

    tracing::info!(
        kiosk_id = %kiosk_id,
        subject = %user.subject,
        enabled = body.enabled,
        "Camera toggle requested"
    );

    let gym_id = body
        .gym_id
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());
    state
        .checkin
        .kiosks()
        .set_camera(&kiosk_id, body.enabled, gym_id);

    Ok(Json(status(&state, kiosk_id)))
}

#[derive(Deserialize, Validate)]
struct ScanRequest {
    /// Raw string decoded from the QR code
    #[validate(length(max = 4096))]
    raw: String,
}

/// Submit one decoded QR payload.
async fn scan(
    State(state): State<Arc<AppState>>,
    Path(kiosk_id): Path<String>,
    Json(body): Json<ScanRequest>,
) -> Result<Json<KioskStatusResponse>> {
    validate_kiosk_id(&kiosk_id)?;
    body.validate()?;

    state.checkin.handle_scan(&kiosk_id, &body.raw).await;

    Ok(Json(status(&state, kiosk_id)))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member badge route.

use crate::error::{AppError, Result};
use crate::services::badge::{member_badge_url, render_badge_svg};
use crate::services::resolver::is_valid_doc_id;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/members/{user_id}/qr", get(get_badge))
}

/// QR code (SVG) for a member's profile link.
async fn get_badge(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let directory = state.checkin.resolver().directory();
    if !is_valid_doc_id(&user_id) || !directory.user_exists(&user_id).await? {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    let url = member_badge_url(state.config.primary_domain(), &user_id);
    let svg = render_badge_svg(&url)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member badge QR codes.

use crate::error::AppError;
use qrcode::render::svg;
use qrcode::QrCode;

/// Smallest rendered badge edge, in pixels.
const MIN_BADGE_PX: u32 = 240;

/// Profile link printed on a member's badge. The token parser maps it back
/// to `user_id`.
pub fn member_badge_url(domain: &str, user_id: &str) -> String {
    format!(
        "https://{}/member/{}",
        domain,
        urlencoding::encode(user_id)
    )
}

/// Render `payload` as an SVG QR code.
pub fn render_badge_svg(payload: &str) -> Result<String, AppError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to encode badge QR code: {}", e))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(MIN_BADGE_PX, MIN_BADGE_PX)
        .build())
}

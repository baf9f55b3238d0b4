// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GrindUp Check-in API Server
//!
//! Resolves QR badge scans from gym kiosks to members and records their
//! attendance.

use grindup_checkin::{
    config::Config,
    db::FirestoreDb,
    services::{CheckInService, FirestoreCheckIn, IdentityResolver, KioskRegistry},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting GrindUp check-in API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let invoker = FirestoreCheckIn::new(
        db.clone(),
        config.default_gym_id.clone(),
        config.attendance_utc_offset_minutes,
    )
    .expect("Invalid attendance configuration");

    let kiosks = KioskRegistry::new(config.scan_cooldown, config.success_flash);
    tracing::info!(
        cooldown_ms = config.scan_cooldown.as_millis() as u64,
        flash_ms = config.success_flash.as_millis() as u64,
        domains = ?config.app_domains,
        "Kiosk controller initialized"
    );

    let checkin = CheckInService::new(
        IdentityResolver::new(Arc::new(db)),
        Arc::new(invoker),
        kiosks,
        config.app_domains.clone(),
        config.default_gym_id.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        checkin: Arc::new(checkin),
    });

    // Build router
    let app = grindup_checkin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("grindup_checkin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

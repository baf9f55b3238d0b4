// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GrindUp check-in: QR attendance backend for the gym kiosks
//!
//! Kiosks post decoded QR payloads; this crate turns them into member IDs
//! and records attendance in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::CheckInService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub checkin: Arc<CheckInService>,
}

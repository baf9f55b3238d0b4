// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod badge;
pub mod checkin;
pub mod kiosk;
pub mod resolver;
pub mod token;

pub use checkin::{CheckInInvoker, CheckInService, FirestoreCheckIn};
pub use kiosk::KioskRegistry;
pub use resolver::{IdentityResolver, UserDirectory};
pub use token::{parse_scan_token, ScanToken};

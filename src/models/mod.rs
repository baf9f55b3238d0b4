// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod attendance;
pub mod checkin;
pub mod kiosk;
pub mod member_code;
pub mod user;

pub use attendance::AttendanceRecord;
pub use checkin::{CheckInFailure, CheckInOutcome, CheckInRequest, CheckInResponse};
pub use kiosk::KioskState;
pub use member_code::MemberCodeMapping;
pub use user::UserRecord;

//! Kiosk display states.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// What the kiosk screen should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum KioskState {
    CameraOff,
    CameraOnIdle,
    CameraOnSuccessFlash,
}

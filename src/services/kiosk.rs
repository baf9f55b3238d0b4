// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Kiosk scan-loop controller.
//!
//! Each kiosk device posts every QR payload its camera decodes. This module
//! keeps the per-kiosk state that decides which reads are processed:
//!
//! - camera on/off and the success flash shown after a new check-in
//! - debounce of repeated reads of the same physical badge
//! - at most one resolution in flight per kiosk
//!
//! No state is held across an `.await`: callers take a [`ScanTicket`] with
//! [`KioskRegistry::begin_scan`], do their I/O, and hand the ticket back to
//! [`KioskRegistry::finish_scan`].

use crate::models::KioskState;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Debounce decision for one read.
///
/// A read is accepted only if `cooldown` has elapsed since the last accepted
/// read AND `raw` differs from the last accepted raw string. The first read
/// after the camera turns on is always accepted.
pub fn should_accept(
    now: Instant,
    raw: &str,
    last_at: Option<Instant>,
    last_raw: Option<&str>,
    cooldown: Duration,
) -> bool {
    let cooled_down = last_at.map_or(true, |at| now.saturating_duration_since(at) >= cooldown);
    let changed = last_raw != Some(raw);
    cooled_down && changed
}

/// Controller state for one kiosk.
#[derive(Debug, Default, Clone)]
pub struct KioskSession {
    camera_on: bool,
    /// Bumped on every camera toggle; scans from older sessions are stale.
    generation: u64,
    gym_id: Option<String>,
    resolving: bool,
    last_accepted_at: Option<Instant>,
    last_accepted_raw: Option<String>,
    flash_until: Option<Instant>,
}

impl KioskSession {
    /// Display state at `now`. The success flash expires on its own.
    pub fn state_at(&self, now: Instant) -> KioskState {
        if !self.camera_on {
            KioskState::CameraOff
        } else if self.flash_until.is_some_and(|until| now < until) {
            KioskState::CameraOnSuccessFlash
        } else {
            KioskState::CameraOnIdle
        }
    }

    pub fn gym_id(&self) -> Option<&str> {
        self.gym_id.as_deref()
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// Turn the camera on or off. Any toggle starts a fresh session: debounce
    /// memory and the flash are cleared and in-flight scans become stale.
    fn set_camera(&mut self, on: bool, gym_id: Option<String>) {
        self.camera_on = on;
        self.generation += 1;
        self.gym_id = if on { gym_id } else { None };
        self.resolving = false;
        self.last_accepted_at = None;
        self.last_accepted_raw = None;
        self.flash_until = None;
    }

    /// Decide whether to process `raw`, recording it as accepted if so.
    fn begin_scan(&mut self, now: Instant, raw: &str, cooldown: Duration) -> Option<u64> {
        if !self.camera_on || self.resolving {
            return None;
        }

        if !should_accept(
            now,
            raw,
            self.last_accepted_at,
            self.last_accepted_raw.as_deref(),
            cooldown,
        ) {
            return None;
        }

        self.last_accepted_at = Some(now);
        self.last_accepted_raw = Some(raw.to_string());
        self.resolving = true;
        Some(self.generation)
    }

    /// Complete a scan. Returns `true` if the success flash was started.
    fn finish_scan(&mut self, generation: u64, now: Instant, flash: Option<Duration>) -> bool {
        if generation != self.generation {
            return false;
        }

        self.resolving = false;
        match flash {
            Some(duration) if self.camera_on => {
                self.flash_until = Some(now + duration);
                true
            }
            _ => false,
        }
    }
}

/// Permission to process one accepted read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    pub kiosk_id: String,
    pub gym_id: Option<String>,
    generation: u64,
}

/// All kiosk sessions, keyed by kiosk ID.
pub struct KioskRegistry {
    sessions: DashMap<String, KioskSession>,
    cooldown: Duration,
    flash: Duration,
}

impl KioskRegistry {
    pub fn new(cooldown: Duration, flash: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            cooldown,
            flash,
        }
    }

    /// Snapshot of a kiosk's session (camera off if never seen).
    pub fn session(&self, kiosk_id: &str) -> KioskSession {
        self.sessions
            .get(kiosk_id)
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Display state of a kiosk at `now`.
    pub fn state_at(&self, kiosk_id: &str, now: Instant) -> KioskState {
        self.session(kiosk_id).state_at(now)
    }

    /// Toggle a kiosk's camera.
    pub fn set_camera(&self, kiosk_id: &str, on: bool, gym_id: Option<String>) {
        let mut session = self.sessions.entry(kiosk_id.to_string()).or_default();
        session.set_camera(on, gym_id);
        tracing::info!(kiosk_id, camera_on = on, "Kiosk camera toggled");
    }

    /// Ask to process a raw read. `None` means ignore it (camera off,
    /// debounced, or another read still resolving).
    pub fn begin_scan(&self, kiosk_id: &str, raw: &str, now: Instant) -> Option<ScanTicket> {
        let mut session = self.sessions.get_mut(kiosk_id)?;
        let generation = session.begin_scan(now, raw, self.cooldown)?;

        Some(ScanTicket {
            kiosk_id: kiosk_id.to_string(),
            gym_id: session.gym_id.clone(),
            generation,
        })
    }

    /// Hand back a ticket. `new_check_in` starts the success flash, unless
    /// the camera was toggled while the scan was in flight.
    pub fn finish_scan(&self, ticket: ScanTicket, now: Instant, new_check_in: bool) -> bool {
        let Some(mut session) = self.sessions.get_mut(&ticket.kiosk_id) else {
            return false;
        };

        let flash = new_check_in.then_some(self.flash);
        let flashed = session.finish_scan(ticket.generation, now, flash);
        if new_check_in && !flashed {
            tracing::debug!(kiosk_id = %ticket.kiosk_id, "Discarding result from stale scan");
        }
        flashed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(1200);
    const FLASH: Duration = Duration::from_millis(1500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn registry_with_camera(kiosk: &str) -> KioskRegistry {
        let registry = KioskRegistry::new(COOLDOWN, FLASH);
        registry.set_camera(kiosk, true, Some("main".to_string()));
        registry
    }

    #[test]
    fn test_should_accept_first_read() {
        assert!(should_accept(Instant::now(), "A", None, None, COOLDOWN));
    }

    #[test]
    fn test_should_accept_requires_cooldown_and_change() {
        let t0 = Instant::now();

        // Same raw inside the window
        assert!(!should_accept(t0 + ms(800), "A", Some(t0), Some("A"), COOLDOWN));
        // Different raw inside the window
        assert!(!should_accept(t0 + ms(800), "B", Some(t0), Some("A"), COOLDOWN));
        // Same raw after the window
        assert!(!should_accept(t0 + ms(5000), "A", Some(t0), Some("A"), COOLDOWN));
        // Different raw after the window
        assert!(should_accept(t0 + ms(1200), "B", Some(t0), Some("A"), COOLDOWN));
    }

    #[test]
    fn test_same_badge_needs_another_read_in_between() {
        let registry = registry_with_camera("k1");
        let t0 = Instant::now();

        let ticket = registry.begin_scan("k1", "MBR-1", t0).unwrap();
        registry.finish_scan(ticket, t0 + ms(100), false);

        // Hours later the same badge is still the last accepted read
        let later = t0 + Duration::from_secs(3 * 60 * 60);
        assert!(registry.begin_scan("k1", "MBR-1", later).is_none());

        let ticket = registry.begin_scan("k1", "MBR-2", later).unwrap();
        registry.finish_scan(ticket, later + ms(100), false);
        assert!(registry.begin_scan("k1", "MBR-1", later + ms(1300)).is_some());
    }

    #[test]
    fn test_unknown_kiosk_is_camera_off() {
        let registry = KioskRegistry::new(COOLDOWN, FLASH);
        let now = Instant::now();

        assert_eq!(registry.state_at("front-desk", now), KioskState::CameraOff);
        assert!(registry.begin_scan("front-desk", "A", now).is_none());
    }

    #[test]
    fn test_duplicate_read_within_cooldown_is_ignored() {
        let registry = registry_with_camera("k1");
        let t0 = Instant::now();

        let ticket = registry.begin_scan("k1", "garbage", t0).unwrap();
        assert_eq!(ticket.gym_id.as_deref(), Some("main"));
        registry.finish_scan(ticket, t0 + ms(100), false);

        assert!(registry.begin_scan("k1", "garbage", t0 + ms(800)).is_none());
    }

    #[test]
    fn test_reads_ignored_while_resolving() {
        let registry = registry_with_camera("k1");
        let t0 = Instant::now();

        let ticket = registry.begin_scan("k1", "A", t0).unwrap();
        assert!(registry.session("k1").is_resolving());
        assert!(registry.begin_scan("k1", "B", t0 + ms(2000)).is_none());

        registry.finish_scan(ticket, t0 + ms(2100), false);
        assert!(registry.begin_scan("k1", "B", t0 + ms(2200)).is_some());
    }

    #[test]
    fn test_success_flash_expires() {
        let registry = registry_with_camera("k1");
        let t0 = Instant::now();

        let ticket = registry.begin_scan("k1", "A", t0).unwrap();
        assert!(registry.finish_scan(ticket, t0 + ms(300), true));

        assert_eq!(
            registry.state_at("k1", t0 + ms(300)),
            KioskState::CameraOnSuccessFlash
        );
        assert_eq!(
            registry.state_at("k1", t0 + ms(1799)),
            KioskState::CameraOnSuccessFlash
        );
        assert_eq!(registry.state_at("k1", t0 + ms(1800)), KioskState::CameraOnIdle);
    }

    #[test]
    fn test_non_new_outcome_keeps_idle() {
        let registry = registry_with_camera("k1");
        let t0 = Instant::now();

        let ticket = registry.begin_scan("k1", "A", t0).unwrap();
        assert!(!registry.finish_scan(ticket, t0 + ms(300), false));
        assert_eq!(registry.state_at("k1", t0 + ms(300)), KioskState::CameraOnIdle);
    }

    #[test]
    fn test_camera_off_discards_in_flight_result() {
        let registry = registry_with_camera("k1");
        let t0 = Instant::now();

        let ticket = registry.begin_scan("k1", "A", t0).unwrap();
        registry.set_camera("k1", false, None);
        registry.set_camera("k1", true, None);

        assert!(!registry.finish_scan(ticket, t0 + ms(300), true));
        assert_eq!(registry.state_at("k1", t0 + ms(300)), KioskState::CameraOnIdle);
        // Debounce memory was reset by the toggle
        assert!(registry.begin_scan("k1", "A", t0 + ms(400)).is_some());
    }

    #[test]
    fn test_camera_off_from_flash() {
        let registry = registry_with_camera("k1");
        let t0 = Instant::now();

        let ticket = registry.begin_scan("k1", "A", t0).unwrap();
        registry.finish_scan(ticket, t0, true);
        registry.set_camera("k1", false, None);

        assert_eq!(registry.state_at("k1", t0 + ms(10)), KioskState::CameraOff);
    }
}

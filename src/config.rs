// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables, so everything is read
//! once at startup and kept in memory.

use std::env;
use std::time::Duration;

/// Domain printed on member badges when `APP_DOMAINS` is not set.
pub const DEFAULT_APP_DOMAIN: &str = "grindupfitness.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend (dashboard) URL, allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Hosts whose `/member/<id>` links are recognized in scanned QR codes.
    /// The first entry is used when printing new badges.
    pub app_domains: Vec<String>,
    /// Gym/location id used when a kiosk or manual check-in does not name one
    pub default_gym_id: String,
    /// Minimum interval between accepted kiosk reads
    pub scan_cooldown: Duration,
    /// How long a kiosk shows the success indicator
    pub success_flash: Duration,
    /// Offset from UTC (minutes) used to decide which day a check-in belongs to
    pub attendance_utc_offset_minutes: i32,

    // --- Secrets ---
    /// JWT signing key for staff/kiosk session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            app_domains: vec![DEFAULT_APP_DOMAIN.to_string()],
            default_gym_id: "main".to_string(),
            scan_cooldown: Duration::from_millis(1200),
            success_flash: Duration::from_millis(1500),
            attendance_utc_offset_minutes: 0,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            app_domains: parse_domains(env::var("APP_DOMAINS").ok().as_deref()),
            default_gym_id: env::var("DEFAULT_GYM_ID")
                .map(|v| v.trim().to_string())
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "main".to_string()),
            scan_cooldown: Duration::from_millis(parse_number("SCAN_COOLDOWN_MS", 1200)?),
            success_flash: Duration::from_millis(parse_number("SUCCESS_FLASH_MS", 1500)?),
            attendance_utc_offset_minutes: parse_number("ATTENDANCE_UTC_OFFSET_MINUTES", 0)?,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Domain used when printing member badge links.
    pub fn primary_domain(&self) -> &str {
        self.app_domains
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_APP_DOMAIN)
    }
}

/// Split a comma-separated domain list, dropping blanks.
fn parse_domains(raw: Option<&str>) -> Vec<String> {
    let domains: Vec<String> = raw
        .unwrap_or("")
        .split(',')
        .map(|d| d.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect();

    if domains.is_empty() {
        vec![DEFAULT_APP_DOMAIN.to_string()]
    } else {
        domains
    }
}

/// Read an optional numeric variable, rejecting values that do not parse.
fn parse_number<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

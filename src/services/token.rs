// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scan payload parsing.
//!
//! Badges in circulation carry several payload formats: profile links,
//! links with an id query parameter, JSON blobs, and bare codes. This module
//! reduces all of them to a single token for identity resolution.

use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// Key names that may carry the member identifier, in priority order.
/// Used for both URL query parameters and JSON object keys.
pub const TOKEN_KEYS: [&str; 10] = [
    "uid",
    "userId",
    "memberId",
    "id",
    "u",
    "code",
    "member",
    "member_id",
    "qr",
    "qrid",
];

/// Path segment marking a member profile link.
const MEMBER_PATH: &str = "/member/";

/// A normalized identifier extracted from a QR payload. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanToken(String);

impl ScanToken {
    /// Wrap a string, rejecting blanks.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ScanToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a token from a raw scanned string.
///
/// First match wins: URL, then JSON object, then the trimmed string itself.
/// Malformed URLs and JSON fall through silently; this never fails.
pub fn parse_scan_token(raw: &str, app_domains: &[String]) -> Option<ScanToken> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        if let Some(token) = token_from_url(trimmed, app_domains) {
            return Some(token);
        }
    }

    if trimmed.starts_with('{') {
        if let Some(token) = token_from_json(trimmed) {
            return Some(token);
        }
    }

    ScanToken::new(trimmed)
}

fn token_from_url(raw: &str, app_domains: &[String]) -> Option<ScanToken> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, "Scanned URL did not parse");
            return None;
        }
    };

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| segments.map(decode_segment).collect())
        .unwrap_or_default();

    // Profile link on our own site: /member/<id>
    if is_app_host(&url, app_domains) && url.path().contains(MEMBER_PATH) {
        if let Some(token) = segments.last().and_then(|s| ScanToken::new(s)) {
            return Some(token);
        }
    }

    for key in TOKEN_KEYS {
        let value = url
            .query_pairs()
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| ScanToken::new(&value));
        if value.is_some() {
            return value;
        }
    }

    segments.iter().rev().find_map(|s| ScanToken::new(s))
}

fn is_app_host(url: &Url, app_domains: &[String]) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    app_domains
        .iter()
        .any(|domain| host.contains(domain.as_str()))
}

/// Percent-decode a path segment, keeping it verbatim if it is not valid UTF-8.
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn token_from_json(raw: &str) -> Option<ScanToken> {
    let object: Map<String, Value> = serde_json::from_str(raw).ok()?;

    TOKEN_KEYS.iter().find_map(|key| match object.get(*key) {
        Some(Value::String(value)) => ScanToken::new(value),
        _ => None,
    })
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use grindup_checkin::config::Config;
use grindup_checkin::db::FirestoreDb;
use grindup_checkin::error::AppError;
use grindup_checkin::models::{CheckInOutcome, CheckInRequest, MemberCodeMapping};
use grindup_checkin::routes::create_router;
use grindup_checkin::services::{
    CheckInInvoker, CheckInService, IdentityResolver, KioskRegistry, UserDirectory,
};
use grindup_checkin::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A seeded user: (document id, uid, memberCode).
#[allow(dead_code)]
pub struct SeedUser {
    pub id: &'static str,
    pub uid: Option<&'static str>,
    pub member_code: Option<&'static str>,
}

/// In-memory user store that counts reads.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Vec<(String, Option<String>, Option<String>)>,
    codes: HashMap<String, MemberCodeMapping>,
    reads: Mutex<usize>,
}

#[allow(dead_code)]
impl InMemoryDirectory {
    pub fn with_user(mut self, user: SeedUser) -> Self {
        self.users.push((
            user.id.to_string(),
            user.uid.map(str::to_string),
            user.member_code.map(str::to_string),
        ));
        self
    }

    pub fn with_mapping(mut self, code: &str, user_id: &str) -> Self {
        self.codes.insert(
            code.to_string(),
            MemberCodeMapping {
                user_id: Some(user_id.to_string()),
            },
        );
        self
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    fn count(&self) {
        *self.reads.lock().unwrap() += 1;
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError> {
        self.count();
        Ok(self.users.iter().any(|(id, _, _)| id == user_id))
    }

    async fn find_user_by_uid(&self, uid: &str) -> Result<Option<String>, AppError> {
        self.count();
        Ok(self
            .users
            .iter()
            .find(|(_, u, _)| u.as_deref() == Some(uid))
            .map(|(id, _, _)| id.clone()))
    }

    async fn find_user_by_member_code(&self, code: &str) -> Result<Option<String>, AppError> {
        self.count();
        Ok(self
            .users
            .iter()
            .find(|(_, _, c)| c.as_deref() == Some(code))
            .map(|(id, _, _)| id.clone()))
    }

    async fn get_member_code_mapping(
        &self,
        code: &str,
    ) -> Result<Option<MemberCodeMapping>, AppError> {
        self.count();
        Ok(self.codes.get(code).cloned())
    }
}

/// Check-in invoker that records calls and replies with a fixed outcome,
/// or fails when `outcome` is `None`.
pub struct RecordingInvoker {
    outcome: Option<CheckInOutcome>,
    calls: Mutex<Vec<CheckInRequest>>,
}

#[allow(dead_code)]
impl RecordingInvoker {
    pub fn replying(outcome: CheckInOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CheckInRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckInInvoker for RecordingInvoker {
    async fn check_in(&self, request: CheckInRequest) -> Result<CheckInOutcome, AppError> {
        self.calls.lock().unwrap().push(request);
        self.outcome
            .ok_or_else(|| AppError::Database("connection reset".to_string()))
    }
}

/// The users every HTTP test can rely on.
#[allow(dead_code)]
pub fn seeded_directory() -> InMemoryDirectory {
    InMemoryDirectory::default()
        .with_user(SeedUser {
            id: "abcXYZ123",
            uid: None,
            member_code: None,
        })
        .with_user(SeedUser {
            id: "real_doc_id",
            uid: None,
            member_code: None,
        })
        .with_user(SeedUser {
            id: "doc-0042",
            uid: Some("Zx9kQ2mN4pR7sT1vW3yB"),
            member_code: Some("MBR-0042"),
        })
        .with_mapping("u_789", "real_doc_id")
}

/// Test app wired to in-memory fakes.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub directory: Arc<InMemoryDirectory>,
    pub invoker: Arc<RecordingInvoker>,
}

/// Create a test app around the given directory and invoker.
#[allow(dead_code)]
pub fn create_test_app_with(directory: InMemoryDirectory, invoker: RecordingInvoker) -> TestApp {
    let config = Config::test_default();
    let directory = Arc::new(directory);
    let invoker = Arc::new(invoker);

    let checkin = CheckInService::new(
        IdentityResolver::new(directory.clone()),
        invoker.clone(),
        KioskRegistry::new(config.scan_cooldown, config.success_flash),
        config.app_domains.clone(),
        config.default_gym_id.clone(),
    );

    let state = Arc::new(AppState {
        config,
        checkin: Arc::new(checkin),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        directory,
        invoker,
    }
}

/// Create a test app with the seeded users and an invoker reporting new check-ins.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(
        seeded_directory(),
        RecordingInvoker::replying(CheckInOutcome::CheckedIn { duplicate: false }),
    )
}

/// Create a session token the auth middleware accepts.
#[allow(dead_code)]
pub fn create_test_jwt(subject: &str, signing_key: &[u8]) -> String {
    grindup_checkin::middleware::auth::create_jwt(subject, signing_key)
        .expect("Failed to create JWT")
}

/// Send a request with a valid bearer token and return the raw response.
#[allow(dead_code)]
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let token = create_test_jwt("front-desk", &app.state.config.jwt_signing_key);
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.router.clone().oneshot(request).await.unwrap()
}

/// Send a request and decode the JSON response body.
#[allow(dead_code)]
pub async fn send_json(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    let response = send(app, method, uri, body).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Turn a kiosk camera on, optionally pinned to a gym.
#[allow(dead_code)]
pub async fn enable_camera(app: &TestApp, kiosk_id: &str, gym_id: Option<&str>) {
    let (status, _) = send_json(
        app,
        "POST",
        &format!("/api/kiosk/{}/camera", kiosk_id),
        Some(serde_json::json!({ "enabled": true, "gymId": gym_id })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
}

/// Post one raw scan and return the kiosk state reported back.
#[allow(dead_code)]
pub async fn scan(app: &TestApp, kiosk_id: &str, raw: &str) -> String {
    let (status, json) = send_json(
        app,
        "POST",
        &format!("/api/kiosk/{}/scan", kiosk_id),
        Some(serde_json::json!({ "raw": raw })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    json["state"].as_str().unwrap().to_string()
}

// SPDX-License-Identifier: MIT

use bloomskin_api::config::Config;
use bloomskin_api::db::FirestoreDb;
use bloomskin_api::error::AppError;
use bloomskin_api::routes::create_router;
use bloomskin_api::services::{AuthUser, HautAiClient, HautAiCredentials, TokenVerifier};
use bloomskin_api::AppState;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Verifier stub: any token except "invalid" is accepted and becomes the
/// Firebase UID. Lets tests pick the caller identity per request.
pub struct StubVerifier;

impl TokenVerifier for StubVerifier {
    fn verify<'a>(
        &'a self,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<AuthUser, AppError>> + Send + 'a>> {
        let result = if token == "invalid" {
            Err(AppError::Unauthorized)
        } else {
            Ok(AuthUser {
                firebase_uid: token.to_string(),
                email: None,
            })
        };
        Box::pin(async move { result })
    }
}

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

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with an offline database and stubbed auth, pointed at
/// the given vendor base URL.
#[allow(dead_code)]
pub fn create_test_app(vendor_url: &str) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let haut_ai = HautAiClient::new(
        vendor_url.to_string(),
        HautAiCredentials {
            username: config.haut_ai_username.clone(),
            password: config.haut_ai_password.clone(),
            dataset_id: config.haut_ai_dataset_id.clone(),
        },
    )
    .expect("Failed to build test analysis client");

    let state = Arc::new(AppState {
        config,
        db,
        haut_ai,
        verifier: Arc::new(StubVerifier),
    });

    (create_router(state.clone()), state)
}

/// Spawn an in-process vendor stub on an ephemeral port and return its base
/// URL. Returns canned ids s1/b1/i1; with `broken_results` the results
/// endpoint serves a non-JSON body.
#[allow(dead_code)]
pub async fn spawn_vendor_stub(broken_results: bool) -> String {
    use axum::routing::{get, post};
    use axum::{Json, Router};

    async fn login() -> Json<serde_json::Value> {
        Json(serde_json::json!({ "access_token": "vendor-token", "company_id": "c1" }))
    }

    async fn create_subject() -> Json<serde_json::Value> {
        Json(serde_json::json!({ "id": "s1" }))
    }

    async fn create_batch() -> Json<serde_json::Value> {
        Json(serde_json::json!({ "id": "b1" }))
    }

    async fn upload_image() -> Json<serde_json::Value> {
        Json(serde_json::json!({ "id": "i1" }))
    }

    async fn results() -> Json<serde_json::Value> {
        Json(serde_json::json!([
            { "technique": "acne", "score": 42 }
        ]))
    }

    async fn broken() -> &'static str {
        "this is not json"
    }

    let results_path =
        "/api/v1/companies/{company}/datasets/{dataset}/subjects/{subject}/batches/{batch}/images/{image}/results/";

    let app = Router::new()
        .route("/api/v1/auth/login/", post(login))
        .route(
            "/api/v1/companies/{company}/datasets/{dataset}/subjects/",
            post(create_subject),
        )
        .route(
            "/api/v1/companies/{company}/datasets/{dataset}/subjects/{subject}/batches/",
            post(create_batch),
        )
        .route(
            "/api/v1/companies/{company}/datasets/{dataset}/subjects/{subject}/batches/{batch}/images/",
            post(upload_image),
        )
        .route(
            results_path,
            if broken_results {
                get(broken)
            } else {
                get(results)
            },
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind vendor stub");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Vendor stub crashed");
    });

    format!("http://{}", addr)
}

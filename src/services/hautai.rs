// SPDX-License-Identifier: MIT

//! Haut.ai API client for skin image analysis.
//!
//! Handles:
//! - Authentication with cached session tokens
//! - Subject and batch creation
//! - Image upload (base64 payload)
//! - Result retrieval

use crate::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Timeout for control-plane calls (login, subject/batch creation, results).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Image payloads are large; uploads get a longer deadline.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Default side/light identifiers for a front-facing photo.
pub const SIDE_ID_FRONT: u32 = 1;
pub const LIGHT_ID_NORMAL: u32 = 1;

/// Authenticated session, cached after the first login.
#[derive(Debug, Clone)]
struct HautSession {
    access_token: String,
    company_id: String,
}

/// Credentials and dataset configuration for the vendor account.
#[derive(Debug, Clone)]
pub struct HautAiCredentials {
    pub username: String,
    pub password: String,
    pub dataset_id: String,
}

/// Identifiers produced by a completed upload workflow. The caller needs all
/// three to poll for results later.
#[derive(Debug, Clone)]
pub struct AnalysisHandles {
    pub subject_id: String,
    pub batch_id: String,
    pub image_id: String,
}

/// Raw analysis results. The vendor returns a JSON array normally but an
/// object for some error shapes, so both are accepted as-is.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResultPayload {
    List(Vec<serde_json::Value>),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl ResultPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            ResultPayload::List(items) => items.is_empty(),
            ResultPayload::Object(map) => map.is_empty(),
        }
    }
}

/// Haut.ai API client with a shared cached session.
#[derive(Clone)]
pub struct HautAiClient {
    http: reqwest::Client,
    upload_http: reqwest::Client,
    base_url: String,
    credentials: HautAiCredentials,
    session: Arc<RwLock<Option<HautSession>>>,
}

impl HautAiClient {
    /// Create a new client. No network calls are made until the first request.
    pub fn new(base_url: String, credentials: HautAiCredentials) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        let upload_http = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            upload_http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            session: Arc::new(RwLock::new(None)),
        })
    }

    // ─── Authentication ──────────────────────────────────────────

    /// Return a valid session, logging in only if none is cached.
    ///
    /// Expired tokens are not detected proactively; a 401 from a later call
    /// surfaces as an upstream error and the next login starts fresh.
    async fn ensure_authenticated(&self) -> Result<HautSession, AppError> {
        if let Some(session) = self.session.read().await.clone() {
            return Ok(session);
        }

        let mut guard = self.session.write().await;
        // Another task may have logged in while we waited for the write lock
        if let Some(session) = guard.clone() {
            return Ok(session);
        }

        let session = self.login().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Authenticate with the vendor and return a fresh session.
    async fn login(&self) -> Result<HautSession, AppError> {
        let url = format!("{}/api/v1/auth/login/", self.base_url);

        let body = serde_json::json!({
            "username": self.credentials.username,
            "password": self.credentials.password,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Login request failed: {}", e)))?;

        let login: LoginResponse = self.check_response_json(response).await?;

        tracing::info!(company_id = %login.company_id, "Authenticated with analysis service");

        Ok(HautSession {
            access_token: login.access_token,
            company_id: login.company_id,
        })
    }

    /// Drop the cached session so the next call re-authenticates.
    pub async fn invalidate_session(&self) {
        *self.session.write().await = None;
    }

    // ─── Workflow Steps ──────────────────────────────────────────

    /// Create a subject for a user. Subject names are the Firebase UID so
    /// vendor-side records can be traced back to a user.
    pub async fn create_subject(&self, subject_name: &str) -> Result<String, AppError> {
        let session = self.ensure_authenticated().await?;
        let url = format!(
            "{}/api/v1/companies/{}/datasets/{}/subjects/",
            self.base_url, session.company_id, self.credentials.dataset_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.access_token)
            .json(&serde_json::json!({ "name": subject_name }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Subject creation failed: {}", e)))?;

        let created: CreatedResource = self.check_response_json(response).await?;
        Ok(created.id)
    }

    /// Create an image batch under a subject.
    pub async fn create_batch(&self, subject_id: &str) -> Result<String, AppError> {
        let session = self.ensure_authenticated().await?;
        let url = format!(
            "{}/api/v1/companies/{}/datasets/{}/subjects/{}/batches/",
            self.base_url, session.company_id, self.credentials.dataset_id, subject_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Batch creation failed: {}", e)))?;

        let created: CreatedResource = self.check_response_json(response).await?;
        Ok(created.id)
    }

    /// Upload a base64-encoded photo into a batch. The payload is passed
    /// through as-is; the vendor rejects malformed base64 itself.
    pub async fn upload_image(
        &self,
        subject_id: &str,
        batch_id: &str,
        b64_image: &str,
        side_id: u32,
        light_id: u32,
    ) -> Result<String, AppError> {
        let session = self.ensure_authenticated().await?;
        let url = format!(
            "{}/api/v1/companies/{}/datasets/{}/subjects/{}/batches/{}/images/",
            self.base_url, session.company_id, self.credentials.dataset_id, subject_id, batch_id
        );

        let body = serde_json::json!({
            "side_id": side_id,
            "light_id": light_id,
            "b64data": b64_image,
        });

        let response = self
            .upload_http
            .post(&url)
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Image upload failed: {}", e)))?;

        let created: CreatedResource = self.check_response_json(response).await?;
        Ok(created.id)
    }

    /// Fetch analysis results for an uploaded image.
    ///
    /// An HTTP failure is an upstream error; a success response with a
    /// non-JSON body is reported separately as an invalid response, since it
    /// points at a vendor contract change rather than an outage.
    pub async fn fetch_results(
        &self,
        subject_id: &str,
        batch_id: &str,
        image_id: &str,
    ) -> Result<ResultPayload, AppError> {
        let session = self.ensure_authenticated().await?;
        let url = format!(
            "{}/api/v1/companies/{}/datasets/{}/subjects/{}/batches/{}/images/{}/results/",
            self.base_url,
            session.company_id,
            self.credentials.dataset_id,
            subject_id,
            batch_id,
            image_id
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Results request failed: {}", e)))?;

        self.check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(format!("results body is not JSON: {}", e)))
    }

    /// Run the full upload workflow: subject, batch, image.
    ///
    /// A fresh subject is created per call; intermediate vendor resources are
    /// not rolled back when a later step fails.
    pub async fn analyze(
        &self,
        subject_name: &str,
        b64_image: &str,
        side_id: u32,
        light_id: u32,
    ) -> Result<AnalysisHandles, AppError> {
        let subject_id = self.create_subject(subject_name).await?;
        let batch_id = self.create_batch(&subject_id).await?;
        let image_id = self
            .upload_image(&subject_id, &batch_id, b64_image, side_id, light_id)
            .await?;

        tracing::info!(
            subject_id = %subject_id,
            batch_id = %batch_id,
            image_id = %image_id,
            "Image uploaded for analysis"
        );

        Ok(AnalysisHandles {
            subject_id,
            batch_id,
            image_id,
        })
    }

    // ─── Response Helpers ────────────────────────────────────────

    /// Check response status, returning the response for further processing.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 {
            // Session token rejected; next call will log in again
            self.invalidate_session().await;
        }

        Err(AppError::Upstream(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        self.check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(format!("JSON parse error: {}", e)))
    }
}

/// Login response from the vendor auth endpoint.
#[derive(Debug, Clone, Deserialize)]
struct LoginResponse {
    #[serde(alias = "token")]
    access_token: String,
    company_id: String,
}

/// Create responses all share the shape `{"id": "..."}` plus extra fields
/// we ignore.
#[derive(Debug, Clone, Deserialize)]
struct CreatedResource {
    id: String,
}

// SPDX-License-Identifier: MIT

//! Skin analysis routes: image upload and result retrieval.

use crate::error::{AppError, Result};
use crate::models::SkinAnalysis;
use crate::services::hautai::{LIGHT_ID_NORMAL, SIDE_ID_FRONT};
use crate::services::{AuthUser, ResultPayload};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Analysis routes (require authentication; middleware applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/analysis/upload", post(upload_image))
        .route("/api/v1/analysis/results/{image_id}", get(get_results))
        .route("/api/v1/analysis/history", get(get_history))
        .route("/api/v1/analysis/latest", get(get_latest))
        .route("/api/v1/analysis/{analysis_id}", get(get_analysis))
}

// ─── Upload ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisUploadRequest {
    #[validate(length(min = 1, message = "imageBase64 must not be empty"))]
    pub image_base64: String,
    #[serde(default = "default_side_id")]
    pub side_id: u32,
    #[serde(default = "default_light_id")]
    pub light_id: u32,
}

fn default_side_id() -> u32 {
    SIDE_ID_FRONT
}
fn default_light_id() -> u32 {
    LIGHT_ID_NORMAL
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisUploadResponse {
    pub subject_id: String,
    pub batch_id: String,
    pub image_id: String,
    pub message: String,
}

/// Upload a photo for analysis.
///
/// Runs the full vendor workflow (subject, batch, image) and records a
/// pending analysis. The vendor processes asynchronously; results are
/// fetched later via the results endpoint.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<AnalysisUploadRequest>,
) -> Result<(StatusCode, Json<AnalysisUploadResponse>)> {
    payload.validate()?;

    let handles = state
        .haut_ai
        .analyze(
            &auth.firebase_uid,
            &payload.image_base64,
            payload.side_id,
            payload.light_id,
        )
        .await?;

    // Best-effort: the vendor upload already succeeded, so a storage failure
    // should not fail the request.
    match state
        .db
        .create_analysis(&auth.firebase_uid, &handles.image_id)
        .await
    {
        Ok(analysis) => {
            tracing::info!(
                firebase_uid = %auth.firebase_uid,
                analysis_id = %analysis.id,
                image_id = %handles.image_id,
                "Pending analysis recorded"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                firebase_uid = %auth.firebase_uid,
                "Failed to record pending analysis, continuing anyway"
            );
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(AnalysisUploadResponse {
            subject_id: handles.subject_id,
            batch_id: handles.batch_id,
            image_id: handles.image_id,
            message: "Image uploaded successfully. Analysis is being processed.".to_string(),
        }),
    ))
}

// ─── Results ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub subject_id: Option<String>,
    pub batch_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResultsResponse {
    pub subject_id: String,
    pub batch_id: String,
    pub image_id: String,
    pub results: serde_json::Value,
}

/// Fetch raw analysis results for an uploaded image.
async fn get_results(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(image_id): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<AnalysisResultsResponse>> {
    let subject_id = query
        .subject_id
        .ok_or_else(|| AppError::BadRequest("Missing 'subjectId' query parameter".to_string()))?;
    let batch_id = query
        .batch_id
        .ok_or_else(|| AppError::BadRequest("Missing 'batchId' query parameter".to_string()))?;

    let payload = state
        .haut_ai
        .fetch_results(&subject_id, &batch_id, &image_id)
        .await?;

    if payload.is_empty() {
        tracing::debug!(
            firebase_uid = %auth.firebase_uid,
            image_id = %image_id,
            "Analysis results not available yet"
        );
    }

    let results = match payload {
        ResultPayload::List(items) => serde_json::Value::Array(items),
        ResultPayload::Object(map) => serde_json::Value::Object(map),
    };

    tracing::info!(
        firebase_uid = %auth.firebase_uid,
        image_id = %image_id,
        "Analysis results fetched"
    );

    Ok(Json(AnalysisResultsResponse {
        subject_id,
        batch_id,
        image_id,
        results,
    }))
}

// ─── Stored Analyses ─────────────────────────────────────────

const HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub id: String,
    pub status: crate::models::AnalysisStatus,
    pub analysis_complete: bool,
    pub image_url: String,
    pub created_at: String,
}

impl From<SkinAnalysis> for AnalysisSummary {
    fn from(analysis: SkinAnalysis) -> Self {
        Self {
            id: analysis.id,
            status: analysis.status,
            analysis_complete: analysis.analysis_complete,
            image_url: analysis.image_url,
            created_at: format_utc_rfc3339(analysis.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistoryResponse {
    pub analyses: Vec<AnalysisSummary>,
}

/// List the authenticated user's analyses, newest first.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AnalysisHistoryResponse>> {
    let analyses = state
        .db
        .get_analyses_for_user(&auth.firebase_uid, HISTORY_LIMIT)
        .await?;

    Ok(Json(AnalysisHistoryResponse {
        analyses: analyses.into_iter().map(Into::into).collect(),
    }))
}

/// Get the newest completed analysis for the authenticated user.
async fn get_latest(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SkinAnalysis>> {
    let analysis = state
        .db
        .get_latest_complete_analysis(&auth.firebase_uid)
        .await?
        .ok_or_else(|| AppError::NotFound("No completed analysis found".to_string()))?;

    Ok(Json(analysis))
}

/// Get a single stored analysis by id.
async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(analysis_id): Path<String>,
) -> Result<Json<SkinAnalysis>> {
    let analysis = state
        .db
        .get_analysis(&analysis_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {} not found", analysis_id)))?;

    if analysis.user_uid != auth.firebase_uid {
        return Err(AppError::Forbidden(
            "Analysis belongs to another user".to_string(),
        ));
    }

    Ok(Json(analysis))
}

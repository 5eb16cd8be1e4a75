// SPDX-License-Identifier: MIT

//! User profile, onboarding, and skin-profile routes.

use crate::error::{AppError, Result};
use crate::models::{
    BudgetPreference, Gender, SkinCareExperience, SkinType, User,
};
use crate::services::AuthUser;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// User routes (require authentication; middleware applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users/me", get(get_me))
        .route("/api/v1/users/me", put(update_me))
        .route("/api/v1/users/me", delete(delete_me))
        .route("/api/v1/users/me/onboarding", put(update_onboarding))
        .route("/api/v1/users/me/skin-profile", put(update_skin_profile))
}

// ─── Schemas ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
    #[validate(length(min = 1, message = "firebaseUid must not be empty"))]
    pub firebase_uid: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "displayName must not be empty"))]
    pub display_name: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    pub display_name: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub gender: Option<Gender>,
    pub skin_type: Option<SkinType>,
    pub skin_care_experience: Option<SkinCareExperience>,
    pub budget_preference: Option<BudgetPreference>,
    pub main_skin_concerns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingUpdateRequest {
    #[validate(range(max = 100, message = "onboardingStep out of range"))]
    pub onboarding_step: u32,
    pub face_image_captured: Option<bool>,
    pub face_analysis_completed: Option<bool>,
    pub subscription_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinProfileUpdateRequest {
    pub skin_type: Option<SkinType>,
    pub skin_care_experience: Option<SkinCareExperience>,
    pub budget_preference: Option<BudgetPreference>,
    pub main_skin_concerns: Option<Vec<String>>,
}

/// User profile as returned by the API (camelCase).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub firebase_uid: String,
    pub email: String,
    pub display_name: String,
    pub name: String,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub account_state: crate::models::AccountState,
    pub onboarding_completed: bool,
    pub onboarding_step: u32,
    pub face_image_captured: bool,
    pub face_analysis_completed: bool,
    pub subscription_completed: bool,
    pub skin_type: Option<SkinType>,
    pub skin_care_experience: Option<SkinCareExperience>,
    pub budget_preference: Option<BudgetPreference>,
    pub main_skin_concerns: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            firebase_uid: user.firebase_uid,
            email: user.email,
            display_name: user.display_name,
            name: user.name,
            bio: user.bio,
            profile_photo_url: user.profile_photo_url,
            date_of_birth: user.date_of_birth.map(format_utc_rfc3339),
            gender: user.gender,
            account_state: user.account_state,
            onboarding_completed: user.onboarding_completed,
            onboarding_step: user.onboarding_step,
            face_image_captured: user.face_image_captured,
            face_analysis_completed: user.face_analysis_completed,
            subscription_completed: user.subscription_completed,
            skin_type: user.skin_type,
            skin_care_experience: user.skin_care_experience,
            budget_preference: user.budget_preference,
            main_skin_concerns: user.main_skin_concerns,
            created_at: format_utc_rfc3339(user.created_at),
            updated_at: format_utc_rfc3339(user.updated_at),
        }
    }
}

// ─── Handlers ────────────────────────────────────────────────

/// Create the profile for the authenticated user.
async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UserCreateRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    payload.validate()?;

    // Users can only create their own profile
    if payload.firebase_uid != auth.firebase_uid {
        return Err(AppError::Forbidden(
            "Cannot create a profile for another user".to_string(),
        ));
    }

    if state.db.get_user(&auth.firebase_uid).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User {} already exists",
            auth.firebase_uid
        )));
    }

    if state.db.get_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Email {} is already registered",
            payload.email
        )));
    }

    let user = User::new(
        payload.firebase_uid,
        payload.email,
        payload.display_name,
        payload.name,
    );
    state.db.create_user(&user).await?;

    tracing::info!(firebase_uid = %auth.firebase_uid, "User profile created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get the authenticated user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user(&auth.firebase_uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.firebase_uid)))?;

    Ok(Json(user.into()))
}

/// Partial update of the authenticated user's profile.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<UserResponse>> {
    let mut user = state
        .db
        .get_user(&auth.firebase_uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.firebase_uid)))?;

    if let Some(display_name) = payload.display_name {
        user.display_name = display_name;
    }
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(bio) = payload.bio {
        user.bio = Some(bio);
    }
    if let Some(url) = payload.profile_photo_url {
        user.profile_photo_url = Some(url);
    }
    if let Some(dob) = payload.date_of_birth {
        user.date_of_birth = Some(dob);
    }
    if let Some(gender) = payload.gender {
        user.gender = Some(gender);
    }
    user.update_skin_profile(
        payload.skin_type,
        payload.skin_care_experience,
        payload.budget_preference,
        payload.main_skin_concerns,
    );

    state.db.update_user(&mut user).await?;

    tracing::info!(firebase_uid = %auth.firebase_uid, "User profile updated");

    Ok(Json(user.into()))
}

/// Record onboarding progress for the authenticated user.
async fn update_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<OnboardingUpdateRequest>,
) -> Result<Json<UserResponse>> {
    payload.validate()?;

    let mut user = state
        .db
        .get_user(&auth.firebase_uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.firebase_uid)))?;

    user.complete_onboarding_step(payload.onboarding_step);

    if let Some(captured) = payload.face_image_captured {
        user.face_image_captured = captured;
    }
    if let Some(completed) = payload.face_analysis_completed {
        user.face_analysis_completed = completed;
    }
    if let Some(completed) = payload.subscription_completed {
        user.subscription_completed = completed;
    }

    state.db.update_user(&mut user).await?;

    tracing::info!(
        firebase_uid = %auth.firebase_uid,
        step = user.onboarding_step,
        completed = user.onboarding_completed,
        "Onboarding progress updated"
    );

    Ok(Json(user.into()))
}

/// Update skin profile fields for the authenticated user.
async fn update_skin_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SkinProfileUpdateRequest>,
) -> Result<Json<UserResponse>> {
    let mut user = state
        .db
        .get_user(&auth.firebase_uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.firebase_uid)))?;

    user.update_skin_profile(
        payload.skin_type,
        payload.skin_care_experience,
        payload.budget_preference,
        payload.main_skin_concerns,
    );

    state.db.update_user(&mut user).await?;

    tracing::info!(firebase_uid = %auth.firebase_uid, "Skin profile updated");

    Ok(Json(user.into()))
}

/// Delete the authenticated user and all their data (GDPR compliance).
async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode> {
    let deleted = state.db.delete_user_data(&auth.firebase_uid).await?;

    tracing::info!(
        firebase_uid = %auth.firebase_uid,
        deleted,
        "User-initiated account deletion complete"
    );

    Ok(StatusCode::NO_CONTENT)
}

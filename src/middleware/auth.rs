// SPDX-License-Identifier: MIT

//! Firebase authentication middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that requires a valid Firebase ID token.
///
/// The verified [`crate::services::AuthUser`] is attached as a request
/// extension for handlers to consume.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") && h.len() > 7 => &h[7..],
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let auth_user = state
        .verifier
        .verify(token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

// SPDX-License-Identifier: MIT

//! BloomSkin API Server
//!
//! Backend for the BloomSkin app: user profiles, onboarding progress,
//! and skin image analysis via the Haut.ai service.

use bloomskin_api::{
    config::Config,
    db::FirestoreDb,
    services::{FirebaseTokenVerifier, HautAiClient, HautAiCredentials},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting BloomSkin API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.firebase_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize the analysis vendor client (no network calls until first use)
    let haut_ai = HautAiClient::new(
        config.haut_ai_api_url.clone(),
        HautAiCredentials {
            username: config.haut_ai_username.clone(),
            password: config.haut_ai_password.clone(),
            dataset_id: config.haut_ai_dataset_id.clone(),
        },
    )
    .expect("Failed to build analysis client");
    tracing::info!(url = %config.haut_ai_api_url, "Analysis client initialized");

    // Initialize Firebase token verifier
    let verifier =
        Arc::new(FirebaseTokenVerifier::new(&config).expect("Failed to initialize token verifier"));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        haut_ai,
        verifier,
    });

    // Build router
    let app = bloomskin_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bloomskin_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

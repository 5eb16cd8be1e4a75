//! Application configuration loaded from environment variables.
//!
//! Secrets (the Haut.ai service credentials) are read once at startup and
//! cached in memory; in production they arrive as env vars via Cloud Run
//! secret bindings.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Firebase project ID (used for Firestore and token verification)
    pub firebase_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Haut.ai analysis vendor ---
    /// Base URL of the Haut.ai API
    pub haut_ai_api_url: String,
    /// Service account username
    pub haut_ai_username: String,
    /// Service account password (secret)
    pub haut_ai_password: String,
    /// Dataset the app uploads subjects/images into
    pub haut_ai_dataset_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("FIREBASE_PROJECT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            haut_ai_api_url: env::var("HAUT_AI_API_URL")
                .unwrap_or_else(|_| "https://saas.haut.ai".to_string()),
            haut_ai_username: env::var("HAUT_AI_USERNAME")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("HAUT_AI_USERNAME"))?,
            haut_ai_password: env::var("HAUT_AI_PASSWORD")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("HAUT_AI_PASSWORD"))?,
            haut_ai_dataset_id: env::var("HAUT_AI_DATASET_ID")
                .map_err(|_| ConfigError::Missing("HAUT_AI_DATASET_ID"))?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            firebase_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            haut_ai_api_url: "http://127.0.0.1:0".to_string(),
            haut_ai_username: "test-user".to_string(),
            haut_ai_password: "test-password".to_string(),
            haut_ai_dataset_id: "test-dataset".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

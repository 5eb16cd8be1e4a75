// SPDX-License-Identifier: MIT

//! BloomSkin API: backend for AI-assisted skincare.
//!
//! This crate provides the backend API for user profiles, onboarding,
//! and skin image analysis through the Haut.ai service.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{HautAiClient, TokenVerifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub haut_ai: HautAiClient,
    pub verifier: Arc<dyn TokenVerifier>,
}

// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles keyed by Firebase UID)
//! - Skin analyses (one document per uploaded image)
//! - Subscriptions, routines, and product bundles

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    ProductBundle, Routine, SkinAnalysis, Subscription, SubscriptionPlatform, User,
};
use chrono::Utc;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Firebase UID. Missing documents are `Ok(None)`.
    pub async fn get_user(&self, firebase_uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(firebase_uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by email address. Returns the first match.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.pop())
    }

    /// Create a user document keyed by Firebase UID.
    ///
    /// The caller is responsible for checking existence first; this write
    /// overwrites unconditionally.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.firebase_uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Persist the full user document, refreshing `updated_at`.
    pub async fn update_user(&self, user: &mut User) -> Result<(), AppError> {
        user.updated_at = Utc::now();

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.firebase_uid)
            .object(&*user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Skin Analysis Operations ────────────────────────────────

    /// Create a pending analysis record with a fresh document ID.
    pub async fn create_analysis(
        &self,
        user_uid: &str,
        image_url: &str,
    ) -> Result<SkinAnalysis, AppError> {
        let analysis = SkinAnalysis::new(
            uuid::Uuid::new_v4().to_string(),
            user_uid.to_string(),
            image_url.to_string(),
        );

        self.set_analysis(&analysis).await?;
        Ok(analysis)
    }

    /// Get an analysis by its document ID. Missing documents are `Ok(None)`.
    pub async fn get_analysis(&self, analysis_id: &str) -> Result<Option<SkinAnalysis>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SKIN_ANALYSES)
            .obj()
            .one(analysis_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store an analysis record keyed by its UUID.
    pub async fn set_analysis(&self, analysis: &SkinAnalysis) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SKIN_ANALYSES)
            .document_id(&analysis.id)
            .object(analysis)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get analyses for a user, newest first.
    pub async fn get_analyses_for_user(
        &self,
        firebase_uid: &str,
        limit: u32,
    ) -> Result<Vec<SkinAnalysis>, AppError> {
        let uid = firebase_uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SKIN_ANALYSES)
            .filter(move |q| q.field("user_uid").eq(uid.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the newest completed analysis for a user, if any.
    pub async fn get_latest_complete_analysis(
        &self,
        firebase_uid: &str,
    ) -> Result<Option<SkinAnalysis>, AppError> {
        let uid = firebase_uid.to_string();
        let mut analyses: Vec<SkinAnalysis> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SKIN_ANALYSES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_uid").eq(uid.clone()),
                    q.field("analysis_complete").eq(true),
                ])
            })
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(analyses.pop())
    }

    // ─── Subscription Operations ─────────────────────────────────

    /// Get the most recently updated active subscription for a user on a
    /// given platform.
    pub async fn get_active_subscription(
        &self,
        firebase_uid: &str,
        platform: SubscriptionPlatform,
    ) -> Result<Option<Subscription>, AppError> {
        let uid = firebase_uid.to_string();
        let platform_value = serde_json::to_value(platform)
            .map_err(|e| AppError::Database(e.to_string()))?
            .as_str()
            .unwrap_or_default()
            .to_string();

        let mut subs: Vec<Subscription> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SUBSCRIPTIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_uid").eq(uid.clone()),
                    q.field("platform").eq(platform_value.clone()),
                    q.field("is_active").eq(true),
                ])
            })
            .order_by([("updated_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(subs.pop())
    }

    /// Store a subscription, keyed by the platform transaction ID so renewals
    /// overwrite the same document.
    pub async fn set_subscription(&self, subscription: &Subscription) -> Result<(), AppError> {
        let doc_id = if subscription.platform_subscription_id.is_empty() {
            subscription.user_uid.clone()
        } else {
            subscription.platform_subscription_id.clone()
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SUBSCRIPTIONS)
            .document_id(&doc_id)
            .object(subscription)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Routine Operations ──────────────────────────────────────

    /// Get all routines for a user, newest first.
    pub async fn get_routines_for_user(
        &self,
        firebase_uid: &str,
    ) -> Result<Vec<Routine>, AppError> {
        let uid = firebase_uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ROUTINES)
            .filter(move |q| q.field("user_uid").eq(uid.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a routine document.
    pub async fn set_routine(&self, routine_id: &str, routine: &Routine) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ROUTINES)
            .document_id(routine_id)
            .object(routine)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Product Bundle Operations ───────────────────────────────

    /// Get product bundles generated for a user, newest first.
    pub async fn get_bundles_for_user(
        &self,
        firebase_uid: &str,
    ) -> Result<Vec<ProductBundle>, AppError> {
        let uid = firebase_uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PRODUCT_BUNDLES)
            .filter(move |q| q.field("user_uid").eq(uid.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a product bundle document.
    pub async fn set_bundle(&self, bundle_id: &str, bundle: &ProductBundle) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PRODUCT_BUNDLES)
            .document_id(bundle_id)
            .object(bundle)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete(&self, collection: &str, doc_ids: &[String]) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    /// Collect the document IDs of all records in `collection` owned by a user.
    async fn owned_doc_ids(
        &self,
        collection: &'static str,
        firebase_uid: &str,
    ) -> Result<Vec<String>, AppError> {
        let uid = firebase_uid.to_string();
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.field("user_uid").eq(uid.clone()))
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Firestore returns the fully-qualified document name; keep the last segment.
        Ok(docs
            .into_iter()
            .map(|doc| {
                doc.name
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect())
    }

    // ─── User Data Deletion (GDPR) ─────────────────────────────────

    /// Delete ALL data for a user (GDPR compliance).
    ///
    /// Deletes from all collections:
    /// - `skin_analyses` (query by user_uid)
    /// - `subscriptions` (query by user_uid)
    /// - `routines` (query by user_uid)
    /// - `product_bundles` (query by user_uid)
    /// - `users/{uid}`
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, firebase_uid: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        for collection in [
            collections::SKIN_ANALYSES,
            collections::SUBSCRIPTIONS,
            collections::ROUTINES,
            collections::PRODUCT_BUNDLES,
        ] {
            let doc_ids = self.owned_doc_ids(collection, firebase_uid).await?;
            let count = doc_ids.len();
            self.batch_delete(collection, &doc_ids).await?;

            deleted_count += count;
            tracing::debug!(firebase_uid, collection, count, "Deleted owned documents");
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(firebase_uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(firebase_uid, "Deleted user profile");

        tracing::info!(firebase_uid, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}

// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (set FIRESTORE_EMULATOR_HOST); without it each test skips itself.
//!
//! The emulator provides a clean state for each test run.

use bloomskin_api::models::{
    AcneAnalysisResults, AcneByRegion, AcneByType, BillingPeriod, ImageQuality, ProductBundle,
    Routine, RoutineFrequency, RoutineTimeOfDay, SkinAnalysis, SkinSeverity, StructuredFeedback,
    Subscription, SubscriptionPlatform, User,
};
use chrono::{Duration, Utc};

mod common;
use common::test_db;

/// Generate a unique Firebase UID for test isolation.
fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

fn test_user(firebase_uid: &str) -> User {
    User::new(
        firebase_uid.to_string(),
        format!("{}@example.com", firebase_uid),
        "Ada".to_string(),
        "Ada Lovelace".to_string(),
    )
}

fn completed_results() -> (AcneAnalysisResults, StructuredFeedback) {
    let results = AcneAnalysisResults {
        by_region: AcneByRegion {
            forehead: 1,
            cheeks: 3,
            nose: 0,
            chin: 0,
        },
        by_type: AcneByType {
            blackheads: 2,
            whiteheads: 2,
            papules: 0,
            pustules: 0,
            nodules: 0,
            cysts: 0,
        },
        severity: SkinSeverity::Mild,
        total_lesions: 4,
        analyzed_at: Utc::now(),
    };
    let feedback = StructuredFeedback {
        main_summary: "Mild congestion".to_string(),
        motivation: "Keep going".to_string(),
        severity_data: "mild".to_string(),
        skin_insights: vec!["Cheeks are the main concern".to_string()],
        tips: vec!["Cleanse twice daily".to_string()],
    };
    (results, feedback)
}

// ═══════════════════════════════════════════════════════════════════════════
// ABSENCE CONTRACTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_missing_documents_are_none() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("missing");

    // Lookups for data that was never written come back Ok(None), not errors
    assert!(db.get_user(&uid).await.unwrap().is_none());
    assert!(db
        .get_user_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
    assert!(db.get_analysis("no-such-analysis").await.unwrap().is_none());
    assert!(db
        .get_latest_complete_analysis(&uid)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .get_active_subscription(&uid, SubscriptionPlatform::Apple)
        .await
        .unwrap()
        .is_none());

    // List queries come back empty
    assert!(db.get_analyses_for_user(&uid, 10).await.unwrap().is_empty());
    assert!(db.get_routines_for_user(&uid).await.unwrap().is_empty());
    assert!(db.get_bundles_for_user(&uid).await.unwrap().is_empty());

    println!("✓ Absent documents verified as Ok(None): uid={}", uid);
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("user");

    // Initially, user should not exist
    let before = db.get_user(&uid).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    let user = test_user(&uid);
    db.create_user(&user).await.unwrap();

    // Verify user was created with correct data
    let fetched = db.get_user(&uid).await.unwrap();
    assert!(fetched.is_some(), "User should exist after creation");

    let fetched = fetched.unwrap();
    assert_eq!(fetched.firebase_uid, uid);
    assert_eq!(fetched.email, user.email);
    assert_eq!(fetched.display_name, "Ada");
    assert_eq!(fetched.onboarding_step, 0);
    assert!(!fetched.onboarding_completed);

    // Email lookup finds the same document
    let by_email = db.get_user_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(by_email.firebase_uid, uid);

    println!("✓ User round-trip verified: uid={}", uid);
}

#[tokio::test]
async fn test_update_user_refreshes_updated_at() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("user-upd");

    let mut user = test_user(&uid);
    db.create_user(&user).await.unwrap();
    let original_updated_at = user.updated_at;

    user.display_name = "Grace".to_string();
    user.complete_onboarding_step(11);
    db.update_user(&mut user).await.unwrap();

    // update_user refreshes the timestamp before writing
    assert!(user.updated_at > original_updated_at);

    let fetched = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.display_name, "Grace");
    assert!(fetched.onboarding_completed);
    assert_eq!(fetched.updated_at, user.updated_at);
    assert!(fetched.updated_at > fetched.created_at);

    println!("✓ User update verified: uid={}", uid);
}

// ═══════════════════════════════════════════════════════════════════════════
// ANALYSIS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_analysis_assigns_id_and_round_trips() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("an");

    let created = db.create_analysis(&uid, "image-1").await.unwrap();
    assert!(!created.id.is_empty(), "Repository should assign an id");
    assert_eq!(created.user_uid, uid);
    assert!(!created.analysis_complete);

    let fetched = db.get_analysis(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.image_url, "image-1");

    println!("✓ Analysis created: id={}", created.id);
}

#[tokio::test]
async fn test_analyses_for_user_are_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("an-hist");
    let base = Utc::now();

    // Three analyses with staggered creation times
    for (i, hours_ago) in [("a1", 3), ("a2", 2), ("a3", 1)] {
        let mut analysis = SkinAnalysis::new(
            format!("{}-{}", uid, i),
            uid.clone(),
            format!("image-{}", i),
        );
        analysis.created_at = base - Duration::hours(hours_ago);
        db.set_analysis(&analysis).await.unwrap();
    }

    let list = db.get_analyses_for_user(&uid, 10).await.unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].image_url, "image-a3", "Newest should be first");
    assert_eq!(list[2].image_url, "image-a1", "Oldest should be last");

    // Limit is respected
    let limited = db.get_analyses_for_user(&uid, 2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].image_url, "image-a3");

    println!("✓ Analysis history ordering verified: uid={}", uid);
}

#[tokio::test]
async fn test_latest_complete_analysis_skips_pending() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("an-latest");
    let base = Utc::now();

    // Older analysis is completed
    let mut completed =
        SkinAnalysis::new(format!("{}-done", uid), uid.clone(), "done.jpg".to_string());
    completed.created_at = base - Duration::hours(2);
    let (results, feedback) = completed_results();
    completed.mark_completed(results, feedback, ImageQuality::High, None);
    db.set_analysis(&completed).await.unwrap();

    // Newer analysis is still pending
    let mut pending = SkinAnalysis::new(
        format!("{}-pending", uid),
        uid.clone(),
        "pending.jpg".to_string(),
    );
    pending.created_at = base - Duration::hours(1);
    db.set_analysis(&pending).await.unwrap();

    let latest = db
        .get_latest_complete_analysis(&uid)
        .await
        .unwrap()
        .expect("Completed analysis should be found");
    assert_eq!(latest.image_url, "done.jpg");
    assert!(latest.analysis_complete);

    println!("✓ Latest-complete lookup verified: uid={}", uid);
}

// ═══════════════════════════════════════════════════════════════════════════
// SUBSCRIPTION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_subscription_doc_id_fallback_and_active_lookup() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("sub");

    // A pending subscription has no platform transaction id yet; both writes
    // fall back to the user UID key and overwrite one document.
    let mut pending = Subscription::new(
        uid.clone(),
        SubscriptionPlatform::Apple,
        "Premium Monthly".to_string(),
        "com.bloom.bloomskinai.monthly".to_string(),
        BillingPeriod::Monthly,
        9.99,
    );
    db.set_subscription(&pending).await.unwrap();

    pending.plan_name = "Premium Monthly v2".to_string();
    db.set_subscription(&pending).await.unwrap();

    // Not active yet, so the active lookup finds nothing
    assert!(db
        .get_active_subscription(&uid, SubscriptionPlatform::Apple)
        .await
        .unwrap()
        .is_none());

    // Once the store confirms the purchase, the record is keyed by the
    // transaction id and becomes a second document.
    let expires = Utc::now() + Duration::days(30);
    pending.platform_subscription_id = format!("txn-{}", uid);
    pending.activate(expires, expires);
    db.set_subscription(&pending).await.unwrap();

    let active = db
        .get_active_subscription(&uid, SubscriptionPlatform::Apple)
        .await
        .unwrap()
        .expect("Active subscription should be found");
    assert!(active.is_active);
    assert_eq!(active.platform_subscription_id, pending.platform_subscription_id);
    assert_eq!(active.plan_name, "Premium Monthly v2");

    // Wrong platform finds nothing
    assert!(db
        .get_active_subscription(&uid, SubscriptionPlatform::Google)
        .await
        .unwrap()
        .is_none());

    // One pending doc (two writes collapsed onto the UID key) plus the
    // activated doc plus the user profile delete.
    db.create_user(&test_user(&uid)).await.unwrap();
    let deleted = db.delete_user_data(&uid).await.unwrap();
    assert_eq!(deleted, 3, "Expected pending + active + user document");

    println!("✓ Subscription keying verified: uid={}", uid);
}

// ═══════════════════════════════════════════════════════════════════════════
// CASCADE DELETE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_delete_user_data_cascades_all_collections() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("gdpr");

    db.create_user(&test_user(&uid)).await.unwrap();
    db.create_analysis(&uid, "image-1").await.unwrap();
    db.create_analysis(&uid, "image-2").await.unwrap();

    let routine = Routine::new(
        uid.clone(),
        "Evening routine".to_string(),
        RoutineTimeOfDay::Evening,
        RoutineFrequency::Daily,
    );
    db.set_routine(&format!("{}-routine", uid), &routine)
        .await
        .unwrap();

    let bundle = ProductBundle::new(
        uid.clone(),
        "Starter kit".to_string(),
        "For oily skin".to_string(),
    );
    db.set_bundle(&format!("{}-bundle", uid), &bundle)
        .await
        .unwrap();

    // 2 analyses + 1 routine + 1 bundle + the user profile
    let deleted = db.delete_user_data(&uid).await.unwrap();
    assert_eq!(deleted, 5, "Cascade should report every deleted document");

    // Everything is gone afterwards
    assert!(db.get_user(&uid).await.unwrap().is_none());
    assert!(db.get_analyses_for_user(&uid, 10).await.unwrap().is_empty());
    assert!(db.get_routines_for_user(&uid).await.unwrap().is_empty());
    assert!(db.get_bundles_for_user(&uid).await.unwrap().is_empty());

    println!("✓ Cascade delete verified: uid={}", uid);
}

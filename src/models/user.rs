// SPDX-License-Identifier: MIT

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Onboarding is considered finished once this step is reached.
pub const ONBOARDING_COMPLETE_STEP: u32 = 11;

/// User account subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountState {
    Free,
    Premium,
    Trial,
}

/// Skin type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinType {
    Normal,
    Oily,
    Dry,
    Combination,
    Sensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

/// User's skincare experience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinCareExperience {
    Beginner,
    Intermediate,
    Advanced,
}

/// User's budget preference for skincare products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetPreference {
    Low,
    Moderate,
    High,
    Luxury,
}

/// A user's skin goal with progress tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinGoal {
    pub id: String,
    pub title: String,
    pub color: String,
    /// Progress in the 0.0..=1.0 range
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SkinGoal {
    /// Update goal progress, clamped to the 0..=1 range.
    pub fn update_progress(&mut self, new_progress: f64) {
        self.progress = new_progress.clamp(0.0, 1.0);
        self.updated_at = Utc::now();
    }
}

/// User profile stored in Firestore (keyed by Firebase UID).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Firebase UID from authentication (also used as document ID)
    pub firebase_uid: String,
    pub email: String,

    // Basic profile
    pub display_name: String,
    pub name: String,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub gender: Option<Gender>,

    // Account state
    pub account_state: AccountState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Onboarding progress
    pub onboarding_completed: bool,
    pub onboarding_step: u32,
    pub face_image_captured: bool,
    pub face_analysis_completed: bool,
    pub subscription_completed: bool,

    // Skin profile
    pub skin_type: Option<SkinType>,
    pub skin_care_experience: Option<SkinCareExperience>,
    pub budget_preference: Option<BudgetPreference>,
    pub main_skin_concerns: Vec<String>,

    // Goals
    pub skin_goals: Vec<SkinGoal>,
}

impl User {
    /// Create a fresh user in the default (FREE, un-onboarded) state.
    pub fn new(firebase_uid: String, email: String, display_name: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            firebase_uid,
            email,
            display_name,
            name,
            bio: None,
            profile_photo_url: None,
            date_of_birth: None,
            gender: None,
            account_state: AccountState::Free,
            created_at: now,
            updated_at: now,
            onboarding_completed: false,
            onboarding_step: 0,
            face_image_captured: false,
            face_analysis_completed: false,
            subscription_completed: false,
            skin_type: None,
            skin_care_experience: None,
            budget_preference: None,
            main_skin_concerns: Vec::new(),
            skin_goals: Vec::new(),
        }
    }

    pub fn is_premium(&self) -> bool {
        self.account_state == AccountState::Premium
    }

    pub fn is_trial(&self) -> bool {
        self.account_state == AccountState::Trial
    }

    /// Upgrade to premium. No subscription validation here; linking the
    /// account state to an actual Subscription record is the caller's job.
    pub fn upgrade_to_premium(&mut self) {
        self.account_state = AccountState::Premium;
        self.updated_at = Utc::now();
    }

    pub fn downgrade_to_free(&mut self) {
        self.account_state = AccountState::Free;
        self.updated_at = Utc::now();
    }

    pub fn start_trial(&mut self) {
        self.account_state = AccountState::Trial;
        self.updated_at = Utc::now();
    }

    /// Record an onboarding checkpoint. The step counter never moves
    /// backwards, and the completion flag never reverts once set.
    pub fn complete_onboarding_step(&mut self, step: u32) {
        self.onboarding_step = self.onboarding_step.max(step);
        self.updated_at = Utc::now();

        if self.onboarding_step >= ONBOARDING_COMPLETE_STEP {
            self.onboarding_completed = true;
        }
    }

    /// Partial update of the skin profile; `None` fields are left untouched,
    /// except `concerns` where `Some(vec![])` clears the list.
    pub fn update_skin_profile(
        &mut self,
        skin_type: Option<SkinType>,
        experience: Option<SkinCareExperience>,
        budget: Option<BudgetPreference>,
        concerns: Option<Vec<String>>,
    ) {
        if let Some(skin_type) = skin_type {
            self.skin_type = Some(skin_type);
        }
        if let Some(experience) = experience {
            self.skin_care_experience = Some(experience);
        }
        if let Some(budget) = budget {
            self.budget_preference = Some(budget);
        }
        if let Some(concerns) = concerns {
            self.main_skin_concerns = concerns;
        }
        self.updated_at = Utc::now();
    }

    pub fn add_skin_goal(&mut self, goal: SkinGoal) {
        self.skin_goals.push(goal);
        self.updated_at = Utc::now();
    }

    /// Update progress for a specific goal; unknown ids are a no-op.
    pub fn update_goal_progress(&mut self, goal_id: &str, progress: f64) {
        if let Some(goal) = self.skin_goals.iter_mut().find(|g| g.id == goal_id) {
            goal.update_progress(progress);
            self.updated_at = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "uid-1".to_string(),
            "a@example.com".to_string(),
            "Ada".to_string(),
            "Ada Lovelace".to_string(),
        )
    }

    #[test]
    fn onboarding_step_is_monotonic() {
        let mut user = test_user();
        user.complete_onboarding_step(5);
        assert_eq!(user.onboarding_step, 5);

        user.complete_onboarding_step(3);
        assert_eq!(user.onboarding_step, 5);

        user.complete_onboarding_step(7);
        assert_eq!(user.onboarding_step, 7);
    }

    #[test]
    fn onboarding_completes_at_threshold_and_never_reverts() {
        let mut user = test_user();
        user.complete_onboarding_step(10);
        assert!(!user.onboarding_completed);

        user.complete_onboarding_step(11);
        assert!(user.onboarding_completed);

        // Lower steps afterwards do not undo completion
        user.complete_onboarding_step(2);
        assert!(user.onboarding_completed);
        assert_eq!(user.onboarding_step, 11);
    }

    #[test]
    fn account_state_transitions_are_unconditional() {
        let mut user = test_user();
        assert_eq!(user.account_state, AccountState::Free);

        user.start_trial();
        assert!(user.is_trial());

        user.upgrade_to_premium();
        assert!(user.is_premium());

        user.downgrade_to_free();
        assert_eq!(user.account_state, AccountState::Free);
    }

    #[test]
    fn goal_progress_is_clamped() {
        let mut user = test_user();
        let now = Utc::now();
        user.add_skin_goal(SkinGoal {
            id: "g1".to_string(),
            title: "Clear skin".to_string(),
            color: "#AABBCC".to_string(),
            progress: 0.2,
            created_at: now,
            updated_at: now,
        });

        user.update_goal_progress("g1", 1.5);
        assert_eq!(user.skin_goals[0].progress, 1.0);

        user.update_goal_progress("g1", -0.5);
        assert_eq!(user.skin_goals[0].progress, 0.0);

        // Unknown goal id is a no-op
        user.update_goal_progress("missing", 0.5);
        assert_eq!(user.skin_goals.len(), 1);
    }

    #[test]
    fn skin_profile_partial_update() {
        let mut user = test_user();
        user.update_skin_profile(
            Some(SkinType::Oily),
            None,
            Some(BudgetPreference::Moderate),
            Some(vec!["Dark Spots".to_string()]),
        );

        assert_eq!(user.skin_type, Some(SkinType::Oily));
        assert_eq!(user.skin_care_experience, None);
        assert_eq!(user.budget_preference, Some(BudgetPreference::Moderate));
        assert_eq!(user.main_skin_concerns, vec!["Dark Spots".to_string()]);

        // None leaves existing values alone
        user.update_skin_profile(None, Some(SkinCareExperience::Beginner), None, None);
        assert_eq!(user.skin_type, Some(SkinType::Oily));
        assert_eq!(user.main_skin_concerns.len(), 1);
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let mut user = test_user();
        user.upgrade_to_premium();
        user.complete_onboarding_step(11);
        user.update_skin_profile(Some(SkinType::Dry), None, None, None);

        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();

        assert_eq!(back.firebase_uid, user.firebase_uid);
        assert_eq!(back.account_state, AccountState::Premium);
        assert_eq!(back.onboarding_step, 11);
        assert!(back.onboarding_completed);
        assert_eq!(back.skin_type, Some(SkinType::Dry));
        assert_eq!(back.created_at, user.created_at);
    }
}

// SPDX-License-Identifier: MIT

//! Skincare routine model with step ordering and streak tracking.

use crate::time_utils::days_between;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Time of day the routine belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineTimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

/// How often the routine should be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineFrequency {
    Daily,
    TwiceDaily,
    Weekly,
    AsNeeded,
}

/// Individual step in a skincare routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineStep {
    pub id: String,
    /// 1-based position; kept contiguous across inserts/removals
    pub order: u32,
    pub title: String,
    pub description: String,
    pub product_name: Option<String>,
    pub duration_seconds: Option<u32>,
    pub is_completed_today: bool,
}

/// Stored routine record for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    /// Owning user's Firebase UID
    pub user_uid: String,
    pub title: String,
    pub time_of_day: RoutineTimeOfDay,
    pub frequency: RoutineFrequency,
    pub steps: Vec<RoutineStep>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub reminder_enabled: bool,
    pub reminder_time: Option<NaiveTime>,

    pub total_completions: u32,
    /// Days in a row completed
    pub current_streak: u32,
    pub best_streak: u32,
    pub last_completed_at: Option<DateTime<Utc>>,

    pub is_ai_generated: bool,
    pub generated_from_analysis_id: Option<String>,
}

impl Routine {
    pub fn new(
        user_uid: String,
        title: String,
        time_of_day: RoutineTimeOfDay,
        frequency: RoutineFrequency,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_uid,
            title,
            time_of_day,
            frequency,
            steps: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
            reminder_enabled: true,
            reminder_time: None,
            total_completions: 0,
            current_streak: 0,
            best_streak: 0,
            last_completed_at: None,
            is_ai_generated: false,
            generated_from_analysis_id: None,
        }
    }

    /// Add a step and keep the list sorted by declared order.
    pub fn add_step(&mut self, step: RoutineStep) {
        self.steps.push(step);
        self.steps.sort_by_key(|s| s.order);
        self.renumber_steps();
        self.updated_at = Utc::now();
    }

    /// Remove a step by id; remaining steps are renumbered to 1..N.
    pub fn remove_step(&mut self, step_id: &str) -> bool {
        let initial_len = self.steps.len();
        self.steps.retain(|s| s.id != step_id);

        if self.steps.len() < initial_len {
            self.renumber_steps();
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    fn renumber_steps(&mut self) {
        for (idx, step) in self.steps.iter_mut().enumerate() {
            step.order = idx as u32 + 1;
        }
    }

    /// Mark the routine completed for today and update the streak.
    ///
    /// The day gap is computed against the value of `last_completed_at`
    /// BEFORE this call overwrites it: completed again within a day the
    /// streak increments, after a longer gap it resets to 1.
    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        let previous_completion = self.last_completed_at;

        self.current_streak = match previous_completion {
            Some(previous) if days_between(previous, now) <= 1 => self.current_streak + 1,
            Some(_) => 1,
            None => 1,
        };
        self.best_streak = self.best_streak.max(self.current_streak);

        self.total_completions += 1;
        self.last_completed_at = Some(now);
        self.updated_at = now;

        // Steps start fresh for the next session
        for step in &mut self.steps {
            step.is_completed_today = false;
        }
    }

    pub fn mark_step_completed(&mut self, step_id: &str) -> bool {
        if let Some(step) = self.steps.iter_mut().find(|s| s.id == step_id) {
            step.is_completed_today = true;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    pub fn all_steps_completed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.is_completed_today)
    }

    /// Percentage of steps completed today (0-100).
    pub fn completion_percentage(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        let completed = self.steps.iter().filter(|s| s.is_completed_today).count();
        completed as f64 / self.steps.len() as f64 * 100.0
    }

    /// Total estimated duration in seconds.
    pub fn estimated_duration(&self) -> u32 {
        self.steps.iter().filter_map(|s| s.duration_seconds).sum()
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn enable_reminder(&mut self, reminder_time: NaiveTime) {
        self.reminder_enabled = true;
        self.reminder_time = Some(reminder_time);
        self.updated_at = Utc::now();
    }

    pub fn disable_reminder(&mut self) {
        self.reminder_enabled = false;
        self.updated_at = Utc::now();
    }
}

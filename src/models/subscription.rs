// SPDX-License-Identifier: MIT

//! Subscription model for Apple/Google in-app purchases.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Platform where the subscription was purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlatform {
    Apple,
    Google,
    Stripe,
    Web,
}

/// Status of the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Expired,
    Cancelled,
    /// Renewal failed but access continues
    GracePeriod,
    /// Payment issue, access suspended
    OnHold,
}

/// Billing period for the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn days(&self) -> u32 {
        match self {
            BillingPeriod::Weekly => 7,
            BillingPeriod::Monthly => 30,
            BillingPeriod::Yearly => 365,
        }
    }
}

/// Stored subscription record. Transitions always set (status, is_active,
/// timestamps) together; invalid transitions are accepted silently
/// (idempotent overwrite, not strict state-machine enforcement).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Owning user's Firebase UID
    pub user_uid: String,
    pub platform: SubscriptionPlatform,
    pub plan_name: String,
    /// Store product id, e.g. "com.bloom.bloomskinai.monthly"
    pub product_id: String,
    pub billing_period: BillingPeriod,
    pub price: f64,
    pub currency: String,

    pub status: SubscriptionStatus,
    pub is_active: bool,

    /// Apple/Google transaction ID
    pub platform_subscription_id: String,
    pub original_transaction_id: Option<String>,
    /// Google Play purchase token
    pub purchase_token: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,

    pub is_trial: bool,
    pub trial_end_date: Option<DateTime<Utc>>,

    pub auto_renew_enabled: bool,
}

impl Subscription {
    /// Create a pending subscription for a user.
    pub fn new(
        user_uid: String,
        platform: SubscriptionPlatform,
        plan_name: String,
        product_id: String,
        billing_period: BillingPeriod,
        price: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_uid,
            platform,
            plan_name,
            product_id,
            billing_period,
            price,
            currency: "USD".to_string(),
            status: SubscriptionStatus::Pending,
            is_active: false,
            platform_subscription_id: String::new(),
            original_transaction_id: None,
            purchase_token: None,
            created_at: now,
            updated_at: now,
            activated_at: None,
            expires_at: None,
            next_billing_date: None,
            cancelled_at: None,
            is_trial: false,
            trial_end_date: None,
            auto_renew_enabled: true,
        }
    }

    pub fn activate(&mut self, expires_at: DateTime<Utc>, next_billing: DateTime<Utc>) {
        let now = Utc::now();
        self.status = SubscriptionStatus::Active;
        self.is_active = true;
        self.activated_at = Some(now);
        self.expires_at = Some(expires_at);
        self.next_billing_date = Some(next_billing);
        self.updated_at = now;
    }

    pub fn renew(&mut self, new_expires_at: DateTime<Utc>, new_next_billing: DateTime<Utc>) {
        self.expires_at = Some(new_expires_at);
        self.next_billing_date = Some(new_next_billing);
        self.status = SubscriptionStatus::Active;
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    /// Cancel the subscription. With `immediate`, access ends now; otherwise
    /// the record only stops auto-renewal and runs to the end of the period.
    pub fn cancel(&mut self, immediate: bool) {
        let now = Utc::now();
        self.cancelled_at = Some(now);
        self.auto_renew_enabled = false;
        self.updated_at = now;

        if immediate {
            self.status = SubscriptionStatus::Cancelled;
            self.is_active = false;
            self.expires_at = Some(now);
        }
    }

    pub fn expire(&mut self) {
        self.status = SubscriptionStatus::Expired;
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn put_on_hold(&mut self) {
        self.status = SubscriptionStatus::OnHold;
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Renewal failed but the user keeps access while payment is retried.
    pub fn enter_grace_period(&mut self) {
        self.status = SubscriptionStatus::GracePeriod;
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn start_trial(&mut self, trial_days: u32) {
        let now = Utc::now();
        let trial_end = now + Duration::days(trial_days as i64);
        self.is_trial = true;
        self.trial_end_date = Some(trial_end);
        self.expires_at = Some(trial_end);
        self.status = SubscriptionStatus::Active;
        self.is_active = true;
        self.updated_at = now;
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() > expires_at,
            None => true,
        }
    }

    pub fn days_until_expiry(&self) -> i64 {
        self.expires_at
            .map(|expires_at| (expires_at - Utc::now()).num_days().max(0))
            .unwrap_or(0)
    }

    pub fn is_renewable(&self) -> bool {
        self.auto_renew_enabled && !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_subscription() -> Subscription {
        Subscription::new(
            "uid-1".to_string(),
            SubscriptionPlatform::Apple,
            "Premium Monthly".to_string(),
            "com.bloom.bloomskinai.monthly".to_string(),
            BillingPeriod::Monthly,
            9.99,
        )
    }

    #[test]
    fn activate_sets_consistent_state() {
        let mut sub = test_subscription();
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert!(!sub.is_active);

        let expires = Utc::now() + Duration::days(30);
        sub.activate(expires, expires);

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.is_active);
        assert!(sub.activated_at.is_some());
        assert_eq!(sub.expires_at, Some(expires));
        assert!(!sub.is_expired());
        assert!(sub.is_renewable());
    }

    #[test]
    fn immediate_cancel_forces_expiry_now() {
        let mut sub = test_subscription();
        let expires = Utc::now() + Duration::days(30);
        sub.activate(expires, expires);

        sub.cancel(true);

        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert!(!sub.is_active);
        assert!(!sub.auto_renew_enabled);
        assert!(sub.expires_at.unwrap() <= Utc::now());
        assert_eq!(sub.days_until_expiry(), 0);
    }

    #[test]
    fn deferred_cancel_keeps_access_until_period_end() {
        let mut sub = test_subscription();
        let expires = Utc::now() + Duration::days(30);
        sub.activate(expires, expires);

        sub.cancel(false);

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.is_active);
        assert!(!sub.auto_renew_enabled);
        assert!(sub.cancelled_at.is_some());
        assert!(!sub.is_renewable());
    }

    #[test]
    fn grace_period_stays_active_on_hold_does_not() {
        let mut sub = test_subscription();
        let expires = Utc::now() + Duration::days(30);
        sub.activate(expires, expires);

        sub.enter_grace_period();
        assert_eq!(sub.status, SubscriptionStatus::GracePeriod);
        assert!(sub.is_active);

        sub.put_on_hold();
        assert_eq!(sub.status, SubscriptionStatus::OnHold);
        assert!(!sub.is_active);

        sub.expire();
        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert!(!sub.is_active);
    }

    #[test]
    fn trial_activates_with_end_date() {
        let mut sub = test_subscription();
        sub.start_trial(7);

        assert!(sub.is_trial);
        assert!(sub.is_active);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.trial_end_date, sub.expires_at);
        // 7 days minus the instant elapsed in the test
        assert!(sub.days_until_expiry() >= 6);
    }

    #[test]
    fn missing_expiry_counts_as_expired() {
        let sub = test_subscription();
        assert!(sub.is_expired());
        assert_eq!(sub.days_until_expiry(), 0);
    }

    #[test]
    fn billing_period_days() {
        assert_eq!(BillingPeriod::Weekly.days(), 7);
        assert_eq!(BillingPeriod::Monthly.days(), 30);
        assert_eq!(BillingPeriod::Yearly.days(), 365);
    }

    #[test]
    fn serde_round_trip() {
        let mut sub = test_subscription();
        sub.start_trial(7);

        let json = serde_json::to_string(&sub).unwrap();
        let back: Subscription = serde_json::from_str(&json).unwrap();

        assert_eq!(back.user_uid, sub.user_uid);
        assert_eq!(back.status, SubscriptionStatus::Active);
        assert_eq!(back.platform, SubscriptionPlatform::Apple);
        assert_eq!(back.billing_period, BillingPeriod::Monthly);
        assert!(back.is_trial);
        assert_eq!(back.trial_end_date, sub.trial_end_date);
    }
}
